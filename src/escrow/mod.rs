//! Typed interface to the on-chain escrow program.
//!
//! The program's bytecode is external to this crate; what lives here is its
//! client-visible surface: the instruction payload encoding, the builders for
//! the escrow-initialization instruction sequence, and a read-only mirror of
//! the state record the program writes.

pub mod instruction;
pub mod state;

pub use instruction::EscrowInstructionData;
pub use state::EscrowState;
