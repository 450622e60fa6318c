#![warn(
    unused_import_braces,
    unused_imports,
    missing_docs,
    missing_debug_implementations,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Client-side orchestration for an on-chain token escrow program.
//!
//! The escrow program itself lives on chain and is consumed here purely as an
//! instruction interface. This crate covers everything around it:
//!
//! 1. [`provision`] creates a mint and a funded token account for each party.
//! 1. [`escrow::instruction`] builds the ordered instruction sequence for
//!    escrow initialization (temp account creation, funding, state account
//!    creation, the program's `InitEscrow` call).
//! 1. [`workflow::initialize_escrow`] assembles those instructions into a
//!    single transaction, signs it with every newly created account, submits
//!    it, and waits for confirmation. The ledger applies all of it or none.
//! 1. [`view`] fetches and decodes the resulting account state.
//!
//! Nothing here retries: every run allocates fresh keypairs, so the caller
//! retries a failure by re-running the whole workflow.

pub mod client;
pub mod error;
pub mod escrow;
pub mod provision;
pub mod view;
pub mod workflow;

pub use error::EscrowClientError;

/// Instruction as understood by the Solana runtime
pub use solana_program::instruction::Instruction as SolanaInstruction;
/// Account meta for a [`SolanaInstruction`]
pub use solana_program::instruction::AccountMeta as SolanaAccountMeta;
/// Solana account address
pub use solana_program::pubkey::Pubkey;
