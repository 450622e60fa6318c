//! Client builders for the system program.

use solana_program::pubkey::Pubkey;
use solana_program::system_instruction;
use solana_sdk::signer::Signer;

use crate::client::{HashedSigner, InstructionSet};

/// Creates a new account with the given space and owner, funded by `from`.
/// Both `from` and the new account must sign.
pub fn create_account<'a>(
    from: impl Into<HashedSigner<'a>>,
    to: impl Into<HashedSigner<'a>>,
    lamports: u64,
    space: u64,
    owner: Pubkey,
) -> InstructionSet<'a> {
    let from = from.into();
    let to = to.into();
    InstructionSet {
        instructions: vec![system_instruction::create_account(
            &from.pubkey(),
            &to.pubkey(),
            lamports,
            space,
            &owner,
        )],
        signers: [from, to].into_iter().collect(),
    }
}
