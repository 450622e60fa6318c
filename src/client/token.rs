//! Client builders for the `spl-token` program.

use std::future::Future;

use solana_client::client_error::Result as ClientResult;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::program_pack::Pack;
use solana_program::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::instruction;
use spl_token::state::{Account, Mint};

use crate::client::{system_program, HashedSigner, InstructionSet};

/// Creates and initializes a new token account for `mint`, owned by `owner`.
#[allow(clippy::missing_panics_doc)]
pub async fn create_token_account<'a, F, E>(
    funder: impl Into<HashedSigner<'a>>,
    account: impl Into<HashedSigner<'a>>,
    mint: Pubkey,
    owner: Pubkey,
    rent: impl FnOnce(usize) -> F,
) -> Result<InstructionSet<'a>, E>
where
    F: Future<Output = Result<u64, E>>,
{
    let account = account.into();
    let account_key = account.pubkey();
    let lamports = rent(Account::LEN).await?;
    let mut set = system_program::create_account(
        funder,
        account,
        lamports,
        Account::LEN as u64,
        spl_token::id(),
    );
    set.instructions.push(
        instruction::initialize_account(&spl_token::id(), &account_key, &mint, &owner).unwrap(),
    );
    Ok(set)
}

/// Creates a new mint.
#[allow(clippy::missing_panics_doc)]
pub async fn create_mint<'a, F, E>(
    funder: impl Into<HashedSigner<'a>>,
    account: impl Into<HashedSigner<'a>>,
    mint_authority: Pubkey,
    freeze_authority: Option<Pubkey>,
    decimals: u8,
    rent: impl FnOnce(usize) -> F,
) -> Result<InstructionSet<'a>, E>
where
    F: Future<Output = Result<u64, E>>,
{
    let account = account.into();
    let account_key = account.pubkey();
    let lamports = rent(Mint::LEN).await?;
    let mut set = system_program::create_account(
        funder,
        account,
        lamports,
        Mint::LEN as u64,
        spl_token::id(),
    );
    set.instructions.push(
        instruction::initialize_mint(
            &spl_token::id(),
            &account_key,
            &mint_authority,
            freeze_authority.as_ref(),
            decimals,
        )
        .unwrap(),
    );
    Ok(set)
}

/// Mints tokens to an account.
#[allow(clippy::missing_panics_doc)]
pub fn mint_to<'a>(
    mint: Pubkey,
    token_account_to: Pubkey,
    mint_authority: impl Into<HashedSigner<'a>>,
    amount: u64,
) -> InstructionSet<'a> {
    let mint_authority = mint_authority.into();
    InstructionSet {
        instructions: vec![instruction::mint_to(
            &spl_token::id(),
            &mint,
            &token_account_to,
            &mint_authority.pubkey(),
            &[],
            amount,
        )
        .unwrap()],
        signers: [mint_authority].into_iter().collect(),
    }
}

/// Transfers tokens between accounts.
#[allow(clippy::missing_panics_doc)]
pub fn transfer<'a>(
    source_account: Pubkey,
    destination_account: Pubkey,
    authority: impl Into<HashedSigner<'a>>,
    amount: u64,
) -> InstructionSet<'a> {
    let authority = authority.into();
    InstructionSet {
        instructions: vec![instruction::transfer(
            &spl_token::id(),
            &source_account,
            &destination_account,
            &authority.pubkey(),
            &[],
            amount,
        )
        .unwrap()],
        signers: [authority].into_iter().collect(),
    }
}

/// Derives `owner`'s associated token account for `mint`, adding a creation
/// instruction only if the account does not exist yet.
///
/// Returns the derived address and a possibly empty [`InstructionSet`], so a
/// re-run of a workflow reuses the account instead of failing on
/// account-already-in-use.
pub async fn get_or_create_associated_token_account<'a>(
    client: &RpcClient,
    funder: impl Into<HashedSigner<'a>>,
    owner: Pubkey,
    mint: Pubkey,
) -> ClientResult<(Pubkey, InstructionSet<'a>)> {
    let funder = funder.into();
    let address = get_associated_token_address(&owner, &mint);
    let existing = client
        .get_account_with_commitment(&address, client.commitment())
        .await?
        .value;
    let mut set = InstructionSet::default();
    if existing.is_none() {
        set.instructions.push(create_associated_token_account(
            &funder.pubkey(),
            &owner,
            &mint,
            &spl_token::id(),
        ));
        set.signers.insert(funder);
    }
    Ok((address, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;

    #[test]
    fn associated_account_creation_targets_the_token_program() {
        let funder = Keypair::new();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let instruction = create_associated_token_account(
            &funder.pubkey(),
            &owner,
            &mint,
            &spl_token::id(),
        );
        assert_eq!(instruction.program_id, spl_associated_token_account::id());
        assert_eq!(
            instruction.accounts[1].pubkey,
            get_associated_token_address(&owner, &mint)
        );
        assert!(instruction
            .accounts
            .iter()
            .any(|meta| meta.pubkey == spl_token::id()));
    }
}
