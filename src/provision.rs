//! One-shot provisioning of a mint with a funded token account.

use std::time::Duration;

use log::info;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

use crate::client::{send_instruction_set, token};
use crate::error::EscrowClientError;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A freshly created mint and its first funded token account.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionedMint {
    /// The new mint; decimals 0, mint authority = the provisioning payer
    pub mint: Pubkey,
    /// Token account owned by the payer, holding the full issued supply
    pub token_account: Pubkey,
}

/// Creates a mint and a token account holding exactly `supply` units of it,
/// both paid for and owned by `payer`.
///
/// Runs three sequential committed transactions: create the mint, create the
/// token account, issue the supply. Each step can fail independently and none
/// is retried here; re-running the whole call allocates fresh keypairs and
/// cannot collide with a partially failed attempt.
pub async fn create_funded_mint(
    client: &RpcClient,
    payer: &Keypair,
    supply: u64,
) -> Result<ProvisionedMint, EscrowClientError> {
    let mint = Keypair::new();
    let token_account = Keypair::new();
    let mint_key = mint.pubkey();
    let token_account_key = token_account.pubkey();
    let rent = |size| client.get_minimum_balance_for_rent_exemption(size);

    info!("creating mint {mint_key}");
    let create_mint = token::create_mint(payer, mint, payer.pubkey(), None, 0, rent).await?;
    send_instruction_set(client, payer, create_mint, POLL_INTERVAL).await?;

    info!("creating token account {token_account_key} for mint {mint_key}");
    let create_account =
        token::create_token_account(payer, token_account, mint_key, payer.pubkey(), rent).await?;
    send_instruction_set(client, payer, create_account, POLL_INTERVAL).await?;

    info!("issuing {supply} units to {token_account_key}");
    let issue = token::mint_to(mint_key, token_account_key, payer, supply);
    send_instruction_set(client, payer, issue, POLL_INTERVAL).await?;

    Ok(ProvisionedMint {
        mint: mint_key,
        token_account: token_account_key,
    })
}
