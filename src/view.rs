//! Read-only inspection of accounts produced by the workflow.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::program_pack::Pack;
use solana_program::pubkey::Pubkey;
use solana_sdk::account::Account;

use crate::error::EscrowClientError;
use crate::escrow::EscrowState;

/// Fetches `address` and prints a labeled dump of its raw contents.
pub async fn view_account_info(
    client: &RpcClient,
    address: &Pubkey,
    label: &str,
) -> Result<Account, EscrowClientError> {
    let account = fetch(client, address).await?;
    println!("{label}: {address}");
    println!("  owner: {}", account.owner);
    println!("  lamports: {}", account.lamports);
    println!("  data ({} bytes): {:?}", account.data.len(), account.data);
    Ok(account)
}

/// Fetches the account at `escrow_address`, decodes it against the fixed
/// [`EscrowState`] layout, and prints the decoded fields.
///
/// A data length other than [`EscrowState::LEN`] means the client's record
/// layout has drifted from the program's; that is fatal, not recoverable.
pub async fn view_escrow_state(
    client: &RpcClient,
    escrow_address: &Pubkey,
) -> Result<EscrowState, EscrowClientError> {
    let account = fetch(client, escrow_address).await?;
    if account.data.len() != EscrowState::LEN {
        return Err(EscrowClientError::StateLength {
            expected: EscrowState::LEN,
            actual: account.data.len(),
        });
    }
    let state = EscrowState::unpack_unchecked(&account.data)?;
    println!("escrow state: {escrow_address}");
    println!("  initialized: {}", state.is_initialized);
    println!("  initializer: {}", state.initializer);
    println!("  temp token account: {}", state.temp_token_account);
    println!(
        "  initializer receive account: {}",
        state.initializer_token_to_receive
    );
    println!("  expected amount: {}", state.expected_amount);
    Ok(state)
}

async fn fetch(client: &RpcClient, address: &Pubkey) -> Result<Account, EscrowClientError> {
    client
        .get_account_with_commitment(address, client.commitment())
        .await?
        .value
        .ok_or(EscrowClientError::AccountNotFound(*address))
}
