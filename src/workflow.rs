//! The escrow-initialization workflow.

use std::time::Duration;

use log::{debug, info};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use strum::Display;

use crate::client::{send_instruction_set, token};
use crate::error::EscrowClientError;
use crate::escrow::instruction as escrow_instruction;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Stages of [`initialize_escrow`], in execution order.
///
/// The submitted transaction is still all-or-nothing; the stages exist so
/// assembly progress is observable in logs without changing the atomicity
/// contract.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum InitEscrowStage {
    /// Derive/create the taker's account for the initializer's mint
    TakerTokenAccount,
    /// Derive/create the initializer's account for the taker's mint
    ReceiveTokenAccount,
    /// Create the temporary holding account
    TempTokenAccount,
    /// Initialize the temporary account and move the send amount into it
    FundTempAccount,
    /// Create the program-owned state account
    EscrowStateAccount,
    /// Build the program's `InitEscrow` call
    InitEscrow,
    /// Submit the assembled transaction and await confirmation
    Confirm,
}

/// Inputs to [`initialize_escrow`].
///
/// `initializer_mint` is the mint being offered; `send_amount` units of it
/// move out of `initializer_token_account`. `taker_mint` is the mint the
/// initializer expects `receive_amount` of in return.
#[derive(Debug)]
pub struct InitializeEscrowParams<'a> {
    /// Pays fees and rent, authorizes the funding transfer, signs
    pub initializer: &'a Keypair,
    /// Mint the initializer is offering
    pub initializer_mint: Pubkey,
    /// Initializer's funded token account for `initializer_mint`
    pub initializer_token_account: Pubkey,
    /// The counterparty's wallet
    pub taker: Pubkey,
    /// Mint the initializer expects to receive
    pub taker_mint: Pubkey,
    /// Units of `initializer_mint` moved into the temporary account
    pub send_amount: u64,
    /// Units of `taker_mint` the initializer expects back
    pub receive_amount: u64,
    /// The escrow program's address
    pub program_id: Pubkey,
}

/// Outcome of a successful [`initialize_escrow`] run.
#[derive(Debug)]
pub struct EscrowInitialized {
    /// Base58 address of the program-owned escrow state account
    pub escrow_account_address: String,
    /// Signature of the confirmed transaction
    pub signature: Signature,
}

/// Runs the full escrow-initialization workflow as one atomic transaction.
///
/// The instruction order is load-bearing: later instructions operate on
/// accounts created by earlier ones, and the temporary account must be
/// initialized before tokens are transferred into it. Signers are the
/// initializer (fee payer and transfer authority) plus the fresh temporary
/// and escrow keypairs, each signing only its own account creation.
///
/// Every run allocates fresh temporary and escrow keypairs. There is no
/// idempotency: two successful runs with identical inputs produce two
/// distinct escrow accounts, and a retry after failure cannot collide with
/// whatever a previous attempt left unconfirmed.
pub async fn initialize_escrow(
    client: &RpcClient,
    params: InitializeEscrowParams<'_>,
) -> Result<EscrowInitialized, EscrowClientError> {
    let InitializeEscrowParams {
        initializer,
        initializer_mint,
        initializer_token_account,
        taker,
        taker_mint,
        send_amount,
        receive_amount,
        program_id,
    } = params;
    let rent = |size| client.get_minimum_balance_for_rent_exemption(size);

    info!("stage {}", InitEscrowStage::TakerTokenAccount);
    let (taker_token_account, create_taker_account) =
        token::get_or_create_associated_token_account(client, initializer, taker, initializer_mint)
            .await?;
    debug!("taker token account {taker_token_account}");

    info!("stage {}", InitEscrowStage::ReceiveTokenAccount);
    let (receive_token_account, create_receive_account) =
        token::get_or_create_associated_token_account(
            client,
            initializer,
            initializer.pubkey(),
            taker_mint,
        )
        .await?;
    debug!("receive token account {receive_token_account}");

    info!("stage {}", InitEscrowStage::TempTokenAccount);
    let temp_token_account = Keypair::new();
    let temp_token_account_key = temp_token_account.pubkey();
    let create_temp_account =
        escrow_instruction::create_token_sized_account(initializer, temp_token_account, rent)
            .await?;

    info!("stage {}", InitEscrowStage::FundTempAccount);
    let fund_temp_account = escrow_instruction::fund_temp_account(
        temp_token_account_key,
        initializer,
        initializer_mint,
        initializer_token_account,
        send_amount,
    );

    info!("stage {}", InitEscrowStage::EscrowStateAccount);
    let escrow_account = Keypair::new();
    let escrow_account_key = escrow_account.pubkey();
    let create_escrow_account =
        escrow_instruction::create_escrow_state_account(initializer, escrow_account, program_id, rent)
            .await?;

    info!("stage {}", InitEscrowStage::InitEscrow);
    let init_escrow = escrow_instruction::init_escrow(
        program_id,
        initializer.pubkey(),
        temp_token_account_key,
        receive_token_account,
        escrow_account_key,
        receive_amount,
    )?;

    let mut set = create_taker_account
        .add(create_receive_account)
        .add(create_temp_account)
        .add(fund_temp_account)
        .add(create_escrow_account);
    set.instructions.push(init_escrow);

    info!(
        "stage {}, escrow account {escrow_account_key}",
        InitEscrowStage::Confirm
    );
    let signature = send_instruction_set(client, initializer, set, POLL_INTERVAL).await?;
    info!("escrow initialized, signature {signature}");

    Ok(EscrowInitialized {
        escrow_account_address: escrow_account_key.to_string(),
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_display_as_kebab_case() {
        assert_eq!(
            InitEscrowStage::FundTempAccount.to_string(),
            "fund-temp-account"
        );
        assert_eq!(InitEscrowStage::Confirm.to_string(), "confirm");
    }
}
