//! Builders for the escrow program's instruction sequence.
//!
//! Account ordering and signer/writable flags in [`init_escrow`] must match
//! the program's declared account list exactly. A mismatch is not a local
//! error; it surfaces only as an opaque on-chain rejection.

use std::future::Future;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::program_pack::Pack;
use solana_program::pubkey::Pubkey;
use solana_program::sysvar;
use solana_sdk::signer::Signer;
use spl_token::instruction as token_instruction;
use spl_token::state::Account as TokenAccount;

use crate::client::{system_program, HashedSigner, InstructionSet};
use crate::error::EscrowClientError;
use crate::escrow::state::EscrowState;
use crate::{SolanaAccountMeta, SolanaInstruction};

/// Instruction payload accepted by the escrow program.
///
/// Borsh encodes a variant as a 1-byte tag followed by its fields in
/// little-endian, which is exactly the layout the program deserializes.
/// Changing variant order here changes the tag and silently targets the
/// wrong entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum EscrowInstructionData {
    /// Set up a new escrow expecting `amount` of the initializer's receive
    /// mint (tag 0)
    InitEscrow {
        /// Units the initializer expects to receive
        amount: u64,
    },
    /// Take the counterparty side of an initialized escrow (tag 1). Listed to
    /// pin the program's full instruction surface; the initialization
    /// workflow only ever submits [`EscrowInstructionData::InitEscrow`].
    Exchange {
        /// Units the taker expects out of the temporary account
        amount: u64,
    },
}

/// Rent-exempt create-account sized for an `spl-token` account, owned by the
/// token program. The fresh account this creates becomes the temporary
/// holding account once [`fund_temp_account`] initializes and funds it.
pub async fn create_token_sized_account<'a, F, E>(
    funder: impl Into<HashedSigner<'a>>,
    account: impl Into<HashedSigner<'a>>,
    rent: impl FnOnce(usize) -> F,
) -> Result<InstructionSet<'a>, E>
where
    F: Future<Output = Result<u64, E>>,
{
    let lamports = rent(TokenAccount::LEN).await?;
    Ok(system_program::create_account(
        funder,
        account,
        lamports,
        TokenAccount::LEN as u64,
        spl_token::id(),
    ))
}

/// Initializes `temp_account` as a token account for `mint` and funds it with
/// `amount` from `source`, authorized by `payer`.
///
/// Initialization strictly precedes the transfer; the token program rejects a
/// transfer into an uninitialized account.
#[allow(clippy::missing_panics_doc)]
pub fn fund_temp_account<'a>(
    temp_account: Pubkey,
    payer: impl Into<HashedSigner<'a>>,
    mint: Pubkey,
    source: Pubkey,
    amount: u64,
) -> InstructionSet<'a> {
    let payer = payer.into();
    InstructionSet {
        instructions: vec![
            token_instruction::initialize_account(
                &spl_token::id(),
                &temp_account,
                &mint,
                &payer.pubkey(),
            )
            .unwrap(),
            token_instruction::transfer(
                &spl_token::id(),
                &source,
                &temp_account,
                &payer.pubkey(),
                &[],
                amount,
            )
            .unwrap(),
        ],
        signers: [payer].into_iter().collect(),
    }
}

/// Rent-exempt create-account sized for the [`EscrowState`] record.
///
/// The owner field is set to the escrow program's address; that ownership is
/// what lets the program write the state record during initialization.
pub async fn create_escrow_state_account<'a, F, E>(
    funder: impl Into<HashedSigner<'a>>,
    account: impl Into<HashedSigner<'a>>,
    program_id: Pubkey,
    rent: impl FnOnce(usize) -> F,
) -> Result<InstructionSet<'a>, E>
where
    F: Future<Output = Result<u64, E>>,
{
    let lamports = rent(EscrowState::LEN).await?;
    Ok(system_program::create_account(
        funder,
        account,
        lamports,
        EscrowState::LEN as u64,
        program_id,
    ))
}

/// Builds the program's `InitEscrow` call with its declared account list:
/// initializer (signer), temp token account (writable), receive account,
/// escrow state account (writable), rent sysvar, token program.
pub fn init_escrow(
    program_id: Pubkey,
    initializer: Pubkey,
    temp_token_account: Pubkey,
    receive_token_account: Pubkey,
    escrow_account: Pubkey,
    amount: u64,
) -> Result<SolanaInstruction, EscrowClientError> {
    let data = EscrowInstructionData::InitEscrow { amount }.try_to_vec()?;
    Ok(SolanaInstruction {
        program_id,
        accounts: vec![
            SolanaAccountMeta::new_readonly(initializer, true),
            SolanaAccountMeta::new(temp_token_account, false),
            SolanaAccountMeta::new_readonly(receive_token_account, false),
            SolanaAccountMeta::new(escrow_account, false),
            SolanaAccountMeta::new_readonly(sysvar::rent::id(), false),
            SolanaAccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::system_instruction::SystemInstruction;
    use solana_sdk::system_program;
    use std::convert::Infallible;

    // spl-token instruction tags, per its instruction enum
    const INITIALIZE_ACCOUNT_TAG: u8 = 1;
    const TRANSFER_TAG: u8 = 3;

    #[test]
    fn init_escrow_payload_is_tag_then_le_amount() {
        let instruction = init_escrow(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0x0102_0304_0506_0708,
        )
        .unwrap();
        let mut expected = vec![0u8];
        expected.extend_from_slice(&0x0102_0304_0506_0708_u64.to_le_bytes());
        assert_eq!(instruction.data, expected);
    }

    #[test]
    fn exchange_payload_uses_tag_one() {
        let data = EscrowInstructionData::Exchange { amount: 7 }
            .try_to_vec()
            .unwrap();
        assert_eq!(data[0], 1);
        assert_eq!(&data[1..], &7u64.to_le_bytes());
    }

    #[test]
    fn init_escrow_account_list_matches_program_contract() {
        let program_id = Pubkey::new_unique();
        let initializer = Pubkey::new_unique();
        let temp = Pubkey::new_unique();
        let receive = Pubkey::new_unique();
        let escrow = Pubkey::new_unique();
        let instruction =
            init_escrow(program_id, initializer, temp, receive, escrow, 20).unwrap();

        assert_eq!(instruction.program_id, program_id);
        let expected = [
            (initializer, true, false),
            (temp, false, true),
            (receive, false, false),
            (escrow, false, true),
            (sysvar::rent::id(), false, false),
            (spl_token::id(), false, false),
        ];
        assert_eq!(instruction.accounts.len(), expected.len());
        for (meta, (pubkey, is_signer, is_writable)) in
            instruction.accounts.iter().zip(expected)
        {
            assert_eq!(meta.pubkey, pubkey);
            assert_eq!(meta.is_signer, is_signer);
            assert_eq!(meta.is_writable, is_writable);
        }
    }

    #[test]
    fn temp_account_is_initialized_before_funding() {
        let payer = Keypair::new();
        let set = fund_temp_account(
            Pubkey::new_unique(),
            &payer,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            10,
        );
        assert_eq!(set.instructions.len(), 2);
        assert_eq!(set.instructions[0].program_id, spl_token::id());
        assert_eq!(set.instructions[0].data[0], INITIALIZE_ACCOUNT_TAG);
        assert_eq!(set.instructions[1].program_id, spl_token::id());
        assert_eq!(set.instructions[1].data[0], TRANSFER_TAG);
        assert_eq!(&set.instructions[1].data[1..9], &10u64.to_le_bytes());
    }

    #[tokio::test]
    async fn escrow_state_account_is_owned_by_the_program() {
        let program_id = Pubkey::new_unique();
        let funder = Keypair::new();
        let account = Keypair::new();
        let set = create_escrow_state_account(&funder, &account, program_id, |size| async move {
            Ok::<_, Infallible>(size as u64 * 10)
        })
        .await
        .unwrap();

        assert_eq!(set.instructions.len(), 1);
        assert_eq!(set.instructions[0].program_id, system_program::id());
        match bincode::deserialize(&set.instructions[0].data).unwrap() {
            SystemInstruction::CreateAccount {
                lamports,
                space,
                owner,
            } => {
                assert_eq!(lamports, EscrowState::LEN as u64 * 10);
                assert_eq!(space, EscrowState::LEN as u64);
                assert_eq!(owner, program_id);
            }
            other => panic!("expected CreateAccount, got {other:?}"),
        }
        // funder and fresh account both sign the creation
        assert_eq!(set.signers.len(), 2);
    }

    #[tokio::test]
    async fn temp_account_is_sized_for_a_token_account() {
        let funder = Keypair::new();
        let account = Keypair::new();
        let set = create_token_sized_account(&funder, &account, |size| async move {
            Ok::<_, Infallible>(size as u64)
        })
        .await
        .unwrap();
        match bincode::deserialize(&set.instructions[0].data).unwrap() {
            SystemInstruction::CreateAccount { space, owner, .. } => {
                assert_eq!(space, TokenAccount::LEN as u64);
                assert_eq!(owner, spl_token::id());
            }
            other => panic!("expected CreateAccount, got {other:?}"),
        }
    }
}
