//! Read-only mirror of the escrow program's state record.

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::program_error::ProgramError;
use solana_program::program_pack::{IsInitialized, Pack, Sealed};
use solana_program::pubkey::Pubkey;

/// The record the escrow program keeps in the program-owned state account.
///
/// Field order and byte widths mirror the program's serialization exactly.
/// The program writes this record during `InitEscrow`; this crate only reads
/// it back for inspection, so any layout change on the program side must be
/// mirrored here before decoding can succeed again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EscrowState {
    /// Set by the program when `InitEscrow` completes
    pub is_initialized: bool,
    /// The account that set up the escrow
    pub initializer: Pubkey,
    /// The temporary token account whose authority the program moves to its
    /// derived address during initialization
    pub temp_token_account: Pubkey,
    /// The initializer's account for the tokens they expect back
    pub initializer_token_to_receive: Pubkey,
    /// Amount of the counterparty's mint the initializer expects
    pub expected_amount: u64,
}

impl Sealed for EscrowState {}

impl IsInitialized for EscrowState {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for EscrowState {
    const LEN: usize = 1 + 32 + 32 + 32 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, EscrowState::LEN];
        let (is_initialized, initializer, temp_token_account, initializer_token_to_receive, expected_amount) =
            array_refs![src, 1, 32, 32, 32, 8];
        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };
        Ok(Self {
            is_initialized,
            initializer: Pubkey::new_from_array(*initializer),
            temp_token_account: Pubkey::new_from_array(*temp_token_account),
            initializer_token_to_receive: Pubkey::new_from_array(*initializer_token_to_receive),
            expected_amount: u64::from_le_bytes(*expected_amount),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, EscrowState::LEN];
        let (is_initialized_dst, initializer_dst, temp_token_account_dst, initializer_token_to_receive_dst, expected_amount_dst) =
            mut_array_refs![dst, 1, 32, 32, 32, 8];
        is_initialized_dst[0] = u8::from(self.is_initialized);
        initializer_dst.copy_from_slice(self.initializer.as_ref());
        temp_token_account_dst.copy_from_slice(self.temp_token_account.as_ref());
        initializer_token_to_receive_dst.copy_from_slice(self.initializer_token_to_receive.as_ref());
        *expected_amount_dst = self.expected_amount.to_le_bytes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_105_bytes() {
        assert_eq!(EscrowState::LEN, 105);
    }

    #[test]
    fn pack_round_trips() {
        let state = EscrowState {
            is_initialized: true,
            initializer: Pubkey::new_unique(),
            temp_token_account: Pubkey::new_unique(),
            initializer_token_to_receive: Pubkey::new_unique(),
            expected_amount: 20,
        };
        let mut buffer = [0u8; EscrowState::LEN];
        state.pack_into_slice(&mut buffer);
        assert_eq!(buffer[0], 1);
        assert_eq!(&buffer[97..], &20u64.to_le_bytes());
        assert_eq!(EscrowState::unpack_from_slice(&buffer).unwrap(), state);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let short = [0u8; EscrowState::LEN - 1];
        assert_eq!(
            EscrowState::unpack_unchecked(&short),
            Err(ProgramError::InvalidAccountData)
        );
        let long = [0u8; EscrowState::LEN + 1];
        assert_eq!(
            EscrowState::unpack_unchecked(&long),
            Err(ProgramError::InvalidAccountData)
        );
    }

    #[test]
    fn flag_bytes_other_than_bool_are_rejected() {
        let mut buffer = [0u8; EscrowState::LEN];
        buffer[0] = 2;
        assert_eq!(
            EscrowState::unpack_from_slice(&buffer),
            Err(ProgramError::InvalidAccountData)
        );
    }
}
