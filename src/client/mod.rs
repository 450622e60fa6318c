//! Transaction assembly and submission helpers.

pub mod system_program;
pub mod token;

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::hash::Hasher;
use std::iter::once;
use std::ops::Deref;
use std::time::Duration;

use solana_client::client_error::Result as ClientResult;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_program::hash::Hash;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::{Keypair, Signature, SignerError};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, TransactionError};
use tokio::time::sleep;

use crate::error::EscrowClientError;
use crate::SolanaInstruction;

/// An ordered list of instructions together with the signers they require.
///
/// Builder functions return these so instruction lists and their signatures
/// travel together and several operations can be spliced into one
/// transaction. [`InstructionSet::add`] preserves instruction order, which
/// the escrow builders rely on.
#[derive(Debug, Default)]
pub struct InstructionSet<'a> {
    /// The instructions, in submission order
    pub instructions: Vec<SolanaInstruction>,
    /// The signers required by `instructions`
    pub signers: HashSet<HashedSigner<'a>>,
}
impl<'a> InstructionSet<'a> {
    /// Appends `other` after this set's instructions, merging signers.
    #[must_use]
    pub fn add(mut self, other: InstructionSet<'a>) -> Self {
        self.instructions.extend(other.instructions);
        self.signers.extend(other.signers);
        self
    }
}

/// Terminal status of a submitted transaction.
#[derive(Debug)]
pub enum ConfirmationResult {
    /// The transaction reached the requested commitment
    Success,
    /// The ledger processed and rejected the transaction
    Failure(TransactionError),
    /// The blockhash expired before the signature was observed
    Dropped,
}

/// Transaction building helper
#[derive(Debug)]
pub struct TransactionBuilder<'a> {
    /// The instructions for this transaction
    pub instructions: Vec<SolanaInstruction>,
    /// The signers for this transaction
    pub signers: HashSet<HashedSigner<'a>>,
    /// The payer for this transaction
    pub payer: Pubkey,
}
impl<'a> TransactionBuilder<'a> {
    /// Creates a new [`TransactionBuilder`] with a fee payer.
    #[must_use]
    pub fn new<S>(payer: S) -> Self
    where
        HashedSigner<'a>: From<S>,
    {
        let payer = HashedSigner::from(payer);
        Self {
            instructions: Vec::new(),
            payer: payer.pubkey(),
            signers: once(payer).collect(),
        }
    }

    /// Adds a single instruction to this transaction.
    pub fn instruction(&mut self, instruction: SolanaInstruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Adds a signer. The same signer may be added twice, it will sign once.
    pub fn signer<S>(&mut self, signer: S) -> &mut Self
    where
        HashedSigner<'a>: From<S>,
    {
        self.signers.insert(signer.into());
        self
    }

    /// Adds an [`InstructionSet`]'s instructions and signers.
    pub fn signed_instructions(&mut self, set: InstructionSet<'a>) -> &mut Self {
        self.instructions.extend(set.instructions);
        self.signers.extend(set.signers);
        self
    }

    /// Signs this into a transaction against `recent_blockhash`.
    #[must_use]
    pub fn to_transaction(&self, recent_blockhash: Hash) -> Transaction {
        Transaction::new_signed_with_payer(
            &self.instructions,
            Some(&self.payer),
            &self.signers.iter().collect::<Vec<_>>(),
            recent_blockhash,
        )
    }

    /// Submits this transaction and polls its signature status every
    /// `poll_interval` until `commitment` is reached.
    ///
    /// Resolves to [`ConfirmationResult::Dropped`] if the transaction's
    /// blockhash expires without the signature being observed.
    pub async fn send_and_confirm(
        &self,
        client: &RpcClient,
        config: RpcSendTransactionConfig,
        commitment: CommitmentConfig,
        poll_interval: Duration,
    ) -> ClientResult<(Signature, ConfirmationResult)> {
        let (recent_blockhash, last_valid_block_height) = client
            .get_latest_blockhash_with_commitment(commitment)
            .await?;
        let transaction = self.to_transaction(recent_blockhash);
        let signature = client
            .send_transaction_with_config(&transaction, config)
            .await?;
        loop {
            if let Some(status) = client
                .get_signature_status_with_commitment(&signature, commitment)
                .await?
            {
                let result = match status {
                    Ok(()) => ConfirmationResult::Success,
                    Err(error) => ConfirmationResult::Failure(error),
                };
                return Ok((signature, result));
            }
            let block_height = client.get_block_height_with_commitment(commitment).await?;
            if block_height > last_valid_block_height {
                return Ok((signature, ConfirmationResult::Dropped));
            }
            sleep(poll_interval).await;
        }
    }
}

/// Submits `set` as a single transaction paid by `payer` and waits for the
/// client's commitment level. Ledger rejections and dropped transactions are
/// errors; there is no partial-success state.
pub async fn send_instruction_set<'a>(
    client: &RpcClient,
    payer: &'a Keypair,
    set: InstructionSet<'a>,
    poll_interval: Duration,
) -> Result<Signature, EscrowClientError> {
    let commitment = client.commitment();
    let config = RpcSendTransactionConfig {
        preflight_commitment: Some(commitment.commitment),
        ..RpcSendTransactionConfig::default()
    };
    let (signature, result) = TransactionBuilder::new(payer)
        .signed_instructions(set)
        .send_and_confirm(client, config, commitment, poll_interval)
        .await?;
    match result {
        ConfirmationResult::Success => Ok(signature),
        ConfirmationResult::Failure(error) => Err(EscrowClientError::TransactionFailed(error)),
        ConfirmationResult::Dropped => Err(EscrowClientError::TransactionDropped),
    }
}

/// A [`Signer`] hashed and compared by pubkey so signer sets deduplicate.
pub struct HashedSigner<'a>(SignerCow<'a>);
impl<'a> Debug for HashedSigner<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashedSigner")
            .field(&self.0.pubkey())
            .finish()
    }
}
impl<'a> PartialEq for HashedSigner<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.0.pubkey().eq(&other.0.pubkey())
    }
}
impl<'a> Eq for HashedSigner<'a> {}
impl<'a> std::hash::Hash for HashedSigner<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.pubkey().hash(state);
    }
}
impl<'a> From<&'a dyn Signer> for HashedSigner<'a> {
    fn from(from: &'a dyn Signer) -> Self {
        Self(SignerCow::Borrowed(from))
    }
}
impl<'a> From<Keypair> for HashedSigner<'a> {
    fn from(from: Keypair) -> Self {
        Self(SignerCow::Owned(Box::new(from)))
    }
}
impl<'a> From<&'a Keypair> for HashedSigner<'a> {
    fn from(from: &'a Keypair) -> Self {
        Self(SignerCow::Borrowed(from))
    }
}

impl<'a> Signer for HashedSigner<'a> {
    #[inline]
    fn pubkey(&self) -> Pubkey {
        self.0.pubkey()
    }

    #[inline]
    fn try_pubkey(&self) -> Result<Pubkey, SignerError> {
        self.0.try_pubkey()
    }

    #[inline]
    fn sign_message(&self, message: &[u8]) -> Signature {
        self.0.sign_message(message)
    }

    #[inline]
    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.0.try_sign_message(message)
    }

    #[inline]
    fn is_interactive(&self) -> bool {
        self.0.is_interactive()
    }
}

enum SignerCow<'a> {
    Borrowed(&'a dyn Signer),
    Owned(Box<dyn Signer + 'a>),
}
impl<'a> Deref for SignerCow<'a> {
    type Target = dyn Signer + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            SignerCow::Borrowed(signer) => *signer,
            SignerCow::Owned(signer) => &**signer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::system_instruction;

    #[test]
    fn builder_dedupes_signers_by_pubkey() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let mut builder = TransactionBuilder::new(&payer);
        builder.signer(&payer).signer(&other).signer(&other);
        assert_eq!(builder.signers.len(), 2);
        assert_eq!(builder.payer, payer.pubkey());
    }

    #[test]
    fn instruction_set_add_preserves_order() {
        let a = Keypair::new();
        let b = Keypair::new();
        let first = system_program::create_account(&a, &b, 1, 1, Pubkey::new_unique());
        let second = InstructionSet {
            instructions: vec![system_instruction::transfer(
                &a.pubkey(),
                &b.pubkey(),
                1,
            )],
            signers: [HashedSigner::from(&a)].into_iter().collect(),
        };
        let combined = first.add(second);
        assert_eq!(combined.instructions.len(), 2);
        assert_eq!(
            combined.instructions[1],
            system_instruction::transfer(&a.pubkey(), &b.pubkey(), 1)
        );
        // `a` and `b` each sign once even though `a` appears in both sets.
        assert_eq!(combined.signers.len(), 2);
    }
}
