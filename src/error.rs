//! Errors surfaced by the escrow client.

use solana_client::client_error::ClientError;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Errors produced while building, submitting, or inspecting escrow
/// transactions.
///
/// Nothing is retried internally and nothing is reformatted: RPC and ledger
/// errors pass through as received. Callers retry by re-running the whole
/// workflow, which allocates fresh keypairs and cannot collide with a
/// partially failed attempt.
#[derive(Debug, Error)]
pub enum EscrowClientError {
    /// Transport or node failure while talking to the cluster
    #[error("rpc client error: {0}")]
    Client(#[from] ClientError),
    /// The ledger processed the transaction and rejected it
    #[error("transaction rejected by the ledger: {0}")]
    TransactionFailed(TransactionError),
    /// The transaction's blockhash expired before the signature was observed
    #[error("transaction dropped before reaching commitment")]
    TransactionDropped,
    /// An instruction builder or account decoder rejected its input
    #[error("program interface error: {0}")]
    Program(#[from] ProgramError),
    /// Borsh serialization of an instruction payload failed
    #[error("instruction payload serialization failed: {0}")]
    Serialize(#[from] std::io::Error),
    /// The requested account does not exist at the queried commitment
    #[error("account {0} does not exist")]
    AccountNotFound(Pubkey),
    /// The escrow account's data is not the size of the state record. This is
    /// schema drift between client and program, not a runtime condition.
    #[error("escrow state is {actual} bytes, expected {expected}: client/program schema mismatch")]
    StateLength {
        /// The record length this client was built against
        expected: usize,
        /// The length reported by the ledger
        actual: usize,
    },
}
