//! Repository abstractions for the ledger schema.

pub mod account;
pub mod balance;
pub mod journal;
pub mod queue;
pub mod report;
pub mod sequence;

pub use account::{AccountError, AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use balance::{BalanceDrift, BalanceRepository};
pub use journal::{EntryWithLines, JournalRepository};
pub use queue::{PaymentTask, PostingQueue, QueueError, PAYMENT_TASK_KIND};
pub use report::{AccountBalanceRow, LedgerRow, ReportReader};
pub use sequence::SequenceGenerator;

use neraca_core::ledger::LedgerError;
use sea_orm::DbErr;

/// Error type for posting-engine operations.
///
/// Wraps the domain-level [`LedgerError`] taxonomy and raw storage failures.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// Domain error (validation, state, concurrency, integrity).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PostingError {
    /// Returns true if the operation is worth retrying with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Database(err) => is_transient_db_err(err),
        }
    }
}

/// Lock and serialization failures that a retry can resolve.
pub(crate) fn is_transient_db_err(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("deadlock")
        || msg.contains("lock timeout")
        || msg.contains("could not obtain lock")
        || msg.contains("could not serialize access")
}
