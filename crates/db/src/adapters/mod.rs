//! Source adapters: the contract by which domain subsystems submit
//! transactions to the ledger.
//!
//! Each adapter resolves its required accounts by fixed chart codes
//! (failing fast with an integrity error when one is missing), checks the
//! `(source_type, source_id)` idempotency key, builds the balanced line set
//! via the pure treatments in `neraca_core::sources`, and submits with
//! `auto_post` so the entry lands posted in one transaction.

pub mod payment;
pub mod purchase;
pub mod sale;

pub use payment::PaymentJournalAdapter;
pub use purchase::PurchaseJournalAdapter;
pub use sale::SaleJournalAdapter;

use uuid::Uuid;

use crate::repositories::{AccountRepository, PostingError};
use neraca_core::ledger::LedgerError;

/// Resolves a required chart account, failing fast when it is missing.
pub(crate) async fn require_account(
    accounts: &AccountRepository,
    code: &str,
    role: &str,
) -> Result<Uuid, PostingError> {
    let account = accounts.find_by_code(code).await?;
    account.map(|model| model.id).ok_or_else(|| {
        LedgerError::MissingAccount {
            code: code.to_string(),
            role: role.to_string(),
        }
        .into()
    })
}
