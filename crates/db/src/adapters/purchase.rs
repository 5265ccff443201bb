//! Journal adapter for the purchasing subsystem.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::require_account;
use crate::repositories::{AccountRepository, JournalRepository, PostingError};
use neraca_core::ledger::{CreateEntryInput, EntrySummary, LedgerError, SourceType};
use neraca_core::sources::purchase::{build_lines, PurchaseAccounts};
use neraca_core::sources::{chart, Purchase};

/// Translates purchases into posted journal entries.
#[derive(Clone)]
pub struct PurchaseJournalAdapter {
    journal: JournalRepository,
    accounts: AccountRepository,
}

impl PurchaseJournalAdapter {
    /// Creates a new purchasing adapter.
    #[must_use]
    pub const fn new(journal: JournalRepository, accounts: AccountRepository) -> Self {
        Self { journal, accounts }
    }

    /// Records the journal entry for a purchase.
    ///
    /// Idempotent on the purchase ID. The credit side depends on the
    /// payment method: cash/bank for immediate settlement, accounts
    /// payable for on-account purchases.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::MissingAccount`] when a required chart
    /// account is absent; nothing is written in that case.
    pub async fn record(
        &self,
        purchase: &Purchase,
        actor: Uuid,
    ) -> Result<EntrySummary, PostingError> {
        if let Some(existing) = self
            .journal
            .find_by_source(SourceType::Purchase, purchase.id)
            .await?
        {
            tracing::debug!(
                purchase = %purchase.code,
                entry = %existing.entry_number,
                "purchase already journaled"
            );
            return Ok(existing);
        }

        let inventory = require_account(&self.accounts, chart::INVENTORY, "inventory").await?;
        let payable =
            require_account(&self.accounts, chart::ACCOUNTS_PAYABLE, "accounts payable").await?;
        let input_vat = if purchase.tax_amount > Decimal::ZERO {
            Some(require_account(&self.accounts, chart::INPUT_VAT, "input VAT").await?)
        } else {
            None
        };
        let settlement = match purchase.payment_method.settlement_account_code() {
            Some(code) => Some(require_account(&self.accounts, code, "settlement").await?),
            None => None,
        };

        let lines = build_lines(
            purchase,
            &PurchaseAccounts {
                inventory,
                input_vat,
                payable,
                settlement,
            },
        )?;

        let input = CreateEntryInput {
            source_type: SourceType::Purchase,
            source_id: Some(purchase.id),
            reference: purchase.code.clone(),
            entry_date: purchase.date,
            description: format!("Purchase {} - {}", purchase.code, purchase.vendor_name),
            lines,
            auto_post: true,
            created_by: actor,
        };

        match self.journal.create_entry_with_retry(input).await {
            Err(PostingError::Ledger(LedgerError::DuplicateSource { .. })) => self
                .journal
                .find_by_source(SourceType::Purchase, purchase.id)
                .await?
                .ok_or_else(|| {
                    LedgerError::DuplicateSource {
                        source_type: SourceType::Purchase,
                        source_id: purchase.id,
                    }
                    .into()
                }),
            other => other,
        }
    }
}
