//! Journal adapter for the sales subsystem.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::require_account;
use crate::repositories::{AccountRepository, JournalRepository, PostingError};
use neraca_core::ledger::{CreateEntryInput, EntrySummary, LedgerError, SourceType};
use neraca_core::sources::sale::{build_lines, SaleAccounts};
use neraca_core::sources::{chart, Sale};

/// Translates sales into posted journal entries.
#[derive(Clone)]
pub struct SaleJournalAdapter {
    journal: JournalRepository,
    accounts: AccountRepository,
}

impl SaleJournalAdapter {
    /// Creates a new sales adapter.
    #[must_use]
    pub const fn new(journal: JournalRepository, accounts: AccountRepository) -> Self {
        Self { journal, accounts }
    }

    /// Records the journal entry for a sale.
    ///
    /// Idempotent on the sale ID: a retried domain operation returns the
    /// entry created by the first call instead of double-posting.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::MissingAccount`] when a required chart
    /// account is absent; nothing is written in that case.
    pub async fn record(&self, sale: &Sale, actor: Uuid) -> Result<EntrySummary, PostingError> {
        if let Some(existing) = self.journal.find_by_source(SourceType::Sale, sale.id).await? {
            tracing::debug!(sale = %sale.code, entry = %existing.entry_number, "sale already journaled");
            return Ok(existing);
        }

        // Cash/bank for immediate settlement, receivable for credit sales.
        let settlement_code = sale
            .payment_method
            .settlement_account_code()
            .unwrap_or(chart::ACCOUNTS_RECEIVABLE);
        let settlement = require_account(&self.accounts, settlement_code, "settlement").await?;
        let revenue = require_account(&self.accounts, chart::SALES_REVENUE, "sales revenue").await?;
        let output_vat = if sale.tax_amount > Decimal::ZERO {
            Some(require_account(&self.accounts, chart::OUTPUT_VAT, "output VAT").await?)
        } else {
            None
        };

        let lines = build_lines(
            sale,
            &SaleAccounts {
                settlement,
                revenue,
                output_vat,
            },
        )?;

        let input = CreateEntryInput {
            source_type: SourceType::Sale,
            source_id: Some(sale.id),
            reference: sale.code.clone(),
            entry_date: sale.date,
            description: format!("Sales invoice {} - {}", sale.code, sale.customer_name),
            lines,
            auto_post: true,
            created_by: actor,
        };

        match self.journal.create_entry_with_retry(input).await {
            // Lost the race to a concurrent submission of the same sale;
            // the winner's entry is the answer.
            Err(PostingError::Ledger(LedgerError::DuplicateSource { .. })) => self
                .journal
                .find_by_source(SourceType::Sale, sale.id)
                .await?
                .ok_or_else(|| {
                    LedgerError::DuplicateSource {
                        source_type: SourceType::Sale,
                        source_id: sale.id,
                    }
                    .into()
                }),
            other => other,
        }
    }
}
