//! Journal adapter for the payments subsystem.
//!
//! Payments support two submission paths: `record` posts synchronously in
//! one transaction, `enqueue` defers posting to the queue worker when the
//! payment itself must commit first. Both paths converge on the same
//! idempotency key, so a deferred task replayed after a synchronous post
//! (or vice versa) never double-posts.

use uuid::Uuid;

use super::require_account;
use crate::repositories::{
    AccountRepository, JournalRepository, PostingError, PostingQueue, QueueError,
};
use neraca_core::ledger::{CreateEntryInput, EntrySummary, LedgerError, SourceType};
use neraca_core::sources::payment::{build_lines, PaymentAccounts, PaymentDirection};
use neraca_core::sources::{chart, Payment};

/// Translates payments into posted journal entries.
#[derive(Clone)]
pub struct PaymentJournalAdapter {
    journal: JournalRepository,
    accounts: AccountRepository,
}

impl PaymentJournalAdapter {
    /// Creates a new payments adapter.
    #[must_use]
    pub const fn new(journal: JournalRepository, accounts: AccountRepository) -> Self {
        Self { journal, accounts }
    }

    /// Records the journal entry for a payment.
    ///
    /// Idempotent on the payment ID; the queue worker calls this for
    /// deferred tasks, so replayed deliveries short-circuit here.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::MissingAccount`] when a required chart
    /// account is absent; nothing is written in that case.
    pub async fn record(
        &self,
        payment: &Payment,
        actor: Uuid,
    ) -> Result<EntrySummary, PostingError> {
        if let Some(existing) = self
            .journal
            .find_by_source(SourceType::Payment, payment.id)
            .await?
        {
            tracing::debug!(
                payment = %payment.reference,
                entry = %existing.entry_number,
                "payment already journaled"
            );
            return Ok(existing);
        }

        let settlement_code = payment
            .method
            .settlement_account_code()
            .unwrap_or(chart::BANK);
        let settlement = require_account(&self.accounts, settlement_code, "settlement").await?;
        let counterparty = match payment.direction {
            PaymentDirection::Receivable => {
                require_account(
                    &self.accounts,
                    chart::ACCOUNTS_RECEIVABLE,
                    "accounts receivable",
                )
                .await?
            }
            PaymentDirection::Payable => {
                require_account(&self.accounts, chart::ACCOUNTS_PAYABLE, "accounts payable").await?
            }
        };

        let lines = build_lines(
            payment,
            &PaymentAccounts {
                settlement,
                counterparty,
            },
        );

        let description = match payment.direction {
            PaymentDirection::Receivable => format!(
                "Payment received from {} - {}",
                payment.contact_name, payment.reference
            ),
            PaymentDirection::Payable => {
                format!("Payment to {} - {}", payment.contact_name, payment.reference)
            }
        };

        let input = CreateEntryInput {
            source_type: SourceType::Payment,
            source_id: Some(payment.id),
            reference: payment.reference.clone(),
            entry_date: payment.date,
            description,
            lines,
            auto_post: true,
            created_by: actor,
        };

        match self.journal.create_entry_with_retry(input).await {
            Err(PostingError::Ledger(LedgerError::DuplicateSource { .. })) => self
                .journal
                .find_by_source(SourceType::Payment, payment.id)
                .await?
                .ok_or_else(|| {
                    LedgerError::DuplicateSource {
                        source_type: SourceType::Payment,
                        source_id: payment.id,
                    }
                    .into()
                }),
            other => other,
        }
    }

    /// Defers the journal entry to the queue worker.
    ///
    /// Used when the payment has already committed in its own transaction
    /// and the journal must follow with at-least-once semantics.
    pub async fn enqueue(
        &self,
        queue: &PostingQueue,
        payment: &Payment,
        actor: Uuid,
    ) -> Result<Uuid, QueueError> {
        queue.enqueue_payment(payment, actor).await
    }
}
