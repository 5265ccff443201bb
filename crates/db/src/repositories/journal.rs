//! The journal posting engine.
//!
//! Orchestrates validate -> allocate number -> persist -> materialize for
//! entry creation, plus the post and reverse transitions. Every mutation
//! runs inside one database transaction: any failure aborts the whole
//! operation and leaves zero partial state.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::{balance, sequence::SequenceGenerator, PostingError};
use crate::entities::{
    accounts, journal_entries, journal_lines,
    sea_orm_active_enums::{EntrySource, EntryStatus},
};
use neraca_core::ledger::{
    entry_prefix, reversal_description, reversal_reference, reversing_lines, validate,
    AccountInfo, CreateEntryInput, EntryStatus as CoreEntryStatus, EntrySummary, EntryTotals,
    LedgerError, LineInput, SourceType,
};

/// Base delay for the contention retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 50;

/// Default retry attempts for contended mutations.
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// A journal entry together with its lines.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// The entry header.
    pub entry: journal_entries::Model,
    /// The lines, ordered by line number.
    pub lines: Vec<journal_lines::Model>,
}

/// Repository implementing the journal posting engine.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    retry_attempts: u32,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    /// Overrides the retry budget for contended mutations.
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Creates a journal entry in a single atomic transaction.
    ///
    /// Allocates the entry number, validates, persists the entry and lines,
    /// and, when `auto_post` is set, materializes every touched account's
    /// balance and marks the entry posted. Any failure aborts the whole
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] for validation, idempotency, and
    /// contention failures, or a database error.
    pub async fn create_entry(&self, input: CreateEntryInput) -> Result<EntrySummary, PostingError> {
        let txn = self.db.begin().await?;
        let summary = self.create_internal(&txn, &input, None).await?;
        txn.commit().await?;

        tracing::info!(
            entry_number = %summary.entry_number,
            source_type = ?input.source_type,
            status = ?summary.status,
            "journal entry created"
        );
        Ok(summary)
    }

    /// Creates a journal entry inside an existing transaction.
    ///
    /// Used when the entry must commit or roll back together with other
    /// writes owned by the caller.
    pub async fn create_entry_in(
        &self,
        txn: &DatabaseTransaction,
        input: &CreateEntryInput,
    ) -> Result<EntrySummary, PostingError> {
        self.create_internal(txn, input, None).await
    }

    /// [`Self::create_entry`] with bounded exponential backoff on transient
    /// contention (sequence or balance lock races).
    pub async fn create_entry_with_retry(
        &self,
        input: CreateEntryInput,
    ) -> Result<EntrySummary, PostingError> {
        let mut attempt = 0;
        loop {
            match self.create_entry(input.clone()).await {
                Err(err) if err.is_retryable() && attempt + 1 < self.retry_attempts => {
                    attempt += 1;
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << attempt);
                    tracing::warn!(%err, attempt, "retrying contended entry creation");
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Posts a draft entry: draft -> posted with defensive re-validation.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::AlreadyPosted`] / [`LedgerError::AlreadyReversed`]
    /// on illegal transitions, or with a validation error if the chart
    /// changed since the draft was created.
    pub async fn post_entry(&self, id: Uuid) -> Result<EntrySummary, PostingError> {
        let txn = self.db.begin().await?;

        let entry = journal_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        match entry.status {
            EntryStatus::Draft => {}
            EntryStatus::Posted => return Err(LedgerError::AlreadyPosted(id).into()),
            EntryStatus::Reversed => return Err(LedgerError::AlreadyReversed(id).into()),
        }

        let lines = Self::load_lines(&txn, id).await?;
        let line_inputs: Vec<LineInput> = lines.iter().map(line_input_from_model).collect();

        // Re-validate against the current chart before the entry starts
        // affecting balances.
        let revalidation = CreateEntryInput {
            source_type: entry.source_type.clone().into(),
            source_id: entry.source_id,
            reference: entry.reference.clone(),
            entry_date: entry.entry_date,
            description: entry.description.clone(),
            lines: line_inputs,
            auto_post: true,
            created_by: entry.created_by,
        };
        let account_infos = Self::load_accounts(&txn, &revalidation.lines).await?;
        let totals = validate(&revalidation, &account_infos)?;

        for (account_id, (debit, credit)) in account_deltas(&revalidation.lines) {
            let account = &account_infos[&account_id];
            balance::apply_posting(&txn, account, debit, credit).await?;
        }

        let entry_number = entry.entry_number.clone();
        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(EntryStatus::Posted);
        active.posted_at = Set(Some(Utc::now().into()));
        active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(%entry_number, "journal entry posted");
        Ok(EntrySummary {
            id,
            entry_number,
            status: CoreEntryStatus::Posted,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            is_balanced: totals.is_balanced,
        })
    }

    /// Reverses a posted entry.
    ///
    /// Creates a new entry with every line's debit and credit swapped
    /// against the same accounts, posts it atomically, and flips the
    /// original to reversed while retaining its lines for audit.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::NotPosted`] for drafts and
    /// [`LedgerError::AlreadyReversed`] for reversed entries.
    pub async fn reverse_entry(
        &self,
        id: Uuid,
        reason: &str,
        actor: Uuid,
    ) -> Result<EntrySummary, PostingError> {
        let txn = self.db.begin().await?;

        let original = journal_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        match original.status {
            EntryStatus::Posted => {}
            EntryStatus::Reversed => return Err(LedgerError::AlreadyReversed(id).into()),
            EntryStatus::Draft => return Err(LedgerError::NotPosted(id).into()),
        }

        let lines = Self::load_lines(&txn, id).await?;
        let original_inputs: Vec<LineInput> = lines.iter().map(line_input_from_model).collect();

        let reversal_input = CreateEntryInput {
            source_type: SourceType::Reversal,
            source_id: Some(id),
            reference: reversal_reference(&original.reference),
            entry_date: Utc::now().date_naive(),
            description: reversal_description(&original.entry_number, reason),
            lines: reversing_lines(&original_inputs),
            auto_post: true,
            created_by: actor,
        };
        let summary = self.create_internal(&txn, &reversal_input, Some(id)).await?;

        let original_number = original.entry_number.clone();
        let mut active: journal_entries::ActiveModel = original.into();
        active.status = Set(EntryStatus::Reversed);
        active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            original = %original_number,
            reversal = %summary.entry_number,
            "journal entry reversed"
        );
        Ok(summary)
    }

    /// Finds the entry created for a source record, if any.
    ///
    /// This is the idempotency lookup adapters use to short-circuit retried
    /// domain operations.
    pub async fn find_by_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<EntrySummary>, PostingError> {
        let entry = journal_entries::Entity::find()
            .filter(journal_entries::Column::SourceType.eq(EntrySource::from(source_type)))
            .filter(journal_entries::Column::SourceId.eq(source_id))
            .one(&self.db)
            .await?;
        Ok(entry.map(|model| summary_from_model(&model)))
    }

    /// Loads an entry with its lines.
    pub async fn get_entry(&self, id: Uuid) -> Result<EntryWithLines, PostingError> {
        let entry = journal_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.eq(id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(&self.db)
            .await?;
        Ok(EntryWithLines { entry, lines })
    }

    async fn create_internal(
        &self,
        txn: &DatabaseTransaction,
        input: &CreateEntryInput,
        reversal_of: Option<Uuid>,
    ) -> Result<EntrySummary, PostingError> {
        // Idempotency pre-check: one entry per originating record.
        if let Some(source_id) = input.source_id {
            let existing = journal_entries::Entity::find()
                .filter(
                    journal_entries::Column::SourceType.eq(EntrySource::from(input.source_type)),
                )
                .filter(journal_entries::Column::SourceId.eq(source_id))
                .one(txn)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::DuplicateSource {
                    source_type: input.source_type,
                    source_id,
                }
                .into());
            }
        }

        let account_infos = Self::load_accounts(txn, &input.lines).await?;
        let totals = validate(input, &account_infos)?;

        let prefix = entry_prefix(input.source_type);
        let entry_number = SequenceGenerator::next_entry_number(txn, prefix).await?;

        let now = Utc::now();
        let entry_id = Uuid::new_v4();
        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            entry_number: Set(entry_number.clone()),
            source_type: Set(input.source_type.into()),
            source_id: Set(input.source_id),
            reference: Set(input.reference.clone()),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            status: Set(EntryStatus::Draft),
            total_debit: Set(totals.total_debit),
            total_credit: Set(totals.total_credit),
            created_by: Set(input.created_by),
            created_at: Set(now.into()),
            posted_at: Set(None),
            reversal_of: Set(reversal_of),
        }
        .insert(txn)
        .await
        .map_err(|err| map_unique_violation(err, input, prefix))?;

        for (index, line) in input.lines.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let line_number = index as i32 + 1;
            journal_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                journal_entry_id: Set(entry_id),
                line_number: Set(line_number),
                account_id: Set(line.account_id),
                description: Set(line.description.clone()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                created_at: Set(now.into()),
            }
            .insert(txn)
            .await?;
        }

        let mut status = CoreEntryStatus::Draft;
        if input.auto_post {
            for (account_id, (debit, credit)) in account_deltas(&input.lines) {
                let account = &account_infos[&account_id];
                balance::apply_posting(txn, account, debit, credit).await?;
            }

            let mut active: journal_entries::ActiveModel = entry.into();
            active.status = Set(EntryStatus::Posted);
            active.posted_at = Set(Some(now.into()));
            active.update(txn).await?;
            status = CoreEntryStatus::Posted;
        }

        Ok(EntrySummary {
            id: entry_id,
            entry_number,
            status,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            is_balanced: totals.is_balanced,
        })
    }

    /// Loads the accounts referenced by the lines, inside the transaction.
    ///
    /// Activity flags are read here, not from any cache: the validator must
    /// see the chart as of this transaction.
    async fn load_accounts(
        txn: &DatabaseTransaction,
        lines: &[LineInput],
    ) -> Result<HashMap<Uuid, AccountInfo>, PostingError> {
        let mut ids: Vec<Uuid> = lines.iter().map(|line| line.account_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids))
            .all(txn)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| {
                (
                    model.id,
                    AccountInfo {
                        id: model.id,
                        code: model.code,
                        account_type: model.account_type.into(),
                        is_active: model.is_active,
                        is_postable: !model.is_header,
                    },
                )
            })
            .collect())
    }

    async fn load_lines(
        txn: &DatabaseTransaction,
        entry_id: Uuid,
    ) -> Result<Vec<journal_lines::Model>, PostingError> {
        Ok(journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(txn)
            .await?)
    }
}

/// Aggregates per-account deltas in a deterministic account order.
///
/// Balance rows are locked in this order, so two entries touching the same
/// accounts can never deadlock on each other.
fn account_deltas(lines: &[LineInput]) -> BTreeMap<Uuid, (Decimal, Decimal)> {
    let mut deltas: BTreeMap<Uuid, (Decimal, Decimal)> = BTreeMap::new();
    for line in lines {
        let entry = deltas.entry(line.account_id).or_default();
        entry.0 += line.debit;
        entry.1 += line.credit;
    }
    deltas
}

fn line_input_from_model(model: &journal_lines::Model) -> LineInput {
    LineInput {
        account_id: model.account_id,
        description: model.description.clone(),
        debit: model.debit,
        credit: model.credit,
    }
}

/// Builds a summary from a stored entry header.
pub(crate) fn summary_from_model(model: &journal_entries::Model) -> EntrySummary {
    let totals = EntryTotals::new(model.total_debit, model.total_credit);
    EntrySummary {
        id: model.id,
        entry_number: model.entry_number.clone(),
        status: model.status.clone().into(),
        total_debit: totals.total_debit,
        total_credit: totals.total_credit,
        is_balanced: totals.is_balanced,
    }
}

/// Maps unique-constraint races to their domain errors.
///
/// The source index race loses to a concurrent submission of the same
/// record; the entry-number race means two transactions slipped past the
/// sequence lock and is retried like any other contention.
fn map_unique_violation(err: DbErr, input: &CreateEntryInput, prefix: &str) -> PostingError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        if detail.contains("idx_journal_entries_source") {
            if let Some(source_id) = input.source_id {
                return LedgerError::DuplicateSource {
                    source_type: input.source_type,
                    source_id,
                }
                .into();
            }
        }
        if detail.contains("entry_number") {
            return LedgerError::SequenceContention {
                prefix: prefix.to_string(),
            }
            .into();
        }
    }
    err.into()
}
