//! Balance materialization.
//!
//! Balance snapshots are written only here, inside the same transaction as
//! the entry/line write, so the materialized balance and the ledger can
//! never diverge. `recompute` re-sums the posted lines and backs the
//! administrative auto-heal tool.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{is_transient_db_err, PostingError};
use crate::entities::{
    account_balances, accounts, journal_entries, journal_lines,
    sea_orm_active_enums::EntryStatus,
};
use neraca_core::ledger::{AccountInfo, AccountType, LedgerError};

/// Drift report for one account: materialized vs recomputed balance.
#[derive(Debug, Clone)]
pub struct BalanceDrift {
    /// The account ID.
    pub account_id: Uuid,
    /// The account code.
    pub code: String,
    /// The materialized snapshot balance.
    pub cached: Decimal,
    /// The balance recomputed from posted lines.
    pub recomputed: Decimal,
    /// Whether the snapshot was rewritten.
    pub healed: bool,
}

impl BalanceDrift {
    /// Returns true if snapshot and recomputed balance disagree.
    #[must_use]
    pub fn drifted(&self) -> bool {
        self.cached != self.recomputed
    }
}

/// Applies one line's deltas to the account's balance snapshot.
///
/// Locks the snapshot row `FOR UPDATE`, which serializes concurrent
/// postings to the same account; postings to different accounts proceed in
/// parallel. Must run inside the transaction that writes the entry.
///
/// Reversals reuse this call with the deltas already swapped on the lines.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceContention`] on lock failures; callers
/// retry with backoff.
pub async fn apply_posting(
    txn: &DatabaseTransaction,
    account: &AccountInfo,
    debit: Decimal,
    credit: Decimal,
) -> Result<(), PostingError> {
    let change = account.account_type.normal_balance().balance_change(debit, credit);
    let now = Utc::now();

    let snapshot = account_balances::Entity::find_by_id(account.id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(|err| {
            if is_transient_db_err(&err) {
                PostingError::Ledger(LedgerError::BalanceContention {
                    account_id: account.id,
                })
            } else {
                err.into()
            }
        })?;

    match snapshot {
        Some(row) => {
            let balance = row.current_balance + change;
            let mut active: account_balances::ActiveModel = row.into();
            active.current_balance = Set(balance);
            active.last_updated = Set(now.into());
            active.update(txn).await?;
        }
        None => {
            // Accounts normally get their snapshot row at creation time.
            account_balances::ActiveModel {
                account_id: Set(account.id),
                current_balance: Set(change),
                last_updated: Set(now.into()),
            }
            .insert(txn)
            .await?;
        }
    }

    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct LineSums {
    debit_total: Option<Decimal>,
    credit_total: Option<Decimal>,
}

/// Repository for reading, recomputing, and healing balance snapshots.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the materialized balance for an account (zero when no snapshot).
    pub async fn get(&self, account_id: Uuid) -> Result<Decimal, PostingError> {
        let snapshot = account_balances::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?;
        Ok(snapshot.map_or(Decimal::ZERO, |row| row.current_balance))
    }

    /// Recomputes the balance from the lines of ledger-effective entries.
    ///
    /// Reversed entries are included: their lines were posted and remain in
    /// force, negated by the reversal entry's own posted lines.
    pub async fn recompute(&self, account_id: Uuid) -> Result<Decimal, PostingError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let account_type: AccountType = account.account_type.into();

        let sums = journal_lines::Entity::find()
            .select_only()
            .column_as(journal_lines::Column::Debit.sum(), "debit_total")
            .column_as(journal_lines::Column::Credit.sum(), "credit_total")
            .join(
                JoinType::InnerJoin,
                journal_lines::Relation::JournalEntries.def(),
            )
            .filter(journal_lines::Column::AccountId.eq(account_id))
            .filter(
                journal_entries::Column::Status
                    .is_in([EntryStatus::Posted, EntryStatus::Reversed]),
            )
            .into_model::<LineSums>()
            .one(&self.db)
            .await?;

        let (debit, credit) = sums.map_or((Decimal::ZERO, Decimal::ZERO), |s| {
            (
                s.debit_total.unwrap_or_default(),
                s.credit_total.unwrap_or_default(),
            )
        });

        Ok(account_type.normal_balance().balance_change(debit, credit))
    }

    /// Recomputes one account and rewrites the snapshot on drift.
    pub async fn heal(&self, account_id: Uuid) -> Result<BalanceDrift, PostingError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let recomputed = self.recompute(account_id).await?;

        let txn = self.db.begin().await?;
        let snapshot = account_balances::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(&txn)
            .await?;
        let cached = snapshot
            .as_ref()
            .map_or(Decimal::ZERO, |row| row.current_balance);

        let healed = cached != recomputed;
        if healed {
            tracing::warn!(
                account = %account.code,
                %cached,
                %recomputed,
                "balance drift detected, rewriting snapshot"
            );
            let now = Utc::now();
            match snapshot {
                Some(row) => {
                    let mut active: account_balances::ActiveModel = row.into();
                    active.current_balance = Set(recomputed);
                    active.last_updated = Set(now.into());
                    active.update(&txn).await?;
                }
                None => {
                    account_balances::ActiveModel {
                        account_id: Set(account_id),
                        current_balance: Set(recomputed),
                        last_updated: Set(now.into()),
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }
        txn.commit().await?;

        Ok(BalanceDrift {
            account_id,
            code: account.code,
            cached,
            recomputed,
            healed,
        })
    }

    /// Compares every account's snapshot against a recompute.
    ///
    /// Returns only the drifted accounts; does not rewrite anything.
    pub async fn verify_all(&self) -> Result<Vec<BalanceDrift>, PostingError> {
        let all_accounts = accounts::Entity::find().all(&self.db).await?;

        let mut drifted = Vec::new();
        for account in all_accounts {
            let recomputed = self.recompute(account.id).await?;
            let cached = self.get(account.id).await?;
            if cached != recomputed {
                drifted.push(BalanceDrift {
                    account_id: account.id,
                    code: account.code,
                    cached,
                    recomputed,
                    healed: false,
                });
            }
        }
        Ok(drifted)
    }
}
