//! Read-only queries for reporting collaborators.
//!
//! Reports derive exclusively from ledger-effective entries (posted, plus
//! reversed originals whose lines remain in force, negated by their
//! reversal entry). Draft entries are excluded unless explicitly requested.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use super::journal::{summary_from_model, EntryWithLines};
use super::PostingError;
use crate::entities::{
    account_balances, accounts, journal_entries, journal_lines,
    sea_orm_active_enums::{EntrySource, EntryStatus},
};
use neraca_core::ledger::{
    AccountType, EntryStatus as CoreEntryStatus, EntrySummary, SourceType,
};

/// An account with its balance for a balance listing.
#[derive(Debug, Clone)]
pub struct AccountBalanceRow {
    /// The account ID.
    pub account_id: Uuid,
    /// The account code.
    pub code: String,
    /// The account name.
    pub name: String,
    /// The account type.
    pub account_type: AccountType,
    /// The balance (materialized, or as-of aggregation).
    pub balance: Decimal,
}

/// One ledger line with its entry header context.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    /// The entry ID.
    pub entry_id: Uuid,
    /// The entry number.
    pub entry_number: String,
    /// The entry date.
    pub entry_date: NaiveDate,
    /// The entry status.
    pub status: CoreEntryStatus,
    /// The line number within the entry.
    pub line_number: i32,
    /// The line description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct LedgerRowQuery {
    entry_id: Uuid,
    entry_number: String,
    entry_date: NaiveDate,
    status: EntryStatus,
    line_number: i32,
    description: String,
    debit: Decimal,
    credit: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct AccountSums {
    account_id: Uuid,
    debit_total: Option<Decimal>,
    credit_total: Option<Decimal>,
}

/// Statuses whose lines are in force on the ledger.
fn effective_statuses() -> [EntryStatus; 2] {
    [EntryStatus::Posted, EntryStatus::Reversed]
}

/// Read-only report queries over the ledger.
#[derive(Debug, Clone)]
pub struct ReportReader {
    db: DatabaseConnection,
}

impl ReportReader {
    /// Creates a new report reader.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns balances for every account.
    ///
    /// Without `as_of` this reads the materialized snapshots; with `as_of`
    /// it re-aggregates the ledger-effective lines dated up to and
    /// including that day.
    pub async fn account_balances(
        &self,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<AccountBalanceRow>, PostingError> {
        match as_of {
            None => {
                let rows = accounts::Entity::find()
                    .find_also_related(account_balances::Entity)
                    .order_by_asc(accounts::Column::Code)
                    .all(&self.db)
                    .await?;

                Ok(rows
                    .into_iter()
                    .map(|(account, snapshot)| AccountBalanceRow {
                        account_id: account.id,
                        code: account.code,
                        name: account.name,
                        account_type: account.account_type.into(),
                        balance: snapshot.map_or(Decimal::ZERO, |s| s.current_balance),
                    })
                    .collect())
            }
            Some(date) => {
                let sums = journal_lines::Entity::find()
                    .select_only()
                    .column(journal_lines::Column::AccountId)
                    .column_as(journal_lines::Column::Debit.sum(), "debit_total")
                    .column_as(journal_lines::Column::Credit.sum(), "credit_total")
                    .join(
                        JoinType::InnerJoin,
                        journal_lines::Relation::JournalEntries.def(),
                    )
                    .filter(journal_entries::Column::Status.is_in(effective_statuses()))
                    .filter(journal_entries::Column::EntryDate.lte(date))
                    .group_by(journal_lines::Column::AccountId)
                    .into_model::<AccountSums>()
                    .all(&self.db)
                    .await?;

                let sums_by_account: std::collections::HashMap<Uuid, (Decimal, Decimal)> = sums
                    .into_iter()
                    .map(|s| {
                        (
                            s.account_id,
                            (
                                s.debit_total.unwrap_or_default(),
                                s.credit_total.unwrap_or_default(),
                            ),
                        )
                    })
                    .collect();

                let all_accounts = accounts::Entity::find()
                    .order_by_asc(accounts::Column::Code)
                    .all(&self.db)
                    .await?;

                Ok(all_accounts
                    .into_iter()
                    .map(|account| {
                        let account_type: AccountType = account.account_type.into();
                        let (debit, credit) = sums_by_account
                            .get(&account.id)
                            .copied()
                            .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                        AccountBalanceRow {
                            account_id: account.id,
                            code: account.code,
                            name: account.name,
                            account_type,
                            balance: account_type.normal_balance().balance_change(debit, credit),
                        }
                    })
                    .collect())
            }
        }
    }

    /// Returns the entries created for a source record.
    pub async fn entries_by_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
        include_drafts: bool,
    ) -> Result<Vec<EntrySummary>, PostingError> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::SourceType.eq(EntrySource::from(source_type)))
            .filter(journal_entries::Column::SourceId.eq(source_id));
        if !include_drafts {
            query = query.filter(journal_entries::Column::Status.is_in(effective_statuses()));
        }

        let entries = query
            .order_by_asc(journal_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(entries.iter().map(summary_from_model).collect())
    }

    /// Returns the ledger for one account over a date range.
    pub async fn ledger_for_account(
        &self,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        include_drafts: bool,
    ) -> Result<Vec<LedgerRow>, PostingError> {
        let mut query = journal_lines::Entity::find()
            .select_only()
            .column_as(journal_entries::Column::Id, "entry_id")
            .column_as(journal_entries::Column::EntryNumber, "entry_number")
            .column_as(journal_entries::Column::EntryDate, "entry_date")
            .column_as(journal_entries::Column::Status, "status")
            .column(journal_lines::Column::LineNumber)
            .column(journal_lines::Column::Description)
            .column(journal_lines::Column::Debit)
            .column(journal_lines::Column::Credit)
            .join(
                JoinType::InnerJoin,
                journal_lines::Relation::JournalEntries.def(),
            )
            .filter(journal_lines::Column::AccountId.eq(account_id));

        if !include_drafts {
            query = query.filter(journal_entries::Column::Status.is_in(effective_statuses()));
        }
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }

        let rows = query
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_lines::Column::LineNumber)
            .into_model::<LedgerRowQuery>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LedgerRow {
                entry_id: row.entry_id,
                entry_number: row.entry_number,
                entry_date: row.entry_date,
                status: row.status.into(),
                line_number: row.line_number,
                description: row.description,
                debit: row.debit,
                credit: row.credit,
            })
            .collect())
    }

    /// Loads one entry with its lines, regardless of status.
    pub async fn entry_with_lines(&self, id: Uuid) -> Result<EntryWithLines, PostingError> {
        super::journal::JournalRepository::new(self.db.clone())
            .get_entry(id)
            .await
    }
}
