//! Ledger domain types for journal entry creation and validation.
//!
//! This module defines the core types used for creating and validating
//! journal entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::balance_epsilon;

/// Originating subsystem of a journal entry.
///
/// Entries created by adapters carry the source record's ID so the ledger
/// remains traceable back to the business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Manually keyed journal entry.
    Manual,
    /// Sales invoice.
    Sale,
    /// Purchase / vendor bill.
    Purchase,
    /// Incoming or outgoing payment.
    Payment,
    /// Period-closing entry.
    Closing,
    /// Reversal of a previously posted entry.
    Reversal,
}

/// Journal entry status.
///
/// Entries progress draft -> posted -> reversed; posted and reversed
/// entries are immutable and are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can still be modified.
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry has been negated by a reversal entry (terminal).
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }
}

/// Account classification in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed (payables, tax liabilities).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

/// Information about an account needed for validation.
///
/// The posting path loads these inside the posting transaction so activity
/// checks are never served from a stale cache.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// The account code (unique, hierarchical).
    pub code: String,
    /// The account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account accepts direct postings (header accounts do not).
    pub is_postable: bool,
}

/// Input for a single journal line.
///
/// Exactly one of `debit` / `credit` must be non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Line description.
    pub description: String,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
}

impl LineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: Uuid, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_id,
            description: description.into(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: Uuid, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_id,
            description: description.into(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryInput {
    /// The originating subsystem.
    pub source_type: SourceType,
    /// Back-reference to the originating record, if any.
    pub source_id: Option<Uuid>,
    /// External reference (invoice number, payment reference, ...).
    pub reference: String,
    /// The entry date.
    pub entry_date: NaiveDate,
    /// A description of the entry.
    pub description: String,
    /// The journal lines (must have at least 2).
    pub lines: Vec<LineInput>,
    /// Post immediately instead of leaving the entry in draft.
    pub auto_post: bool,
    /// The user creating the entry.
    pub created_by: Uuid,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Serialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Whether debits equal credits within tolerance.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: (total_debit - total_credit).abs() <= balance_epsilon(),
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// Result of creating, posting, or reversing a journal entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// The entry ID.
    pub id: Uuid,
    /// The allocated entry number (stable external reference).
    pub entry_number: String,
    /// The entry status.
    pub status: EntryStatus,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Whether the entry is balanced.
    pub is_balanced: bool,
}
