//! Active enums backing the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification (`account_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity account.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue account.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Journal entry status (`entry_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Draft entry, not yet affecting balances.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted entry, immutable.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Posted entry negated by a reversal, terminal.
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

/// Journal entry source (`entry_source`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Manually keyed entry.
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Sales invoice.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Purchase / vendor bill.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Incoming or outgoing payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Period-closing entry.
    #[sea_orm(string_value = "closing")]
    Closing,
    /// Reversal of a posted entry.
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

/// Deferred-posting task status (`task_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting to be executed (or retried).
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Executed successfully.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Retries or deadline exhausted; parked for inspection.
    #[sea_orm(string_value = "dead")]
    Dead,
}

// Conversions between the storage enums and the core domain enums.

impl From<AccountType> for neraca_core::ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<neraca_core::ledger::AccountType> for AccountType {
    fn from(value: neraca_core::ledger::AccountType) -> Self {
        use neraca_core::ledger::AccountType as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<EntryStatus> for neraca_core::ledger::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::Posted => Self::Posted,
            EntryStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<neraca_core::ledger::EntryStatus> for EntryStatus {
    fn from(value: neraca_core::ledger::EntryStatus) -> Self {
        use neraca_core::ledger::EntryStatus as Core;
        match value {
            Core::Draft => Self::Draft,
            Core::Posted => Self::Posted,
            Core::Reversed => Self::Reversed,
        }
    }
}

impl From<EntrySource> for neraca_core::ledger::SourceType {
    fn from(value: EntrySource) -> Self {
        match value {
            EntrySource::Manual => Self::Manual,
            EntrySource::Sale => Self::Sale,
            EntrySource::Purchase => Self::Purchase,
            EntrySource::Payment => Self::Payment,
            EntrySource::Closing => Self::Closing,
            EntrySource::Reversal => Self::Reversal,
        }
    }
}

impl From<neraca_core::ledger::SourceType> for EntrySource {
    fn from(value: neraca_core::ledger::SourceType) -> Self {
        use neraca_core::ledger::SourceType as Core;
        match value {
            Core::Manual => Self::Manual,
            Core::Sale => Self::Sale,
            Core::Purchase => Self::Purchase,
            Core::Payment => Self::Payment,
            Core::Closing => Self::Closing,
            Core::Reversal => Self::Reversal,
        }
    }
}
