//! Account balance rules.
//!
//! In double-entry bookkeeping every account has a normal balance side:
//! asset and expense accounts grow with debits, liability, equity, and
//! revenue accounts grow with credits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::AccountType;

/// The side on which an account's balance normally sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (asset, expense).
    Debit,
    /// Credit-normal accounts (liability, equity, revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change a line produces on an account.
    ///
    /// Debit-normal: `balance += debit - credit`.
    /// Credit-normal: `balance += credit - debit`.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    #[must_use]
    pub fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}
