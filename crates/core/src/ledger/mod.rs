//! Double-entry journal logic.
//!
//! This module implements the core ledger functionality:
//! - Domain types for journal entries and lines
//! - Business rule validation
//! - Balance calculation rules per account type
//! - Reversal entry construction
//! - Entry number formatting
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod reversal;
pub mod sequence;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod validation_props;

pub use balance::NormalBalance;
pub use error::{ErrorClass, LedgerError};
pub use reversal::{reversal_description, reversal_reference, reversing_lines};
pub use sequence::{entry_prefix, format_entry_number};
pub use types::{
    AccountInfo, AccountType, CreateEntryInput, EntryStatus, EntrySummary, EntryTotals, LineInput,
    SourceType,
};
pub use validation::{balance_epsilon, validate};
