//! Ledger error types for validation, state, concurrency, and integrity
//! failures.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::SourceType;

/// Broad error classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected before any write; fully caller-recoverable.
    Validation,
    /// Illegal state transition; non-retryable business error.
    State,
    /// Transient contention; retry with backoff.
    Concurrency,
    /// Required configuration or uniqueness violated; fatal for the call.
    Integrity,
    /// Underlying storage failure.
    Storage,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Line amount cannot be negative.
    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Line must carry a debit or a credit.
    #[error("Line {line}: either debit or credit must be non-zero")]
    EmptyLine {
        /// 1-based line number.
        line: usize,
    },

    /// Line cannot carry both a debit and a credit.
    #[error("Line {line}: cannot have both debit and credit amounts")]
    BothDebitAndCredit {
        /// 1-based line number.
        line: usize,
    },

    /// Entry is not balanced (debits != credits beyond tolerance).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive and cannot be posted to.
    #[error("Account {code} is inactive")]
    AccountInactive {
        /// The account code.
        code: String,
    },

    /// Header accounts do not accept direct postings.
    #[error("Account {code} does not allow direct posting")]
    AccountNotPostable {
        /// The account code.
        code: String,
    },

    // ========== State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Entry has already been posted.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(Uuid),

    /// Entry has already been reversed.
    #[error("Journal entry {0} is already reversed")]
    AlreadyReversed(Uuid),

    /// Only posted entries can be reversed.
    #[error("Journal entry {0} is not posted")]
    NotPosted(Uuid),

    // ========== Concurrency Errors ==========
    /// Entry number allocation lost a lock race; retry with backoff.
    #[error("Entry number sequence for prefix {prefix} is contended, please retry")]
    SequenceContention {
        /// The sequence prefix.
        prefix: String,
    },

    /// Balance row contention; retry with backoff.
    #[error("Balance update for account {account_id} is contended, please retry")]
    BalanceContention {
        /// The account ID.
        account_id: Uuid,
    },

    // ========== Integrity Errors ==========
    /// A chart-of-accounts entry the adapter depends on is missing.
    #[error("Required account {code} ({role}) is missing from the chart of accounts")]
    MissingAccount {
        /// The expected account code.
        code: String,
        /// The role the account plays in the adapter's treatment.
        role: String,
    },

    /// An entry for this source already exists.
    #[error("A journal entry for source {source_type:?}/{source_id} already exists")]
    DuplicateSource {
        /// The source type.
        source_type: SourceType,
        /// The source record ID.
        source_id: Uuid,
    },

    // ========== Storage Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the broad error classification.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InsufficientLines
            | Self::NegativeAmount { .. }
            | Self::EmptyLine { .. }
            | Self::BothDebitAndCredit { .. }
            | Self::Unbalanced { .. }
            | Self::AccountNotFound(_)
            | Self::AccountInactive { .. }
            | Self::AccountNotPostable { .. } => ErrorClass::Validation,

            Self::EntryNotFound(_)
            | Self::AlreadyPosted(_)
            | Self::AlreadyReversed(_)
            | Self::NotPosted(_) => ErrorClass::State,

            Self::SequenceContention { .. } | Self::BalanceContention { .. } => {
                ErrorClass::Concurrency
            }

            Self::MissingAccount { .. } | Self::DuplicateSource { .. } => ErrorClass::Integrity,

            Self::Database(_) => ErrorClass::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::EmptyLine { .. } => "EMPTY_LINE",
            Self::BothDebitAndCredit { .. } => "BOTH_DEBIT_AND_CREDIT",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::AccountNotPostable { .. } => "ACCOUNT_NOT_POSTABLE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::SequenceContention { .. } => "SEQUENCE_CONTENTION",
            Self::BalanceContention { .. } => "BALANCE_CONTENTION",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::DuplicateSource { .. } => "DUPLICATE_SOURCE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if this error is transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Concurrency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_class() {
        assert_eq!(LedgerError::InsufficientLines.class(), ErrorClass::Validation);
        assert_eq!(
            LedgerError::Unbalanced {
                debit: dec!(100),
                credit: dec!(50),
            }
            .class(),
            ErrorClass::Validation
        );
        assert_eq!(
            LedgerError::AccountInactive {
                code: "1101".into()
            }
            .class(),
            ErrorClass::Validation
        );
    }

    #[test]
    fn test_state_class() {
        let id = Uuid::nil();
        assert_eq!(LedgerError::AlreadyPosted(id).class(), ErrorClass::State);
        assert_eq!(LedgerError::AlreadyReversed(id).class(), ErrorClass::State);
        assert_eq!(LedgerError::NotPosted(id).class(), ErrorClass::State);
    }

    #[test]
    fn test_only_concurrency_is_retryable() {
        assert!(
            LedgerError::SequenceContention {
                prefix: "JE".into()
            }
            .is_retryable()
        );
        assert!(
            LedgerError::BalanceContention {
                account_id: Uuid::nil()
            }
            .is_retryable()
        );
        assert!(!LedgerError::InsufficientLines.is_retryable());
        assert!(!LedgerError::AlreadyPosted(Uuid::nil()).is_retryable());
        assert!(
            !LedgerError::MissingAccount {
                code: "2101".into(),
                role: "accounts payable".into(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: dec!(1000.00),
            credit: dec!(999.50),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 1000.00, Credit: 999.50"
        );

        let err = LedgerError::MissingAccount {
            code: "4101".into(),
            role: "sales revenue".into(),
        };
        assert_eq!(
            err.to_string(),
            "Required account 4101 (sales revenue) is missing from the chart of accounts"
        );
    }
}
