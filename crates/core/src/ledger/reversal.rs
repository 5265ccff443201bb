//! Reversal entry construction.
//!
//! A posted entry is never deleted; it is negated by a new entry with every
//! line's debit and credit swapped against the same accounts.

use super::types::LineInput;

/// Builds reversing lines by swapping debits and credits.
///
/// Account, amount, and line order are preserved; the description is
/// prefixed so the audit trail reads naturally.
#[must_use]
pub fn reversing_lines(original: &[LineInput]) -> Vec<LineInput> {
    original
        .iter()
        .map(|line| LineInput {
            account_id: line.account_id,
            description: format!("Reversing: {}", line.description),
            debit: line.credit,
            credit: line.debit,
        })
        .collect()
}

/// Builds the description for a reversal entry.
#[must_use]
pub fn reversal_description(original_number: &str, reason: &str) -> String {
    format!("Reversal of {original_number}. Reason: {reason}")
}

/// Builds the reference for a reversal entry.
#[must_use]
pub fn reversal_reference(original_reference: &str) -> String {
    format!("REV-{original_reference}")
}
