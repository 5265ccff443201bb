//! Business rule validation for journal entries.
//!
//! Pure functions with no side effects: account facts are passed in by the
//! caller (the posting engine loads them inside the posting transaction).

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountInfo, CreateEntryInput, EntryTotals};

/// Tolerance for the balanced-entry check.
///
/// Half a cent at two-decimal money; anything beyond is a rejected entry,
/// anything within is rounding noise.
#[must_use]
pub fn balance_epsilon() -> Decimal {
    Decimal::new(5, 3) // 0.005
}

/// Validates a journal entry request against the chart of accounts.
///
/// Checks, in order:
/// 1. At least 2 lines
/// 2. Per line: non-negative amounts, exactly one of debit/credit non-zero
/// 3. Per line: account exists, is active, and accepts direct postings
/// 4. Total debits equal total credits within [`balance_epsilon`]
///
/// # Errors
///
/// Returns the first [`LedgerError`] encountered; nothing is written.
pub fn validate(
    input: &CreateEntryInput,
    accounts: &HashMap<Uuid, AccountInfo>,
) -> Result<EntryTotals, LedgerError> {
    if input.lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (index, line) in input.lines.iter().enumerate() {
        let line_number = index + 1;

        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: line_number });
        }

        let debit_zero = line.debit.is_zero();
        let credit_zero = line.credit.is_zero();
        if debit_zero && credit_zero {
            return Err(LedgerError::EmptyLine { line: line_number });
        }
        if !debit_zero && !credit_zero {
            return Err(LedgerError::BothDebitAndCredit { line: line_number });
        }

        let account = accounts
            .get(&line.account_id)
            .ok_or(LedgerError::AccountNotFound(line.account_id))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive {
                code: account.code.clone(),
            });
        }
        if !account.is_postable {
            return Err(LedgerError::AccountNotPostable {
                code: account.code.clone(),
            });
        }

        total_debit += line.debit;
        total_credit += line.credit;
    }

    let totals = EntryTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(LedgerError::Unbalanced {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(totals)
}
