//! Property-based tests for journal entry validation.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountInfo, AccountType, CreateEntryInput, LineInput, SourceType};
use super::validation::validate;

/// Strategy for positive two-decimal amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a list of positive amounts.
fn amounts_strategy(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(amount_strategy(), 1..=max_len)
}

fn postable_account(id: Uuid) -> AccountInfo {
    AccountInfo {
        id,
        code: format!("T-{id}"),
        account_type: AccountType::Asset,
        is_active: true,
        is_postable: true,
    }
}

fn entry_input(lines: Vec<LineInput>) -> CreateEntryInput {
    CreateEntryInput {
        source_type: SourceType::Manual,
        source_id: None,
        reference: "PROP".into(),
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        description: "Property test entry".into(),
        lines,
        auto_post: false,
        created_by: Uuid::nil(),
    }
}

fn accounts_for(lines: &[LineInput]) -> HashMap<Uuid, AccountInfo> {
    lines
        .iter()
        .map(|l| (l.account_id, postable_account(l.account_id)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Mirrored debit/credit pairs always validate: for any set of positive
    /// amounts, debiting and crediting each amount once is balanced.
    #[test]
    fn prop_mirrored_lines_validate(amounts in amounts_strategy(10)) {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in &amounts {
            lines.push(LineInput::debit(Uuid::new_v4(), "dr", *amount));
            lines.push(LineInput::credit(Uuid::new_v4(), "cr", *amount));
        }
        let input = entry_input(lines);
        let accounts = accounts_for(&input.lines);

        let totals = validate(&input, &accounts).unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.total_debit, totals.total_credit);
    }

    /// Skewing one side beyond the tolerance is always rejected as unbalanced.
    #[test]
    fn prop_skewed_totals_rejected(
        amount in amount_strategy(),
        skew in 1i64..1_000_000i64,
    ) {
        let skewed = amount + Decimal::new(skew, 2);
        let lines = vec![
            LineInput::debit(Uuid::new_v4(), "dr", skewed),
            LineInput::credit(Uuid::new_v4(), "cr", amount),
        ];
        let input = entry_input(lines);
        let accounts = accounts_for(&input.lines);

        let is_unbalanced = matches!(
            validate(&input, &accounts),
            Err(LedgerError::Unbalanced { .. })
        );
        prop_assert!(is_unbalanced);
    }

    /// A negative amount on any line is rejected regardless of balance.
    #[test]
    fn prop_negative_amount_rejected(amount in amount_strategy()) {
        let lines = vec![
            LineInput::debit(Uuid::new_v4(), "dr", -amount),
            LineInput::credit(Uuid::new_v4(), "cr", -amount),
        ];
        let input = entry_input(lines);
        let accounts = accounts_for(&input.lines);

        let is_negative = matches!(
            validate(&input, &accounts),
            Err(LedgerError::NegativeAmount { line: 1 })
        );
        prop_assert!(is_negative);
    }

    /// Validation totals always equal the arithmetic sums of the lines.
    #[test]
    fn prop_totals_match_sums(amounts in amounts_strategy(8)) {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in &amounts {
            lines.push(LineInput::debit(Uuid::new_v4(), "dr", *amount));
            lines.push(LineInput::credit(Uuid::new_v4(), "cr", *amount));
        }
        let input = entry_input(lines);
        let accounts = accounts_for(&input.lines);
        let expected: Decimal = amounts.iter().copied().sum();

        let totals = validate(&input, &accounts).unwrap();
        prop_assert_eq!(totals.total_debit, expected);
        prop_assert_eq!(totals.total_credit, expected);
    }

    /// An inactive account anywhere in the line set is always rejected.
    #[test]
    fn prop_inactive_account_rejected(
        amounts in amounts_strategy(5),
        bad_index in 0usize..10,
    ) {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in &amounts {
            lines.push(LineInput::debit(Uuid::new_v4(), "dr", *amount));
            lines.push(LineInput::credit(Uuid::new_v4(), "cr", *amount));
        }
        let bad_index = bad_index % lines.len();
        let bad_account = lines[bad_index].account_id;

        let input = entry_input(lines);
        let mut accounts = accounts_for(&input.lines);
        accounts.get_mut(&bad_account).unwrap().is_active = false;

        let is_inactive = matches!(
            validate(&input, &accounts),
            Err(LedgerError::AccountInactive { .. })
        );
        prop_assert!(is_inactive);
    }
}
