//! Property-based tests for reversal construction.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::reversal::reversing_lines;
use super::types::LineInput;

/// Strategy for positive two-decimal amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a balanced set of lines (each amount debited and credited once).
fn balanced_lines_strategy() -> impl Strategy<Value = Vec<LineInput>> {
    prop::collection::vec(amount_strategy(), 1..8).prop_map(|amounts| {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in amounts {
            lines.push(LineInput::debit(Uuid::new_v4(), "dr", amount));
            lines.push(LineInput::credit(Uuid::new_v4(), "cr", amount));
        }
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversing swaps every line's sides while preserving account and amount.
    #[test]
    fn prop_swap_preserves_accounts_and_amounts(lines in balanced_lines_strategy()) {
        let reversed = reversing_lines(&lines);
        prop_assert_eq!(reversed.len(), lines.len());

        for (original, swapped) in lines.iter().zip(&reversed) {
            prop_assert_eq!(original.account_id, swapped.account_id);
            prop_assert_eq!(original.debit, swapped.credit);
            prop_assert_eq!(original.credit, swapped.debit);
        }
    }

    /// Reversing a balanced line set yields a balanced line set.
    #[test]
    fn prop_reversal_stays_balanced(lines in balanced_lines_strategy()) {
        let reversed = reversing_lines(&lines);
        let debit: Decimal = reversed.iter().map(|l| l.debit).sum();
        let credit: Decimal = reversed.iter().map(|l| l.credit).sum();
        prop_assert_eq!(debit, credit);
    }

    /// Reversing twice restores the original amounts on every line
    /// (descriptions accumulate prefixes; sides and amounts round-trip).
    #[test]
    fn prop_double_reversal_is_identity_on_amounts(lines in balanced_lines_strategy()) {
        let twice = reversing_lines(&reversing_lines(&lines));

        for (original, restored) in lines.iter().zip(&twice) {
            prop_assert_eq!(original.account_id, restored.account_id);
            prop_assert_eq!(original.debit, restored.debit);
            prop_assert_eq!(original.credit, restored.credit);
        }
    }
}
