//! Accounting treatment for purchases.
//!
//! A purchase debits inventory (or the item's explicit expense account) per
//! item and input VAT for the tax portion; the credit side goes to cash/bank
//! for immediately paid purchases, otherwise to accounts payable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chart::{self, PaymentMethod};
use crate::ledger::error::LedgerError;
use crate::ledger::types::LineInput;

/// A single purchased item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    /// Item description, used in the line description.
    pub description: String,
    /// Item total (excluding tax).
    pub total: Decimal,
    /// Explicit expense account; defaults to inventory when absent.
    pub expense_account: Option<Uuid>,
}

/// A purchase / vendor bill as submitted by the purchasing subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// The purchase record ID (idempotency key together with the source type).
    pub id: Uuid,
    /// The purchase document code.
    pub code: String,
    /// Vendor display name, used in line descriptions.
    pub vendor_name: String,
    /// Bill date.
    pub date: NaiveDate,
    /// Purchased items.
    pub items: Vec<PurchaseItem>,
    /// Tax portion of the total (zero when untaxed).
    pub tax_amount: Decimal,
    /// Gross total including tax.
    pub total_amount: Decimal,
    /// How the purchase is settled.
    pub payment_method: PaymentMethod,
}

/// Chart accounts resolved for a purchase.
#[derive(Debug, Clone)]
pub struct PurchaseAccounts {
    /// Default debit target for items without an explicit expense account.
    pub inventory: Uuid,
    /// Input VAT account; required when the purchase carries tax.
    pub input_vat: Option<Uuid>,
    /// Trade payables account (credit side for on-account purchases).
    pub payable: Uuid,
    /// Settlement account; required for immediately paid purchases.
    pub settlement: Option<Uuid>,
}

/// Builds the journal lines for a purchase.
///
/// # Errors
///
/// Returns [`LedgerError::MissingAccount`] when the purchase carries tax but
/// no input VAT account was resolved, or is paid immediately but no
/// settlement account was resolved.
pub fn build_lines(
    purchase: &Purchase,
    accounts: &PurchaseAccounts,
) -> Result<Vec<LineInput>, LedgerError> {
    let mut lines = Vec::with_capacity(purchase.items.len() + 2);

    for item in &purchase.items {
        let debit_account = item.expense_account.unwrap_or(accounts.inventory);
        lines.push(LineInput::debit(
            debit_account,
            format!("Purchase - {}", item.description),
            item.total,
        ));
    }

    if purchase.tax_amount > Decimal::ZERO {
        let input_vat = accounts.input_vat.ok_or_else(|| LedgerError::MissingAccount {
            code: chart::INPUT_VAT.to_string(),
            role: "input VAT".to_string(),
        })?;
        lines.push(LineInput::debit(input_vat, "Input VAT", purchase.tax_amount));
    }

    if purchase.payment_method.is_immediate() {
        let settlement = accounts.settlement.ok_or_else(|| LedgerError::MissingAccount {
            code: purchase
                .payment_method
                .settlement_account_code()
                .unwrap_or(chart::CASH)
                .to_string(),
            role: "settlement".to_string(),
        })?;
        lines.push(LineInput::credit(
            settlement,
            format!("Payment - {}", purchase.vendor_name),
            purchase.total_amount,
        ));
    } else {
        lines.push(LineInput::credit(
            accounts.payable,
            format!("Accounts payable - {}", purchase.vendor_name),
            purchase.total_amount,
        ));
    }

    Ok(lines)
}
