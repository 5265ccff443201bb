//! Accounting treatment for sales.
//!
//! A sale debits the settlement account (cash/bank for immediate payment,
//! accounts receivable otherwise) for the gross total, credits sales revenue
//! for the net amount, and credits output VAT for the tax portion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chart::{self, PaymentMethod};
use crate::ledger::error::LedgerError;
use crate::ledger::types::LineInput;

/// A sales invoice as submitted by the sales subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// The sale record ID (idempotency key together with the source type).
    pub id: Uuid,
    /// The sale document code, e.g. `INV-202603-00017`.
    pub code: String,
    /// Customer display name, used in line descriptions.
    pub customer_name: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Tax portion of the total (zero when untaxed).
    pub tax_amount: Decimal,
    /// Gross total including tax.
    pub total_amount: Decimal,
    /// How the sale is settled.
    pub payment_method: PaymentMethod,
}

/// Chart accounts resolved for a sale.
#[derive(Debug, Clone)]
pub struct SaleAccounts {
    /// Debit target: cash/bank for immediate methods, AR for credit sales.
    pub settlement: Uuid,
    /// Sales revenue account.
    pub revenue: Uuid,
    /// Output VAT account; required when the sale carries tax.
    pub output_vat: Option<Uuid>,
}

/// Builds the journal lines for a sale.
///
/// # Errors
///
/// Returns [`LedgerError::MissingAccount`] when the sale carries tax but no
/// output VAT account was resolved.
pub fn build_lines(sale: &Sale, accounts: &SaleAccounts) -> Result<Vec<LineInput>, LedgerError> {
    let net_amount = sale.total_amount - sale.tax_amount;

    let mut lines = vec![
        LineInput::debit(
            accounts.settlement,
            format!("Sales to {}", sale.customer_name),
            sale.total_amount,
        ),
        LineInput::credit(accounts.revenue, "Sales revenue", net_amount),
    ];

    if sale.tax_amount > Decimal::ZERO {
        let output_vat = accounts.output_vat.ok_or_else(|| LedgerError::MissingAccount {
            code: chart::OUTPUT_VAT.to_string(),
            role: "output VAT".to_string(),
        })?;
        lines.push(LineInput::credit(output_vat, "Output VAT", sale.tax_amount));
    }

    Ok(lines)
}
