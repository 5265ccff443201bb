//! Accounting treatment for payments.
//!
//! A receivable payment (customer pays us) debits cash/bank and credits
//! accounts receivable; a payable payment (we pay a vendor) debits accounts
//! payable and credits cash/bank.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chart::PaymentMethod;
use crate::ledger::types::LineInput;

/// Direction of a payment relative to the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Customer settles an open receivable.
    Receivable,
    /// We settle an open payable.
    Payable,
}

/// A payment as submitted by the payments subsystem.
///
/// Serializable so it can ride the deferred-posting queue unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// The payment record ID (idempotency key together with the source type).
    pub id: Uuid,
    /// External payment reference.
    pub reference: String,
    /// Counterparty display name, used in line descriptions.
    pub contact_name: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Settlement method (must be an immediate method).
    pub method: PaymentMethod,
    /// Whether this settles a receivable or a payable.
    pub direction: PaymentDirection,
}

/// Chart accounts resolved for a payment.
#[derive(Debug, Clone)]
pub struct PaymentAccounts {
    /// Cash or bank account money moves through.
    pub settlement: Uuid,
    /// The open-balance account being settled (AR or AP by direction).
    pub counterparty: Uuid,
}

/// Builds the journal lines for a payment.
#[must_use]
pub fn build_lines(payment: &Payment, accounts: &PaymentAccounts) -> Vec<LineInput> {
    match payment.direction {
        PaymentDirection::Receivable => vec![
            LineInput::debit(
                accounts.settlement,
                format!("Payment received from {}", payment.contact_name),
                payment.amount,
            ),
            LineInput::credit(
                accounts.counterparty,
                format!("Payment against receivables - {}", payment.contact_name),
                payment.amount,
            ),
        ],
        PaymentDirection::Payable => vec![
            LineInput::debit(
                accounts.counterparty,
                format!("Payment to {}", payment.contact_name),
                payment.amount,
            ),
            LineInput::credit(
                accounts.settlement,
                format!("Payment made - {}", payment.contact_name),
                payment.amount,
            ),
        ],
    }
}
