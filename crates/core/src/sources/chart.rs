//! Fixed chart-of-accounts codes the source adapters depend on.
//!
//! Adapters resolve these codes at submission time and fail fast with an
//! integrity error when one is missing; they are seeded by the seeder bin.

use serde::{Deserialize, Serialize};

/// Cash on hand.
pub const CASH: &str = "1101";
/// Primary bank account.
pub const BANK: &str = "1102";
/// Trade receivables.
pub const ACCOUNTS_RECEIVABLE: &str = "1201";
/// Input VAT (recoverable tax on purchases).
pub const INPUT_VAT: &str = "1240";
/// Merchandise inventory.
pub const INVENTORY: &str = "1301";
/// Trade payables.
pub const ACCOUNTS_PAYABLE: &str = "2101";
/// Output VAT (tax collected on sales).
pub const OUTPUT_VAT: &str = "2103";
/// Sales revenue.
pub const SALES_REVENUE: &str = "4101";

/// How a sale or purchase is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Settled immediately from cash on hand.
    Cash,
    /// Settled immediately from the bank account.
    Bank,
    /// Settled immediately by bank transfer.
    Transfer,
    /// On account; settled later by a payment.
    Credit,
}

impl PaymentMethod {
    /// Returns true if money moves at document time (no open balance).
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        !matches!(self, Self::Credit)
    }

    /// Returns the settlement account code for immediate methods.
    #[must_use]
    pub fn settlement_account_code(&self) -> Option<&'static str> {
        match self {
            Self::Cash => Some(CASH),
            Self::Bank | Self::Transfer => Some(BANK),
            Self::Credit => None,
        }
    }
}
