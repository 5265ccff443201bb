//! Accounting treatments for domain events.
//!
//! Each submodule defines a domain event (sale, purchase, payment) and a
//! pure builder that turns it into a balanced set of journal lines against
//! accounts the adapter has already resolved from the chart. The builders
//! perform no I/O; the database-layer adapters own account resolution,
//! idempotency, and submission to the posting engine.

pub mod chart;
pub mod payment;
pub mod purchase;
pub mod sale;

pub use chart::PaymentMethod;
pub use payment::{Payment, PaymentAccounts, PaymentDirection};
pub use purchase::{Purchase, PurchaseAccounts, PurchaseItem};
pub use sale::{Sale, SaleAccounts};
