//! Shared configuration for the Neraca ledger engine.

pub mod config;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig, WorkerConfig};
