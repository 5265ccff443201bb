//! Database layer with `SeaORM` entities, repositories, and source adapters.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Database migrations
//! - Repositories: posting engine, sequence generator, balance
//!   materializer, report reader, deferred-posting queue
//! - Source adapters translating domain events into journal entries

pub mod adapters;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, BalanceRepository, JournalRepository, PostingError, PostingQueue,
    ReportReader,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
