//! `SeaORM` entity definitions for the ledger schema.

pub mod account_balances;
pub mod accounts;
pub mod entry_sequences;
pub mod journal_entries;
pub mod journal_lines;
pub mod posting_tasks;
pub mod sea_orm_active_enums;
