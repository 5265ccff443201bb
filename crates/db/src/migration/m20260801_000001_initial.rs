//! Initial database migration.
//!
//! Creates the ledger enums, tables, constraints, and indexes, and seeds
//! the entry-number sequences for the known prefixes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: ENTRY NUMBER SEQUENCES
        // ============================================================
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 5: DEFERRED-POSTING QUEUE
        // ============================================================
        db.execute_unprepared(POSTING_TASKS_SQL).await?;

        // ============================================================
        // PART 6: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_SEQUENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Journal entry status
CREATE TYPE entry_status AS ENUM (
    'draft',
    'posted',
    'reversed'
);

-- Journal entry source
CREATE TYPE entry_source AS ENUM (
    'manual',
    'sale',
    'purchase',
    'payment',
    'closing',
    'reversal'
);

-- Deferred-posting task status
CREATE TYPE task_status AS ENUM (
    'pending',
    'completed',
    'dead'
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    account_type account_type NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    is_header BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
CREATE INDEX idx_accounts_active ON accounts(code) WHERE is_active = true;
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    account_id UUID PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_number VARCHAR(20) NOT NULL UNIQUE,
    source_type entry_source NOT NULL,
    source_id UUID,
    reference VARCHAR(100) NOT NULL DEFAULT '',
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    status entry_status NOT NULL DEFAULT 'draft',
    total_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_at TIMESTAMPTZ,
    reversal_of UUID REFERENCES journal_entries(id),

    CONSTRAINT chk_totals_non_negative CHECK (total_debit >= 0 AND total_credit >= 0)
);

-- One journal entry per originating record; retried domain operations
-- must not double-post.
CREATE UNIQUE INDEX idx_journal_entries_source
    ON journal_entries(source_type, source_id)
    WHERE source_id IS NOT NULL;

CREATE INDEX idx_journal_entries_date ON journal_entries(entry_date);
CREATE INDEX idx_journal_entries_status ON journal_entries(status);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    description TEXT NOT NULL DEFAULT '',
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_line_number CHECK (line_number > 0),
    CONSTRAINT chk_amounts_non_negative CHECK (debit >= 0 AND credit >= 0),
    -- Canonical double-entry discipline: exactly one side per line.
    CONSTRAINT chk_single_side CHECK ((debit = 0) <> (credit = 0)),
    UNIQUE (journal_entry_id, line_number)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    prefix VARCHAR(10) PRIMARY KEY,
    next_number BIGINT NOT NULL DEFAULT 1,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_next_number_positive CHECK (next_number > 0)
);
";

const POSTING_TASKS_SQL: &str = r"
CREATE TABLE posting_tasks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind VARCHAR(50) NOT NULL,
    payload JSONB NOT NULL,
    status task_status NOT NULL DEFAULT 'pending',
    attempts INTEGER NOT NULL DEFAULT 0,
    max_attempts INTEGER NOT NULL DEFAULT 5,
    next_attempt_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deadline_at TIMESTAMPTZ NOT NULL,
    last_error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_posting_tasks_due
    ON posting_tasks(next_attempt_at)
    WHERE status = 'pending';
";

const SEED_SEQUENCES_SQL: &str = r"
INSERT INTO entry_sequences (prefix) VALUES
    ('JE'),
    ('SAL'),
    ('PUR'),
    ('PAY'),
    ('CLS'),
    ('REV')
ON CONFLICT (prefix) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS posting_tasks;
DROP TABLE IF EXISTS entry_sequences;
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS account_balances;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS task_status;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS account_type;
";
