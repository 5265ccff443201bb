//! Account repository for chart of accounts operations.
//!
//! The chart is read-only to the ledger itself; create/update exist for the
//! seeder, administration, and tests. Lookups by code go through a short-TTL
//! `moka` cache invalidated on every write. The posting path never uses the
//! cache: the posting engine re-reads accounts inside its transaction, so an
//! account deactivated a moment ago can never receive a posting.

use std::time::Duration;

use chrono::Utc;
use moka::sync::Cache;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{account_balances, accounts};
use neraca_core::ledger::AccountType;
use rust_decimal::Decimal;

/// Default TTL for cached account lookups.
const DEFAULT_CACHE_TTL_SECS: u64 = 5;

/// Default cache capacity (number of accounts).
const DEFAULT_CACHE_CAPACITY: u64 = 1024;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account code (unique, hierarchical).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Parent account ID for hierarchical structure.
    pub parent_id: Option<Uuid>,
    /// Header accounts group children and reject direct postings.
    pub is_header: bool,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Typed, field-by-field update for an account.
///
/// Code and account type are immutable once created: ledger history and the
/// materialized balance are both derived from the type's normal balance.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub name: Option<String>,
    /// Account description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Repository for chart of accounts access.
#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    cache: Cache<String, accounts::Model>,
}

impl AccountRepository {
    /// Creates a new account repository with the default cache TTL.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_cache_ttl(db, DEFAULT_CACHE_TTL_SECS)
    }

    /// Creates a new account repository with a custom cache TTL.
    #[must_use]
    pub fn with_cache_ttl(db: DatabaseConnection, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(DEFAULT_CACHE_CAPACITY)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { db, cache }
    }

    /// Creates an account and its balance snapshot row atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken, the parent does not exist, or
    /// the database operation fails.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        if let Some(parent_id) = input.parent_id {
            accounts::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(parent_id))?;
        }

        let now = Utc::now();
        let account_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let account = accounts::ActiveModel {
            id: Set(account_id),
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            parent_id: Set(input.parent_id),
            is_header: Set(input.is_header),
            is_active: Set(input.is_active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        account_balances::ActiveModel {
            account_id: Set(account_id),
            current_balance: Set(Decimal::ZERO),
            last_updated: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.cache.invalidate(&input.code);
        Ok(account)
    }

    /// Updates an account field-by-field.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::AccountNotFound(id))?;
        let code = account.code.clone();

        let mut active: accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        self.cache.invalidate(&code);
        Ok(updated)
    }

    /// Deactivates an account so it can no longer be posted to.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the update fails.
    pub async fn deactivate(&self, id: Uuid) -> Result<accounts::Model, AccountError> {
        self.update(
            id,
            UpdateAccountInput {
                is_active: Some(false),
                ..UpdateAccountInput::default()
            },
        )
        .await
    }

    /// Finds an account by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an account by code, served from the cache when warm.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<accounts::Model>, DbErr> {
        if let Some(cached) = self.cache.get(code) {
            return Ok(Some(cached));
        }

        let account = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?;

        if let Some(model) = &account {
            self.cache.insert(code.to_string(), model.clone());
        }
        Ok(account)
    }

    /// Finds an account by code, bypassing the cache.
    pub async fn find_by_code_uncached(&self, code: &str) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
    }

    /// Lists all active accounts ordered by code.
    pub async fn list_active(&self) -> Result<Vec<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
    }
}
