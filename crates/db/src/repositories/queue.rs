//! Deferred-posting task queue.
//!
//! "Record the payment now, post the journal later" runs the payment and
//! the journal entry in separate transactions, so the journal side gets
//! at-least-once delivery: tasks are claimed with `FOR UPDATE SKIP LOCKED`,
//! retried with exponential backoff, and parked in a dead-letter state when
//! attempts or the deadline run out. Replayed deliveries are reconciled by
//! the posting engine's `(source_type, source_id)` idempotency check.

use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{posting_tasks, sea_orm_active_enums::TaskStatus};
use neraca_core::sources::Payment;

/// Task kind for deferred payment journals.
pub const PAYMENT_TASK_KIND: &str = "payment_journal";

/// Base delay for the retry backoff.
const BACKOFF_BASE_SECS: i64 = 2;

/// Cap for the retry backoff.
const BACKOFF_MAX_SECS: i64 = 300;

/// Lease applied to claimed tasks so a crashed worker's claims resurface.
const CLAIM_LEASE_SECS: i64 = 60;

/// Default attempts before dead-lettering.
const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// Default task deadline.
const DEFAULT_DEADLINE_SECS: i64 = 3600;

/// Payload for a deferred payment journal task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTask {
    /// The payment to post.
    pub payment: Payment,
    /// The user the resulting entry is attributed to.
    pub actor: Uuid,
}

/// Error types for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Task not found.
    #[error("Posting task not found: {0}")]
    TaskNotFound(Uuid),

    /// Payload could not be (de)serialized.
    #[error("Invalid task payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Exponential backoff delay after a failed attempt (1-indexed).
#[must_use]
pub fn backoff_delay(attempt: i32) -> Duration {
    let exponent = attempt.saturating_sub(1).clamp(0, 30);
    let secs = BACKOFF_BASE_SECS
        .saturating_mul(1_i64 << exponent)
        .min(BACKOFF_MAX_SECS);
    Duration::seconds(secs)
}

/// Persistent queue of deferred posting tasks.
#[derive(Debug, Clone)]
pub struct PostingQueue {
    db: DatabaseConnection,
    max_attempts: i32,
    task_deadline: Duration,
}

impl PostingQueue {
    /// Creates a queue with default policy (5 attempts, 1 hour deadline).
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            task_deadline: Duration::seconds(DEFAULT_DEADLINE_SECS),
        }
    }

    /// Overrides the retry/deadline policy.
    #[must_use]
    pub fn with_policy(mut self, max_attempts: i32, task_deadline_secs: i64) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.task_deadline = Duration::seconds(task_deadline_secs.max(1));
        self
    }

    /// Enqueues a deferred payment journal task.
    ///
    /// The task carries a bounded deadline; once it passes, the task is
    /// dead-lettered instead of retried.
    pub async fn enqueue_payment(
        &self,
        payment: &Payment,
        actor: Uuid,
    ) -> Result<Uuid, QueueError> {
        let payload = serde_json::to_value(PaymentTask {
            payment: payment.clone(),
            actor,
        })?;

        let now = Utc::now();
        let task_id = Uuid::new_v4();
        posting_tasks::ActiveModel {
            id: Set(task_id),
            kind: Set(PAYMENT_TASK_KIND.to_string()),
            payload: Set(payload),
            status: Set(TaskStatus::Pending),
            attempts: Set(0),
            max_attempts: Set(self.max_attempts),
            next_attempt_at: Set(now.into()),
            deadline_at: Set((now + self.task_deadline).into()),
            last_error: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(%task_id, payment = %payment.id, "deferred posting task enqueued");
        Ok(task_id)
    }

    /// Claims up to `limit` due tasks.
    ///
    /// Claimed rows are locked `FOR UPDATE SKIP LOCKED` and their
    /// `next_attempt_at` is pushed forward by a lease, so concurrent
    /// workers never double-claim and a crashed worker's tasks resurface.
    pub async fn claim_due(&self, limit: u64) -> Result<Vec<posting_tasks::Model>, QueueError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let due = posting_tasks::Entity::find()
            .filter(posting_tasks::Column::Status.eq(TaskStatus::Pending))
            .filter(posting_tasks::Column::NextAttemptAt.lte(now))
            .order_by_asc(posting_tasks::Column::NextAttemptAt)
            .limit(limit)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(&txn)
            .await?;

        let lease: DateTime<Utc> = now + Duration::seconds(CLAIM_LEASE_SECS);
        for task in &due {
            let mut active: posting_tasks::ActiveModel = task.clone().into();
            active.next_attempt_at = Set(lease.into());
            active.updated_at = Set(now.into());
            active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(due)
    }

    /// Marks a task as successfully executed.
    pub async fn mark_completed(&self, id: Uuid) -> Result<(), QueueError> {
        let task = self.load(id).await?;
        let mut active: posting_tasks::ActiveModel = task.into();
        active.status = Set(TaskStatus::Completed);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Records a failed attempt: backs off, or dead-letters when the
    /// attempt budget is exhausted.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), QueueError> {
        let task = self.load(id).await?;
        let now = Utc::now();
        let attempts = task.attempts + 1;
        let exhausted = attempts >= task.max_attempts;

        let max_attempts = task.max_attempts;
        let mut active: posting_tasks::ActiveModel = task.into();
        active.attempts = Set(attempts);
        active.last_error = Set(Some(error.to_string()));
        active.updated_at = Set(now.into());
        if exhausted {
            active.status = Set(TaskStatus::Dead);
            tracing::error!(task = %id, attempts, "posting task dead-lettered");
        } else {
            active.next_attempt_at = Set((now + backoff_delay(attempts)).into());
            tracing::warn!(
                task = %id,
                attempts,
                max_attempts,
                %error,
                "posting task failed, will retry"
            );
        }
        active.update(&self.db).await?;
        Ok(())
    }

    /// Dead-letters a task outright (deadline exceeded, poison payload).
    pub async fn mark_dead(&self, id: Uuid, reason: &str) -> Result<(), QueueError> {
        let task = self.load(id).await?;
        let mut active: posting_tasks::ActiveModel = task.into();
        active.status = Set(TaskStatus::Dead);
        active.last_error = Set(Some(reason.to_string()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;
        tracing::error!(task = %id, %reason, "posting task dead-lettered");
        Ok(())
    }

    /// Lists dead-lettered tasks for inspection.
    pub async fn dead_letters(&self) -> Result<Vec<posting_tasks::Model>, QueueError> {
        Ok(posting_tasks::Entity::find()
            .filter(posting_tasks::Column::Status.eq(TaskStatus::Dead))
            .order_by_asc(posting_tasks::Column::UpdatedAt)
            .all(&self.db)
            .await?)
    }

    /// Redrives a dead-lettered task with a fresh attempt budget and
    /// deadline.
    pub async fn requeue(&self, id: Uuid) -> Result<(), QueueError> {
        let task = self.load(id).await?;
        let now = Utc::now();
        let mut active: posting_tasks::ActiveModel = task.into();
        active.status = Set(TaskStatus::Pending);
        active.attempts = Set(0);
        active.next_attempt_at = Set(now.into());
        active.deadline_at = Set((now + self.task_deadline).into());
        active.updated_at = Set(now.into());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<posting_tasks::Model, QueueError> {
        posting_tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(QueueError::TaskNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exponential() {
        assert_eq!(backoff_delay(1), Duration::seconds(2));
        assert_eq!(backoff_delay(2), Duration::seconds(4));
        assert_eq!(backoff_delay(3), Duration::seconds(8));
        assert_eq!(backoff_delay(4), Duration::seconds(16));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff_delay(10), Duration::seconds(300));
        assert_eq!(backoff_delay(40), Duration::seconds(300));
    }

    #[test]
    fn test_backoff_handles_zero_attempt() {
        assert_eq!(backoff_delay(0), Duration::seconds(2));
    }
}
