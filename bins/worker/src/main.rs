//! Deferred-posting queue worker.
//!
//! Drains the posting-task queue on an interval: claims due tasks, replays
//! them through the source adapters (idempotent on the source ID), backs
//! off on failure, and dead-letters tasks whose attempts or deadline are
//! exhausted.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neraca_db::adapters::PaymentJournalAdapter;
use neraca_db::entities::posting_tasks;
use neraca_db::repositories::{PaymentTask, PostingQueue, PAYMENT_TASK_KIND};
use neraca_db::{AccountRepository, JournalRepository};
use neraca_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neraca=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = neraca_db::connect(&config.database.url).await?;
    info!("Connected to database");

    let journal = JournalRepository::new(db.clone());
    let accounts =
        AccountRepository::with_cache_ttl(db.clone(), config.ledger.account_cache_ttl_secs);
    let payments = PaymentJournalAdapter::new(journal, accounts);
    let queue = PostingQueue::new(db).with_policy(
        config.worker.max_attempts,
        config.worker.task_deadline_secs,
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(config.worker.poll_interval_secs));
    info!(
        poll_interval_secs = config.worker.poll_interval_secs,
        batch_size = config.worker.batch_size,
        "Worker started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = drain(&queue, &payments, config.worker.batch_size).await {
                    error!(%err, "queue drain failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping worker");
                break;
            }
        }
    }

    Ok(())
}

/// Claims and executes one batch of due tasks.
async fn drain(
    queue: &PostingQueue,
    payments: &PaymentJournalAdapter,
    batch_size: u64,
) -> anyhow::Result<()> {
    let tasks = queue.claim_due(batch_size).await?;
    for task in tasks {
        let task_id = task.id;

        if task.deadline_at < Utc::now() {
            queue.mark_dead(task_id, "deadline exceeded").await?;
            continue;
        }

        match execute(payments, &task).await {
            Ok(entry_number) => {
                info!(task = %task_id, %entry_number, "deferred posting completed");
                queue.mark_completed(task_id).await?;
            }
            Err(TaskFailure::Poison(reason)) => {
                warn!(task = %task_id, %reason, "poison task");
                queue.mark_dead(task_id, &reason).await?;
            }
            Err(TaskFailure::Failed(reason)) => {
                queue.mark_failed(task_id, &reason).await?;
            }
        }
    }
    Ok(())
}

/// How a task execution went wrong.
enum TaskFailure {
    /// Never executable: unknown kind or undecodable payload.
    Poison(String),
    /// Execution failed; retry with backoff.
    Failed(String),
}

async fn execute(
    payments: &PaymentJournalAdapter,
    task: &posting_tasks::Model,
) -> Result<String, TaskFailure> {
    match task.kind.as_str() {
        PAYMENT_TASK_KIND => {
            let payload: PaymentTask = serde_json::from_value(task.payload.clone())
                .map_err(|err| TaskFailure::Poison(format!("invalid payload: {err}")))?;
            payments
                .record(&payload.payment, payload.actor)
                .await
                .map(|summary| summary.entry_number)
                .map_err(|err| TaskFailure::Failed(err.to_string()))
        }
        other => Err(TaskFailure::Poison(format!("unknown task kind: {other}"))),
    }
}
