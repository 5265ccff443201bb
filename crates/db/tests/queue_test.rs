//! Integration tests for the deferred-posting queue: claim semantics,
//! retry backoff, dead-lettering, and idempotent replay.

mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use neraca_core::ledger::SourceType;
use neraca_core::sources::{Payment, PaymentDirection, PaymentMethod};
use neraca_db::adapters::PaymentJournalAdapter;
use neraca_db::entities::sea_orm_active_enums::TaskStatus;
use neraca_db::repositories::{
    AccountRepository, JournalRepository, PaymentTask, PostingQueue, ReportReader,
};

fn payment() -> Payment {
    Payment {
        id: Uuid::new_v4(),
        reference: format!("PAY-{}", Uuid::new_v4().simple()),
        contact_name: "PT Maju Jaya".into(),
        date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        amount: dec!(320),
        method: PaymentMethod::Bank,
        direction: PaymentDirection::Receivable,
    }
}

#[tokio::test]
async fn test_enqueue_then_claim() {
    let _guard = common::QUEUE_LOCK.lock().await;
    let db = common::connect().await;
    let queue = PostingQueue::new(db);

    let payment = payment();
    let actor = Uuid::new_v4();
    let task_id = queue.enqueue_payment(&payment, actor).await.unwrap();

    let claimed = queue.claim_due(100).await.unwrap();
    let task = claimed
        .iter()
        .find(|t| t.id == task_id)
        .expect("enqueued task should be due");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.attempts, 0);

    let decoded: PaymentTask = serde_json::from_value(task.payload.clone()).unwrap();
    assert_eq!(decoded.payment.id, payment.id);
    assert_eq!(decoded.actor, actor);

    // The claim lease hides the task from a second claim.
    let reclaimed = queue.claim_due(100).await.unwrap();
    assert!(reclaimed.iter().all(|t| t.id != task_id));

    queue.mark_completed(task_id).await.unwrap();
}

#[tokio::test]
async fn test_failures_back_off_then_dead_letter() {
    let db = common::connect().await;
    let queue = PostingQueue::new(db).with_policy(2, 3600);

    let task_id = queue
        .enqueue_payment(&payment(), Uuid::new_v4())
        .await
        .unwrap();

    queue.mark_failed(task_id, "database unavailable").await.unwrap();
    let dead = queue.dead_letters().await.unwrap();
    assert!(dead.iter().all(|t| t.id != task_id), "one failure is retried");

    queue.mark_failed(task_id, "database unavailable").await.unwrap();
    let dead = queue.dead_letters().await.unwrap();
    let parked = dead
        .iter()
        .find(|t| t.id == task_id)
        .expect("attempt budget exhausted");
    assert_eq!(parked.attempts, 2);
    assert_eq!(
        parked.last_error.as_deref(),
        Some("database unavailable")
    );
}

#[tokio::test]
async fn test_requeue_resets_dead_letter() {
    let _guard = common::QUEUE_LOCK.lock().await;
    let db = common::connect().await;
    let queue = PostingQueue::new(db);

    let task_id = queue
        .enqueue_payment(&payment(), Uuid::new_v4())
        .await
        .unwrap();
    queue.mark_dead(task_id, "deadline exceeded").await.unwrap();

    queue.requeue(task_id).await.unwrap();

    let claimed = queue.claim_due(100).await.unwrap();
    let task = claimed
        .iter()
        .find(|t| t.id == task_id)
        .expect("requeued task should be claimable");
    assert_eq!(task.attempts, 0);
    queue.mark_completed(task_id).await.unwrap();
}

// ============================================================================
// At-least-once replay reconciled by the idempotency check
// ============================================================================
#[tokio::test]
async fn test_replayed_task_posts_once() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let reports = ReportReader::new(db.clone());
    let adapter = PaymentJournalAdapter::new(journal, accounts);
    let queue = PostingQueue::new(db);

    let payment = payment();
    let actor = Uuid::new_v4();
    let task_id = queue.enqueue_payment(&payment, actor).await.unwrap();

    // The worker delivers the task twice (at-least-once).
    let first = adapter.record(&payment, actor).await.unwrap();
    let second = adapter.record(&payment, actor).await.unwrap();
    assert_eq!(first.id, second.id);

    let entries = reports
        .entries_by_source(SourceType::Payment, payment.id, true)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1, "replays must not double-post");

    queue.mark_completed(task_id).await.unwrap();
}
