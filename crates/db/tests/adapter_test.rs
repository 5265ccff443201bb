//! Integration tests for the source adapters: accounting treatments,
//! idempotency (scenario D), and missing-account integrity failures.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;
use uuid::Uuid;

use neraca_core::ledger::{EntryStatus, LedgerError, SourceType};
use neraca_core::sources::{
    Payment, PaymentDirection, PaymentMethod, Purchase, PurchaseItem, Sale,
};
use neraca_db::adapters::{PaymentJournalAdapter, PurchaseJournalAdapter, SaleJournalAdapter};
use neraca_db::repositories::{
    AccountRepository, JournalRepository, PostingError, ReportReader,
};

fn sale(total: rust_decimal::Decimal, tax: rust_decimal::Decimal, method: PaymentMethod) -> Sale {
    Sale {
        id: Uuid::new_v4(),
        code: format!("INV-{}", Uuid::new_v4().simple()),
        customer_name: "PT Maju Jaya".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        tax_amount: tax,
        total_amount: total,
        payment_method: method,
    }
}

fn payment(direction: PaymentDirection) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        reference: format!("PAY-{}", Uuid::new_v4().simple()),
        contact_name: "CV Sumber Rejeki".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
        amount: dec!(750),
        method: PaymentMethod::Transfer,
        direction,
    }
}

// ============================================================================
// Sale treatment: gross settlement debit, net revenue, output VAT
// ============================================================================
#[tokio::test]
async fn test_taxed_credit_sale_entry() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let adapter = SaleJournalAdapter::new(journal.clone(), accounts.clone());

    let sale = sale(dec!(1110), dec!(110), PaymentMethod::Credit);
    let summary = adapter.record(&sale, Uuid::new_v4()).await.unwrap();

    assert_eq!(summary.status, EntryStatus::Posted);
    assert!(summary.entry_number.starts_with("SAL-"));
    assert_eq!(summary.total_debit, dec!(1110));
    assert_eq!(summary.total_credit, dec!(1110));

    let stored = journal.get_entry(summary.id).await.unwrap();
    assert_eq!(stored.lines.len(), 3);

    let receivable = accounts.find_by_code("1201").await.unwrap().unwrap();
    let revenue = accounts.find_by_code("4101").await.unwrap().unwrap();
    let output_vat = accounts.find_by_code("2103").await.unwrap().unwrap();

    assert_eq!(stored.lines[0].account_id, receivable.id);
    assert_eq!(stored.lines[0].debit, dec!(1110));
    assert_eq!(stored.lines[1].account_id, revenue.id);
    assert_eq!(stored.lines[1].credit, dec!(1000));
    assert_eq!(stored.lines[2].account_id, output_vat.id);
    assert_eq!(stored.lines[2].credit, dec!(110));
}

// ============================================================================
// Purchase treatment: per-item debits, input VAT, payable vs settlement
// ============================================================================
#[tokio::test]
async fn test_credit_purchase_entry() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let adapter = PurchaseJournalAdapter::new(journal.clone(), accounts.clone());

    let purchase = Purchase {
        id: Uuid::new_v4(),
        code: format!("PO-{}", Uuid::new_v4().simple()),
        vendor_name: "CV Sumber Rejeki".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
        items: vec![
            PurchaseItem {
                description: "Thermal paper".into(),
                total: dec!(600),
                expense_account: None,
            },
            PurchaseItem {
                description: "Label rolls".into(),
                total: dec!(200),
                expense_account: None,
            },
        ],
        tax_amount: dec!(88),
        total_amount: dec!(888),
        payment_method: PaymentMethod::Credit,
    };

    let summary = adapter.record(&purchase, Uuid::new_v4()).await.unwrap();
    assert!(summary.entry_number.starts_with("PUR-"));
    assert_eq!(summary.total_debit, dec!(888));

    let stored = journal.get_entry(summary.id).await.unwrap();
    assert_eq!(stored.lines.len(), 4);

    let payable = accounts.find_by_code("2101").await.unwrap().unwrap();
    let credit_line = stored.lines.last().unwrap();
    assert_eq!(credit_line.account_id, payable.id);
    assert_eq!(credit_line.credit, dec!(888));
}

// ============================================================================
// Payment treatment: direction picks the debit/credit sides
// ============================================================================
#[tokio::test]
async fn test_receivable_payment_entry() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let adapter = PaymentJournalAdapter::new(journal.clone(), accounts.clone());

    let payment = payment(PaymentDirection::Receivable);
    let summary = adapter.record(&payment, Uuid::new_v4()).await.unwrap();
    assert!(summary.entry_number.starts_with("PAY-"));

    let stored = journal.get_entry(summary.id).await.unwrap();
    let bank = accounts.find_by_code("1102").await.unwrap().unwrap();
    let receivable = accounts.find_by_code("1201").await.unwrap().unwrap();

    assert_eq!(stored.lines[0].account_id, bank.id);
    assert_eq!(stored.lines[0].debit, dec!(750));
    assert_eq!(stored.lines[1].account_id, receivable.id);
    assert_eq!(stored.lines[1].credit, dec!(750));
}

// ============================================================================
// Idempotency: a retried submission returns the first entry
// ============================================================================
#[tokio::test]
async fn test_retried_sale_does_not_double_post() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let reports = ReportReader::new(db.clone());
    let adapter = SaleJournalAdapter::new(journal, accounts);

    let sale = sale(dec!(500), dec!(0), PaymentMethod::Cash);
    let actor = Uuid::new_v4();

    let first = adapter.record(&sale, actor).await.unwrap();
    let second = adapter.record(&sale, actor).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.entry_number, second.entry_number);

    let entries = reports
        .entries_by_source(SourceType::Sale, sale.id, true)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1, "exactly one entry per sale");
}

// ============================================================================
// Scenario D: two concurrent submissions for the same payment
// ============================================================================
#[tokio::test]
async fn test_concurrent_payment_submissions_post_once() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let reports = ReportReader::new(db.clone());
    let adapter = PaymentJournalAdapter::new(journal, accounts);

    let payment = payment(PaymentDirection::Receivable);
    let barrier = Arc::new(Barrier::new(2));

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let adapter = adapter.clone();
            let payment = payment.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                adapter.record(&payment, Uuid::new_v4()).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("both submissions resolve"))
        .collect();

    // Both callers observe the same single entry.
    assert_eq!(results[0].id, results[1].id);

    let entries = reports
        .entries_by_source(SourceType::Payment, payment.id, true)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1, "exactly one entry per payment");
}

// ============================================================================
// A failed adapter call must not partially post
// ============================================================================
#[tokio::test]
async fn test_failed_purchase_writes_nothing() {
    let db = common::connect().await;
    let accounts = AccountRepository::new(db.clone());
    common::ensure_chart(&accounts).await;
    let journal = JournalRepository::new(db.clone());
    let reports = ReportReader::new(db);
    let adapter = PurchaseJournalAdapter::new(journal, accounts);

    // One item points at an account that does not exist.
    let purchase = Purchase {
        id: Uuid::new_v4(),
        code: format!("PO-{}", Uuid::new_v4().simple()),
        vendor_name: "CV Sumber Rejeki".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
        items: vec![PurchaseItem {
            description: "Consulting".into(),
            total: dec!(400),
            expense_account: Some(Uuid::new_v4()),
        }],
        tax_amount: dec!(0),
        total_amount: dec!(400),
        payment_method: PaymentMethod::Credit,
    };

    let result = adapter.record(&purchase, Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(PostingError::Ledger(LedgerError::AccountNotFound(_)))
    ));

    let entries = reports
        .entries_by_source(SourceType::Purchase, purchase.id, true)
        .await
        .unwrap();
    assert!(entries.is_empty(), "failed adapter call must not post");
}
