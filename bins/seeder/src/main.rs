//! Chart of accounts seeder for Neraca development and testing.
//!
//! Seeds the standard chart the source adapters resolve by code. Safe to
//! re-run: existing codes are skipped.
//!
//! Usage: cargo run --bin seeder

use neraca_core::ledger::AccountType;
use neraca_db::repositories::{AccountRepository, CreateAccountInput};

/// One row of the seed chart: code, name, type, parent code, is_header.
type SeedAccount = (&'static str, &'static str, AccountType, Option<&'static str>, bool);

const CHART: &[SeedAccount] = &[
    // Assets
    ("1000", "ASSETS", AccountType::Asset, None, true),
    ("1100", "CURRENT ASSETS", AccountType::Asset, Some("1000"), true),
    ("1101", "Cash on hand", AccountType::Asset, Some("1100"), false),
    ("1102", "Bank", AccountType::Asset, Some("1100"), false),
    ("1200", "ACCOUNTS RECEIVABLE", AccountType::Asset, Some("1000"), true),
    ("1201", "Trade receivables", AccountType::Asset, Some("1200"), false),
    ("1240", "Input VAT", AccountType::Asset, Some("1100"), false),
    ("1301", "Merchandise inventory", AccountType::Asset, Some("1100"), false),
    ("1500", "FIXED ASSETS", AccountType::Asset, Some("1000"), true),
    ("1501", "Office equipment", AccountType::Asset, Some("1500"), false),
    // Liabilities
    ("2000", "LIABILITIES", AccountType::Liability, None, true),
    ("2100", "CURRENT LIABILITIES", AccountType::Liability, Some("2000"), true),
    ("2101", "Trade payables", AccountType::Liability, Some("2100"), false),
    ("2103", "Output VAT", AccountType::Liability, Some("2100"), false),
    // Equity
    ("3000", "EQUITY", AccountType::Equity, None, true),
    ("3101", "Owner's capital", AccountType::Equity, Some("3000"), false),
    ("3201", "Retained earnings", AccountType::Equity, Some("3000"), false),
    // Revenue
    ("4000", "REVENUE", AccountType::Revenue, None, true),
    ("4101", "Sales revenue", AccountType::Revenue, Some("4000"), false),
    ("4201", "Other income", AccountType::Revenue, Some("4000"), false),
    // Expenses
    ("5000", "EXPENSES", AccountType::Expense, None, true),
    ("5101", "Cost of goods sold", AccountType::Expense, Some("5000"), false),
    ("5201", "Salaries expense", AccountType::Expense, Some("5000"), false),
    ("5202", "Utilities expense", AccountType::Expense, Some("5000"), false),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = neraca_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let accounts = AccountRepository::new(db);

    println!("Seeding chart of accounts...");
    for (code, name, account_type, parent_code, is_header) in CHART {
        if accounts
            .find_by_code_uncached(code)
            .await
            .expect("Failed to query account")
            .is_some()
        {
            println!("  {code} already exists, skipping...");
            continue;
        }

        let parent_id = match parent_code {
            Some(parent) => {
                let parent_account = accounts
                    .find_by_code_uncached(parent)
                    .await
                    .expect("Failed to query parent account")
                    .unwrap_or_else(|| panic!("parent account {parent} must be seeded before {code}"));
                Some(parent_account.id)
            }
            None => None,
        };

        accounts
            .create(CreateAccountInput {
                code: (*code).to_string(),
                name: (*name).to_string(),
                description: None,
                account_type: *account_type,
                parent_id,
                is_header: *is_header,
                is_active: true,
            })
            .await
            .expect("Failed to create account");
        println!("  Created account {code} - {name}");
    }

    println!("Seeding complete!");
}
