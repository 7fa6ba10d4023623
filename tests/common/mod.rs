#![allow(dead_code)]

use sprout_ledger::database::init_expense_db;
use sprout_ledger::expenses::ExpenseStore;
use sprout_ledger::models::{Expense, NewExpense};
use tempfile::{TempDir, tempdir};
use time::Date;

pub const OWNER_ID: i64 = 7;
pub const OTHER_OWNER_ID: i64 = 8;

/// Store backed by a fresh database in its own temporary directory. Keep the
/// `TempDir` alive for the duration of the test.
pub async fn setup_test_store() -> (ExpenseStore, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_expense_db(&data_path).await.unwrap_or_else(|e| {
        panic!(
            "Failed to initialize expense database at {}: {}",
            data_path, e
        )
    });

    (ExpenseStore::new(db), temp_dir)
}

pub fn new_expense(date: Date, spent_at: &str, category: &str, amount: f64) -> NewExpense {
    NewExpense {
        date,
        spent_at: spent_at.to_string(),
        notes: String::new(),
        category: category.to_string(),
        payment_method: "Card".to_string(),
        iso_currency_code: "USD".to_string(),
        amount,
    }
}

pub async fn create_test_expense(
    store: &ExpenseStore,
    owner_id: i64,
    date: Date,
    spent_at: &str,
    category: &str,
    amount: f64,
) -> Expense {
    store
        .insert(owner_id, &new_expense(date, spent_at, category, amount))
        .await
        .unwrap_or_else(|e| {
            panic!(
                "Failed to insert test expense '{}' for owner {}: {}",
                spent_at, owner_id, e
            )
        })
}
