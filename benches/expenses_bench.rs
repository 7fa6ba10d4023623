use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::tempdir;
use time::{Date, Month};
use tokio::runtime::Runtime;

use sprout_ledger::database::init_expense_db;
use sprout_ledger::expenses::ExpenseStore;
use sprout_ledger::filters::{Filters, MonthYearFilter};
use sprout_ledger::models::NewExpense;

// Benchmark constants
const BENCH_OWNER_ID: i64 = 1;
const BENCH_EXPENSE_COUNT: usize = 1000;

async fn setup_benchmark_environment() -> (ExpenseStore, tempfile::TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir.path().to_str().unwrap().to_string();
    let db = init_expense_db(&data_path).await.unwrap();

    (ExpenseStore::new(db), temp_dir)
}

async fn create_benchmark_expenses(store: &ExpenseStore, count: usize) {
    for i in 0..count {
        let day = (i % 28) as u8 + 1;
        let month = if i % 2 == 0 { Month::March } else { Month::April };
        let expense = NewExpense {
            date: Date::from_calendar_date(2024, month, day).unwrap(),
            spent_at: format!("Shop {}", i % 50),
            notes: String::new(),
            category: format!("category_{}", i % 10),
            payment_method: "Card".to_string(),
            iso_currency_code: "USD".to_string(),
            amount: 10.0 + (i % 100) as f64,
        };
        store.insert(BENCH_OWNER_ID, &expense).await.unwrap();
    }
}

async fn benchmark_list_page(store: &ExpenseStore, filters: &Filters) {
    let list = store
        .get_all(BENCH_OWNER_ID, &MonthYearFilter::new(3, 2024), filters)
        .await
        .unwrap();

    black_box(list.metadata);
}

fn criterion_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Setup benchmark data once
    let (store, _temp_dir) = rt.block_on(setup_benchmark_environment());
    rt.block_on(create_benchmark_expenses(&store, BENCH_EXPENSE_COUNT));

    let by_date = Filters::default();
    c.bench_function("list_first_page_by_date", |b| {
        b.to_async(&rt).iter(|| benchmark_list_page(&store, &by_date))
    });

    let by_amount_deep = Filters::new(5, 100, "-amount");
    c.bench_function("list_deep_page_by_amount_desc", |b| {
        b.to_async(&rt)
            .iter(|| benchmark_list_page(&store, &by_amount_deep))
    });

    let stored = rt.block_on(store.get(BENCH_OWNER_ID, 1)).unwrap();
    c.bench_function("get_by_id", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(store.get(BENCH_OWNER_ID, stored.id).await.unwrap()) })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
