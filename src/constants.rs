// Storage configuration
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE_NAME: &str = "expenses.db";
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_LOG_FILTER: &str = "info";

// Listing defaults
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const DEFAULT_SORT: &str = "date";
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const YEAR_WINDOW: i32 = 100;

/// Sort tokens accepted when listing expenses. A leading `-` means descending.
pub const EXPENSE_SORT_SAFELIST: &[&str] = &[
    "date",
    "-date",
    "spent_at",
    "-spent_at",
    "category",
    "-category",
    "payment_method",
    "-payment_method",
    "amount",
    "-amount",
];

// Validation limits (bytes)
pub const MAX_SPENT_AT_LENGTH: usize = 50;
pub const MAX_NOTES_LENGTH: usize = 100;
pub const MAX_CATEGORY_LENGTH: usize = 50;
pub const MAX_PAYMENT_METHOD_LENGTH: usize = 50;
pub const MAX_CURRENCY_CODE_LENGTH: usize = 3;
pub const MAX_AMOUNT: f64 = 1_000_000.0;
pub const MIN_DATE_YEAR: i32 = 0;
pub const MAX_DATE_YEAR: i32 = 9999;

// Error messages
pub const ERR_MUST_BE_PROVIDED: &str = "must be provided";
pub const ERR_RECORD_NOT_FOUND: &str = "record not found";
pub const ERR_INVALID_DATE_FORMAT: &str = "invalid date format";
