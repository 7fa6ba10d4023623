use libsql::{Database, Row, params};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::constants::*;
use crate::database::connect;
use crate::date::{format_date, parse_date};
use crate::error::{ExpenseError, ExpenseResult, StoreError};
use crate::filters::{
    Filters, MonthYearFilter, calculate_metadata, validate_filters, validate_month_year_filter,
};
use crate::models::{Expense, ExpenseList, ExpensePatch, NewExpense};
use crate::validator::Validator;

const EXPENSE_COLUMNS: &str =
    "id, created_at, date, spent_at, notes, category, payment_method, iso_currency_code, amount, version";

pub fn validate_expense(v: &mut Validator, expense: &Expense) {
    // Stored dates must read back as four-digit `YYYY-MM-DD`
    v.check(
        (MIN_DATE_YEAR..=MAX_DATE_YEAR).contains(&expense.date.year()),
        "date",
        "must have a year between 0000 and 9999",
    );

    v.check(!expense.spent_at.is_empty(), "spent_at", ERR_MUST_BE_PROVIDED);
    v.check(
        expense.spent_at.len() <= MAX_SPENT_AT_LENGTH,
        "spent_at",
        "must not be more than 50 bytes long",
    );

    v.check(
        expense.notes.len() <= MAX_NOTES_LENGTH,
        "notes",
        "must not be more than 100 bytes long",
    );

    v.check(!expense.category.is_empty(), "category", ERR_MUST_BE_PROVIDED);
    v.check(
        expense.category.len() <= MAX_CATEGORY_LENGTH,
        "category",
        "must not be more than 50 bytes long",
    );

    v.check(
        !expense.payment_method.is_empty(),
        "payment_method",
        ERR_MUST_BE_PROVIDED,
    );
    v.check(
        expense.payment_method.len() <= MAX_PAYMENT_METHOD_LENGTH,
        "payment_method",
        "must not be more than 50 bytes long",
    );

    v.check(
        !expense.iso_currency_code.is_empty(),
        "iso_currency_code",
        ERR_MUST_BE_PROVIDED,
    );
    v.check(
        expense.iso_currency_code.len() <= MAX_CURRENCY_CODE_LENGTH,
        "iso_currency_code",
        "must not be more than 3 bytes long",
    );

    v.check(expense.amount != 0.0, "amount", ERR_MUST_BE_PROVIDED);
    v.check(expense.amount > 0.0, "amount", "must be greater than 0");
    v.check(expense.amount < MAX_AMOUNT, "amount", "must be less than 1 million");
}

fn ensure_valid(expense: &Expense) -> ExpenseResult<()> {
    let mut v = Validator::new();
    validate_expense(&mut v, expense);
    if v.is_valid() {
        Ok(())
    } else {
        Err(ExpenseError::Validation(v))
    }
}

/// Reads the expense columns in `EXPENSE_COLUMNS` order, starting at `first`.
pub fn extract_expense_from_row(row: &Row, first: i32) -> Result<Expense, StoreError> {
    let column = |name: &str, e: libsql::Error| {
        StoreError::InvalidRow(format!("failed to get expense {}: {}", name, e))
    };

    let id: i64 = row.get(first).map_err(|e| column("id", e))?;
    let created_at: i64 = row.get(first + 1).map_err(|e| column("created_at", e))?;
    let date: String = row.get(first + 2).map_err(|e| column("date", e))?;
    let spent_at: String = row.get(first + 3).map_err(|e| column("spent_at", e))?;
    let notes: String = row.get(first + 4).map_err(|e| column("notes", e))?;
    let category: String = row.get(first + 5).map_err(|e| column("category", e))?;
    let payment_method: String = row
        .get(first + 6)
        .map_err(|e| column("payment_method", e))?;
    let iso_currency_code: String = row
        .get(first + 7)
        .map_err(|e| column("iso_currency_code", e))?;
    let amount: f64 = row.get(first + 8).map_err(|e| column("amount", e))?;
    let version: i64 = row.get(first + 9).map_err(|e| column("version", e))?;

    Ok(Expense {
        id,
        created_at: OffsetDateTime::from_unix_timestamp(created_at)
            .map_err(|e| StoreError::InvalidRow(format!("invalid created_at: {}", e)))?,
        date: parse_date(&date)
            .map_err(|e| StoreError::InvalidRow(format!("date {:?}: {}", date, e)))?,
        spent_at,
        notes,
        category,
        payment_method,
        iso_currency_code,
        amount,
        version: i32::try_from(version)
            .map_err(|_| StoreError::InvalidRow(format!("version out of range: {}", version)))?,
    })
}

/// Owner-scoped expense persistence.
///
/// Every operation opens its own connection and fails with
/// [`StoreError::Timeout`] once `timeout` elapses. Concurrent writers are
/// reconciled by the conditional `UPDATE`, not by in-process locks.
pub struct ExpenseStore {
    db: Database,
    timeout: Duration,
}

impl ExpenseStore {
    pub fn new(db: Database) -> Self {
        ExpenseStore {
            db,
            timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn within_deadline<T, F>(&self, operation: &str, fut: F) -> ExpenseResult<T>
    where
        F: Future<Output = ExpenseResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "expense store operation timed out");
                Err(StoreError::Timeout(self.timeout).into())
            }
        }
    }

    /// Persists a new expense. The returned entity carries the assigned id,
    /// `created_at`, and version 1.
    pub async fn insert(&self, owner_id: i64, new_expense: &NewExpense) -> ExpenseResult<Expense> {
        let mut expense = new_expense.draft();
        ensure_valid(&expense)?;

        self.within_deadline("insert", async move {
            let conn = connect(&self.db, self.timeout).await?;
            let created_at = OffsetDateTime::now_utc();

            let mut rows = conn
                .query(
                    "INSERT INTO expenses (owner_id, created_at, date, spent_at, notes, category, payment_method, iso_currency_code, amount)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                     RETURNING id, version",
                    params![
                        owner_id,
                        created_at.unix_timestamp(),
                        format_date(expense.date),
                        expense.spent_at.as_str(),
                        expense.notes.as_str(),
                        expense.category.as_str(),
                        expense.payment_method.as_str(),
                        expense.iso_currency_code.as_str(),
                        expense.amount
                    ],
                )
                .await?;

            let row = rows.next().await?.ok_or_else(|| {
                StoreError::InvalidRow("insert returned no row".to_string())
            })?;
            expense.id = row.get(0)?;
            let version: i64 = row.get(1)?;
            expense.version = i32::try_from(version)
                .map_err(|_| StoreError::InvalidRow(format!("version out of range: {}", version)))?;
            // Stored at second precision
            expense.created_at = created_at.replace_nanosecond(0).unwrap_or(created_at);

            debug!(owner_id, expense_id = expense.id, "expense inserted");
            Ok(expense)
        })
        .await
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> ExpenseResult<Expense> {
        if id < 1 {
            return Err(ExpenseError::NotFound);
        }

        self.within_deadline("get", async {
            let conn = connect(&self.db, self.timeout).await?;
            let mut rows = conn
                .query(
                    &format!(
                        "SELECT {} FROM expenses WHERE owner_id = ? AND id = ?",
                        EXPENSE_COLUMNS
                    ),
                    params![owner_id, id],
                )
                .await?;

            match rows.next().await? {
                Some(row) => Ok(extract_expense_from_row(&row, 0)?),
                None => Err(ExpenseError::NotFound),
            }
        })
        .await
    }

    /// Writes `expense` if its `version` still matches the stored row, then
    /// bumps `expense.version` and returns it. A stale version and a missing
    /// row both surface as [`ExpenseError::NotFound`].
    pub async fn update(&self, owner_id: i64, expense: &mut Expense) -> ExpenseResult<i32> {
        ensure_valid(expense)?;

        let new_version = self
            .within_deadline("update", async {
                let conn = connect(&self.db, self.timeout).await?;
                let mut rows = conn
                    .query(
                        "UPDATE expenses
                         SET date = ?, spent_at = ?, notes = ?, category = ?, payment_method = ?, iso_currency_code = ?, amount = ?, version = version + 1
                         WHERE owner_id = ? AND id = ? AND version = ?
                         RETURNING version",
                        params![
                            format_date(expense.date),
                            expense.spent_at.as_str(),
                            expense.notes.as_str(),
                            expense.category.as_str(),
                            expense.payment_method.as_str(),
                            expense.iso_currency_code.as_str(),
                            expense.amount,
                            owner_id,
                            expense.id,
                            expense.version
                        ],
                    )
                    .await?;

                match rows.next().await? {
                    Some(row) => {
                        let version: i64 = row.get(0)?;
                        i32::try_from(version).map_err(|_| {
                            StoreError::InvalidRow(format!("version out of range: {}", version))
                                .into()
                        })
                    }
                    None => {
                        debug!(
                            owner_id,
                            expense_id = expense.id,
                            version = expense.version,
                            "expense update matched no row"
                        );
                        Err(ExpenseError::NotFound)
                    }
                }
            })
            .await?;

        expense.version = new_version;
        debug!(owner_id, expense_id = expense.id, version = new_version, "expense updated");
        Ok(new_version)
    }

    /// Reads the current row, merges `patch`, and writes it back under the
    /// version that was read.
    pub async fn apply_patch(
        &self,
        owner_id: i64,
        id: i64,
        patch: ExpensePatch,
    ) -> ExpenseResult<Expense> {
        let mut expense = self.get(owner_id, id).await?;
        patch.apply_to(&mut expense);
        self.update(owner_id, &mut expense).await?;
        Ok(expense)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> ExpenseResult<()> {
        if id < 1 {
            return Err(ExpenseError::NotFound);
        }

        self.within_deadline("delete", async {
            let conn = connect(&self.db, self.timeout).await?;
            let affected = conn
                .execute(
                    "DELETE FROM expenses WHERE owner_id = ? AND id = ?",
                    params![owner_id, id],
                )
                .await?;

            if affected == 0 {
                return Err(ExpenseError::NotFound);
            }

            debug!(owner_id, expense_id = id, "expense deleted");
            Ok(())
        })
        .await
    }

    /// One page of the owner's expenses dated within the month, with the
    /// total match count taken from the same query. Out-of-range filters
    /// fail with [`ExpenseError::Validation`] before any query is built.
    pub async fn get_all(
        &self,
        owner_id: i64,
        month_year: &MonthYearFilter,
        filters: &Filters,
    ) -> ExpenseResult<ExpenseList> {
        let mut v = Validator::new();
        validate_month_year_filter(&mut v, month_year);
        validate_filters(&mut v, filters);
        if !v.is_valid() {
            return Err(ExpenseError::Validation(v));
        }

        let query = format!(
            "SELECT count(*) OVER(), {}
             FROM expenses
             WHERE owner_id = ? AND date >= ? AND date < ?
             ORDER BY {} {}, id ASC
             LIMIT ? OFFSET ?",
            EXPENSE_COLUMNS,
            filters.sort_column(),
            filters.sort_direction().as_sql()
        );
        let (start_date, end_date) = month_year.month_range();

        self.within_deadline("get_all", async {
            let conn = connect(&self.db, self.timeout).await?;
            let mut rows = conn
                .query(
                    &query,
                    params![
                        owner_id,
                        start_date.as_str(),
                        end_date.as_str(),
                        filters.limit(),
                        filters.offset()
                    ],
                )
                .await?;

            let mut total_records: i64 = 0;
            let mut expenses = Vec::new();
            while let Some(row) = rows.next().await? {
                total_records = row.get(0)?;
                expenses.push(extract_expense_from_row(&row, 1)?);
            }

            Ok(ExpenseList {
                expenses,
                metadata: calculate_metadata(total_records, filters.page, filters.page_size),
            })
        })
        .await
    }
}
