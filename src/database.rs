use anyhow::Result;
use libsql::{Builder, Connection, Database};
use std::path::Path;
use std::time::Duration;

use crate::constants::DATABASE_FILE_NAME;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id           INTEGER NOT NULL,
    created_at         INTEGER NOT NULL,
    date               TEXT    NOT NULL,
    spent_at           TEXT    NOT NULL,
    notes              TEXT    NOT NULL DEFAULT '',
    category           TEXT    NOT NULL,
    payment_method     TEXT    NOT NULL,
    iso_currency_code  TEXT    NOT NULL,
    amount             REAL    NOT NULL CHECK (amount > 0 AND amount < 1000000),
    version            INTEGER NOT NULL DEFAULT 1
);
"#;

const CREATE_OWNER_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS expenses_owner_date_idx ON expenses (owner_id, date);";

/// Expense database (expenses.db) under `data_dir`, with the schema applied.
pub async fn init_expense_db(data_dir: &str) -> Result<Database> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE_NAME);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    // journal_mode reports the resulting mode as a row
    let mut mode = conn.query("PRAGMA journal_mode = WAL", ()).await?;
    mode.next().await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_OWNER_DATE_INDEX, ()).await?;
    Ok(db)
}

/// Fresh connection scoped to a single store operation.
pub async fn connect(db: &Database, busy_timeout: Duration) -> libsql::Result<Connection> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
            (),
        )
        .await?;
    rows.next().await?;
    Ok(conn)
}
