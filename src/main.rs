use sprout_ledger::config::Config;
use sprout_ledger::database;
use sprout_ledger::expenses::ExpenseStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let db = database::init_expense_db(&config.data_path).await?;
    let store = ExpenseStore::new(db).with_timeout(config.store_timeout);

    info!(
        data_path = %config.data_path,
        timeout = ?store.timeout(),
        "expense store ready"
    );

    Ok(())
}
