//! db subcommand
//!
//! Creates the audit store schema and prints recent records.

use crate::config::{database_url_for, DEFAULT_LOGS_DIR, LOGS_DIR_ENV, STORE_DB_FILE};
use crate::db::migrations::{initialize_database, open_existing_database};
use crate::db::requests::{RequestLogStorage, StoredRecord};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Arguments for the db subcommand
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// db operation
    #[command(subcommand)]
    pub command: DbCommand,
}

/// db operations
#[derive(Subcommand, Debug, Clone)]
pub enum DbCommand {
    /// Create the store file, schema and indexes
    Init(StoreLocation),
    /// Print the most recent records, newest first
    Query(QueryArgs),
}

/// Location of the audit store
#[derive(Args, Debug, Clone)]
pub struct StoreLocation {
    /// Directory holding the audit store
    #[arg(long, default_value = DEFAULT_LOGS_DIR, env = LOGS_DIR_ENV)]
    pub logs_dir: PathBuf,
}

impl StoreLocation {
    fn store_path(&self) -> PathBuf {
        self.logs_dir.join(STORE_DB_FILE)
    }
}

/// Arguments for `db query`
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Store location
    #[command(flatten)]
    pub location: StoreLocation,

    /// Number of records to print
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: u32,
}

/// Execute the db command
pub async fn execute(args: &DbArgs) -> Result<(), anyhow::Error> {
    match &args.command {
        DbCommand::Init(location) => {
            let path = location.store_path();
            init_store(&path).await?;
            println!("Database initialized: {}", path.display());
        }
        DbCommand::Query(query) => {
            let path = query.location.store_path();
            let records = query_store(&path, query.limit).await?;
            print_records(&records);
        }
    }
    Ok(())
}

async fn init_store(path: &Path) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let pool = initialize_database(&database_url_for(path)).await?;
    pool.close().await;
    Ok(())
}

async fn query_store(path: &Path, limit: u32) -> Result<Vec<StoredRecord>, anyhow::Error> {
    if !path.exists() {
        anyhow::bail!("Database not found: {}", path.display());
    }
    let pool = open_existing_database(&database_url_for(path)).await?;
    let records = RequestLogStorage::new(pool.clone()).recent(limit).await;
    pool.close().await;
    Ok(records?)
}

fn print_records(records: &[StoredRecord]) {
    if records.is_empty() {
        println!("No records");
        return;
    }
    println!("TIMESTAMP\t\t\t\tREQUEST_ID\t\t\t\tDATASET\tACTION\tSTATUS\tHTTP\tDURATION_MS");
    for stored in records {
        println!("{}", format_row(stored));
    }
}

fn format_row(stored: &StoredRecord) -> String {
    let record = &stored.record;
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        crate::audit::types::format_timestamp(&record.timestamp),
        record.request_id,
        record.dataset_id,
        record.action,
        record.outcome.as_str(),
        record.http_status,
        record.duration_ms
    )
}
