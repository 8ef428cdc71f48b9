//! データベース初期化とマイグレーション

use crate::common::error::GateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;

/// SQLiteデータベース接続プールを作成してマイグレーションを実行
///
/// ファイルが存在しない場合は作成する。
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:logs/logs.db"）
///
/// # Returns
/// * `Ok(SqlitePool)` - 初期化済みデータベースプール
/// * `Err(GateError)` - 初期化失敗
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, GateError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| GateError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(|e| GateError::Database(format!("Failed to connect to database: {}", e)))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// 既存のデータベースを参照用に開く
///
/// ファイル作成・ジャーナルモード変更・マイグレーションは行わない。
pub async fn open_existing_database(database_url: &str) -> Result<SqlitePool, GateError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| GateError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| GateError::Database(format!("Failed to open database: {}", e)))
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), GateError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
