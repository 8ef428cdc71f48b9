//! サーバー初期化ロジック
//!
//! ログディレクトリ、シーケンスファイル、SQLiteストアを準備し、
//! `AppState` を組み立てる。

use crate::audit::{DurableLogger, SequenceFileSink};
use crate::common::error::GateResult;
use crate::config::AppConfig;
use crate::db::{migrations::initialize_database, requests::RequestLogStorage};
use crate::orchestrator::Orchestrator;
use crate::AppState;
use std::sync::Arc;
use tracing::info;

/// サーバー初期化を実行する
///
/// # Arguments
/// * `config` - 環境変数から読み込んだ設定
/// * `port` - 待受ポート（ヘルスチェックで返す）
pub async fn initialize(config: AppConfig, port: u16) -> GateResult<AppState> {
    config.ensure_logs_dir()?;
    info!("Audit logs directory: {}", config.logs_dir.display());

    let file = SequenceFileSink::open(config.sequence_log_path())?;
    let pool = initialize_database(&config.database_url()).await?;
    let store = RequestLogStorage::new(pool);
    info!(
        "Audit sinks ready: {} and {}",
        file.path().display(),
        config.store_path().display()
    );

    let logger = DurableLogger::new(Arc::new(file), Arc::new(store));

    Ok(AppState {
        config: Arc::new(config),
        orchestrator: Orchestrator::new(logger),
        port,
    })
}
