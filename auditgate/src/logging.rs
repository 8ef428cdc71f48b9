//! ロギング初期化ユーティリティ
//!
//! 運用ログ（tracing）の出力先を設定する。監査ログ（シーケンスファイル/ストア）とは別系統。

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルの環境変数
pub const LOG_LEVEL_ENV: &str = "AUDITGATE_LOG_LEVEL";
/// 運用ログファイル名の環境変数（未設定ならstdoutのみ）
pub const LOG_FILE_ENV: &str = "AUDITGATE_LOG_FILE";

const DEFAULT_LOG_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    let level = crate::config::get_env_or(LOG_LEVEL_ENV, DEFAULT_LOG_LEVEL);
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// tracingサブスクライバーを初期化する
///
/// `AUDITGATE_LOG_FILE` が設定されていれば `logs_dir` 配下にも出力する。
/// 戻り値の `WorkerGuard` はプロセス終了まで保持すること（drop時にフラッシュされる）。
pub fn init(logs_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let file_name = crate::config::get_env_any(&[LOG_FILE_ENV]);

    let (file_layer, guard) = match file_name {
        Some(name) => {
            std::fs::create_dir_all(logs_dir)?;
            let appender = tracing_appender::rolling::never(logs_dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// CLIサブコマンド用（stdoutのみ、ファイル出力なし）
pub fn init_stdout() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .try_init()?;
    Ok(())
}
