//! 二重書き込みの監査ロガー
//!
//! 1レコードをシーケンスファイル → ストアの順に書き込む。
//! 一方の失敗はもう一方を妨げず、どちらの失敗もクライアントには見えない。

use crate::audit::sink::AuditSink;
use crate::audit::types::LogRecord;
use std::sync::Arc;
use tracing::{debug, error};

/// 各出力先への書き込み結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkReport {
    /// シーケンスファイルへの書き込みが成功したか
    pub file_ok: bool,
    /// ストアへの書き込みが成功したか
    pub store_ok: bool,
}

impl SinkReport {
    /// 両方に書き込めたか
    pub fn fully_persisted(&self) -> bool {
        self.file_ok && self.store_ok
    }

    /// 少なくとも一方に書き込めたか
    pub fn persisted_anywhere(&self) -> bool {
        self.file_ok || self.store_ok
    }
}

/// 監査ロガー
///
/// Clone可能（出力先のArcのクローン）。
#[derive(Clone)]
pub struct DurableLogger {
    file: Arc<dyn AuditSink>,
    store: Arc<dyn AuditSink>,
}

impl DurableLogger {
    /// 出力先を指定して作成
    pub fn new(file: Arc<dyn AuditSink>, store: Arc<dyn AuditSink>) -> Self {
        Self { file, store }
    }

    /// レコードを両方の出力先に書き込む
    ///
    /// 失敗は運用ログに出すだけで、呼び出し元にはエラーとして返さない。
    pub async fn record(&self, record: &LogRecord) -> SinkReport {
        let report = SinkReport {
            file_ok: write_guarded(self.file.as_ref(), record).await,
            store_ok: write_guarded(self.store.as_ref(), record).await,
        };

        if !report.persisted_anywhere() {
            error!(
                request_id = %record.request_id,
                "Audit record lost: every sink failed"
            );
        }

        report
    }
}

async fn write_guarded(sink: &dyn AuditSink, record: &LogRecord) -> bool {
    match sink.write(record).await {
        Ok(()) => {
            debug!(sink = sink.name(), request_id = %record.request_id, "Audit record written");
            true
        }
        Err(e) => {
            error!(
                sink = sink.name(),
                request_id = %record.request_id,
                "Failed to write audit record: {}",
                e
            );
            false
        }
    }
}
