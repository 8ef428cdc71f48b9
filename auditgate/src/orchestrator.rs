//! リクエスト処理の本体
//!
//! 認証済みリクエストを受け取り、採番 → ディスパッチ → 監査ログ記録 を
//! 1回ずつ行う。HTTPには依存しない。

use crate::audit::{DurableLogger, LogRecord, RequestMeta, SinkReport};
use crate::common::error::DispatchError;
use crate::common::protocol::ProcessRequest;
use crate::dispatch;
use chrono::Utc;
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// ディスパッチ関数の型
pub type DispatchFn = fn(&str, &str, &Map<String, Value>) -> Result<Value, DispatchError>;

/// 1リクエストの処理結果
#[derive(Debug)]
pub struct ProcessOutcome {
    /// 採番したリクエストID
    pub request_id: Uuid,
    /// ディスパッチ結果（ログに記録したものと同じ）
    pub result: Result<Value, DispatchError>,
    /// 監査ログの書き込み結果
    pub report: SinkReport,
}

/// リクエストオーケストレーター
///
/// Clone可能（ロガーのクローン）。
#[derive(Clone)]
pub struct Orchestrator {
    logger: DurableLogger,
    dispatch: DispatchFn,
}

impl Orchestrator {
    /// 標準のディスパッチャーで作成
    pub fn new(logger: DurableLogger) -> Self {
        Self::with_dispatcher(logger, dispatch::dispatch)
    }

    /// ディスパッチ関数を差し替えて作成
    pub fn with_dispatcher(logger: DurableLogger, dispatch: DispatchFn) -> Self {
        Self { logger, dispatch }
    }

    /// 認証済みリクエストを処理する
    ///
    /// ディスパッチの成否にかかわらず、戻る前に必ず1回だけ監査ログに記録する。
    pub async fn handle(&self, request: ProcessRequest, client: Option<String>) -> ProcessOutcome {
        let request_id = Uuid::new_v4();
        let received_at = Utc::now();

        let started = Instant::now();
        let result = self.run_dispatch(&request);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => info!(
                request_id = %request_id,
                action = %request.action,
                dataset_id = %request.dataset_id,
                duration_ms,
                "Request processed"
            ),
            Err(e) => warn!(
                request_id = %request_id,
                action = %request.action,
                dataset_id = %request.dataset_id,
                duration_ms,
                "Request failed: {}",
                e
            ),
        }

        let meta = RequestMeta {
            request_id,
            received_at,
            dataset_id: request.dataset_id,
            action: request.action,
            client,
        };
        let record = LogRecord::from_result(meta, duration_ms, &result);
        let report = self.logger.record(&record).await;

        ProcessOutcome {
            request_id,
            result,
            report,
        }
    }

    // パニックは想定外のエラーとして扱う
    fn run_dispatch(&self, request: &ProcessRequest) -> Result<Value, DispatchError> {
        let dispatch = self.dispatch;
        catch_unwind(AssertUnwindSafe(|| {
            dispatch(&request.action, &request.dataset_id, &request.payload)
        }))
        .unwrap_or_else(|panic| Err(DispatchError::Unexpected(panic_message(panic.as_ref()))))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "dispatcher panicked".to_string()
    }
}
