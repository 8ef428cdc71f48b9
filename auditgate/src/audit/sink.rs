//! 監査ログの出力先

use crate::audit::types::LogRecord;
use crate::common::error::SinkError;
use async_trait::async_trait;

/// 監査ログの出力先
///
/// `write` が `Ok` を返した時点でレコードは永続化済みでなければならない。
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// 運用ログに出す出力先の名前
    fn name(&self) -> &'static str;

    /// レコードを1件書き込む
    async fn write(&self, record: &LogRecord) -> Result<(), SinkError>;
}
