//! 監査ログ
//!
//! 受理されたリクエスト1件につき1レコードを、シーケンスファイルと
//! SQLiteストアの両方に書き込む。

/// 監査ログレコード型
pub mod types;

/// 出力先trait
pub mod sink;

/// シーケンスファイル（NDJSON）
pub mod sequence_file;

/// 二重書き込みロガー
pub mod writer;

pub use sequence_file::SequenceFileSink;
pub use sink::AuditSink;
pub use types::{LogRecord, Outcome, RequestMeta};
pub use writer::{DurableLogger, SinkReport};
