//! 監査ログのインデックス付きストア
//!
//! SQLiteの `requests` テーブルに1レコード1行で保存する。
//! `request_id` にはUNIQUE制約があり、重複挿入は `StoreError::Duplicate`。

use crate::audit::sink::AuditSink;
use crate::audit::types::{format_timestamp, parse_timestamp, LogRecord, Outcome};
use crate::common::error::{SinkError, StoreError};
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

/// ストアに保存された行（採番IDつき）
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// 自動採番ID
    pub id: i64,
    /// レコード本体
    pub record: LogRecord,
}

/// 監査ログストア（SQLite版）
#[derive(Clone)]
pub struct RequestLogStorage {
    pool: SqlitePool,
}

impl RequestLogStorage {
    /// 新しいストレージインスタンスを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// レコードを1行挿入し、採番IDを返す
    pub async fn insert(&self, record: &LogRecord) -> Result<i64, StoreError> {
        let output = serde_json::to_string(&record.output)
            .map_err(|e| StoreError::Database(format!("Failed to encode output: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO requests (
                timestamp, request_id, dataset_id, action, status,
                duration_ms, output, http_status, client
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(format_timestamp(&record.timestamp))
        .bind(record.request_id.to_string())
        .bind(&record.dataset_id)
        .bind(&record.action)
        .bind(record.outcome.as_str())
        .bind(i64::try_from(record.duration_ms).unwrap_or(i64::MAX))
        .bind(output)
        .bind(i64::from(record.http_status))
        .bind(&record.client)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, record.request_id))?;

        Ok(result.last_insert_rowid())
    }

    /// request_idでレコードを取得
    pub async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<StoredRecord>, StoreError> {
        let row = sqlx::query_as::<_, RequestRow>(
            "SELECT * FROM requests WHERE request_id = ? LIMIT 1",
        )
        .bind(request_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to load record: {}", e)))?;

        row.map(StoredRecord::try_from).transpose()
    }

    /// 新しい順に最大 `limit` 件を取得
    pub async fn recent(&self, limit: u32) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT * FROM requests ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to load records: {}", e)))?;

        rows.into_iter().map(StoredRecord::try_from).collect()
    }

    /// 総件数
    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to count records: {}", e)))
    }
}

fn map_insert_error(err: sqlx::Error, request_id: Uuid) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(request_id)
        }
        _ if err.to_string().contains("UNIQUE constraint failed") => {
            StoreError::Duplicate(request_id)
        }
        _ => StoreError::Database(format!("Failed to save record: {}", err)),
    }
}

#[async_trait]
impl AuditSink for RequestLogStorage {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.insert(record).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    timestamp: String,
    request_id: String,
    dataset_id: String,
    action: String,
    status: String,
    duration_ms: i64,
    output: String,
    http_status: i64,
    client: Option<String>,
}

impl TryFrom<RequestRow> for StoredRecord {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let timestamp = parse_timestamp(&row.timestamp)
            .map_err(|e| StoreError::Database(format!("Invalid timestamp: {}", e)))?;
        let request_id = Uuid::parse_str(&row.request_id)
            .map_err(|e| StoreError::Database(format!("Invalid UUID: {}", e)))?;
        let outcome = row
            .status
            .parse::<Outcome>()
            .map_err(StoreError::Database)?;
        let output = serde_json::from_str(&row.output)
            .map_err(|e| StoreError::Database(format!("Invalid output JSON: {}", e)))?;
        let http_status = u16::try_from(row.http_status)
            .map_err(|e| StoreError::Database(format!("Invalid http_status: {}", e)))?;

        Ok(StoredRecord {
            id: row.id,
            record: LogRecord {
                timestamp,
                request_id,
                dataset_id: row.dataset_id,
                action: row.action,
                outcome,
                duration_ms: u64::try_from(row.duration_ms).unwrap_or_default(),
                output,
                http_status,
                client: row.client,
            },
        })
    }
}
