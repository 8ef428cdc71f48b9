//! 監査ログレコード型
//!
//! 1件の受理済みリクエストにつき1レコード。シーケンスファイルの1行と
//! ストアの1行は同じ `LogRecord` から作られる。

use crate::common::error::DispatchError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 処理結果の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// アクションが結果を返した
    Success,
    /// 業務エラーまたは想定外のエラー
    Failure,
}

impl Outcome {
    /// ストアに保存する文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Outcome::Success),
            "failure" => Ok(Outcome::Failure),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}

/// レコードに含めるリクエスト由来の情報
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// サーバーが採番したリクエストID
    pub request_id: Uuid,
    /// 受信時刻
    pub received_at: DateTime<Utc>,
    /// データセットID
    pub dataset_id: String,
    /// アクション名
    pub action: String,
    /// クライアントのIPアドレス（取得できない場合はNone）
    pub client: Option<String>,
}

/// 監査ログレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 受信時刻（RFC3339、マイクロ秒精度）
    #[serde(with = "rfc3339_micros")]
    pub timestamp: DateTime<Utc>,
    /// リクエストID
    pub request_id: Uuid,
    /// データセットID
    pub dataset_id: String,
    /// アクション名
    pub action: String,
    /// 処理結果
    #[serde(rename = "status")]
    pub outcome: Outcome,
    /// 処理時間（ミリ秒）
    pub duration_ms: u64,
    /// 成功時はアクション結果、失敗時はエラーメッセージ文字列
    pub output: Value,
    /// クライアントに返したHTTPステータス
    pub http_status: u16,
    /// クライアントのIPアドレス
    pub client: Option<String>,
}

impl LogRecord {
    /// ディスパッチ結果からレコードを組み立てる
    ///
    /// 成功は200、業務エラーは400、想定外のエラーは500として記録する。
    /// 失敗時の `output` はクライアントに返す `detail` と同じ文字列。
    /// タイムスタンプは保存形式に合わせてマイクロ秒に切り詰める。
    pub fn from_result(
        meta: RequestMeta,
        duration_ms: u64,
        result: &Result<Value, DispatchError>,
    ) -> Self {
        let (outcome, output, http_status) = match result {
            Ok(data) => (Outcome::Success, data.clone(), 200),
            Err(err) => (
                Outcome::Failure,
                Value::String(err.to_string()),
                err.status_code().as_u16(),
            ),
        };

        Self {
            timestamp: meta.received_at.trunc_subsecs(6),
            request_id: meta.request_id,
            dataset_id: meta.dataset_id,
            action: meta.action,
            outcome,
            duration_ms,
            output,
            http_status,
            client: meta.client,
        }
    }
}

/// タイムスタンプの文字列表現
///
/// ストアの `ORDER BY timestamp` が時系列順になるよう、桁数を固定する。
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// RFC3339文字列をパースする
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc))
}

mod rfc3339_micros {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(d)?;
        super::parse_timestamp(&value).map_err(serde::de::Error::custom)
    }
}
