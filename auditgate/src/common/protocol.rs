//! 通信プロトコル定義
//!
//! `/process` と `/health` のリクエスト/レスポンス型を定義します。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// `/process` リクエストボディ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// データセット識別子
    pub dataset_id: String,
    /// 実行するアクション（summarize, count, validate, ...）
    pub action: String,
    /// アクション固有のデータ
    pub payload: Map<String, Value>,
}

/// 成功時のレスポンスエンベロープ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// リクエストID（監査ログと同一）
    pub request_id: Uuid,
    /// "success" 固定
    pub status: String,
    /// アクション結果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// エラーメッセージ（成功時は出力しない）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResponse {
    /// 成功レスポンスを生成
    pub fn success(request_id: Uuid, data: Value) -> Self {
        Self {
            request_id,
            status: "success".to_string(),
            data: Some(data),
            error: None,
        }
    }
}

/// エラーレスポンス `{detail}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// エラー内容
    pub detail: String,
}

/// ヘルスチェックレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" 固定
    pub status: String,
    /// サービス名
    pub service: String,
    /// 待受ポート
    pub port: u16,
}
