//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 認証エラーは常に401で監査ログに残らない。ディスパッチエラーは監査ログに
//! 記録された上で400/500として返る。シンクエラーはクライアントに見えない。

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// 認証エラー（APIキー + Bearer JWT）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// クエリ・ヘッダーのどちらにもAPIキーがない
    #[error("API key required (query param 'api_key' or header 'X-API-Key')")]
    MissingKey,

    /// APIキーが設定値と一致しない
    #[error("Invalid API key")]
    InvalidKey,

    /// Authorizationヘッダーがない
    #[error("Authorization header required")]
    MissingAuthorization,

    /// `Bearer <token>` 形式ではない
    #[error("Invalid authorization header format. Use: Bearer <token>")]
    MalformedAuthorization,

    /// expクレームが現在時刻以前
    #[error("JWT token has expired")]
    TokenExpired,

    /// 署名不正・クレーム不正・アルゴリズム不一致など
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// アクション実行エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// 業務エラー（クライアントには400）
    #[error("{0}")]
    Business(String),

    /// 想定外のエラー（クライアントには500）
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DispatchError {
    /// 業務エラーを生成
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business(message.into())
    }

    /// クライアントに返すHTTPステータス
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Business(_) => StatusCode::BAD_REQUEST,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// インデックス付きストア（SQLite）のエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// request_idのUNIQUE制約違反
    #[error("Duplicate request_id: {0}")]
    Duplicate(Uuid),

    /// その他のDBエラー
    #[error("Database error: {0}")]
    Database(String),
}

/// 監査ログシンクの書き込みエラー
#[derive(Debug, Error)]
pub enum SinkError {
    /// シーケンスファイルへの追記失敗
    #[error("Sequence file write failed: {0}")]
    File(#[from] std::io::Error),

    /// レコードのJSONエンコード失敗
    #[error("Record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// ストアへの挿入失敗
    #[error(transparent)]
    Store(#[from] StoreError),

    /// ブロッキングタスクの異常終了
    #[error("Sink task failed: {0}")]
    Task(String),
}

/// 起動時設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須のシークレットが未設定または空
    #[error("Missing required environment variable {0}")]
    MissingSecret(&'static str),

    /// 値の形式が不正
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// auditgate error type
#[derive(Debug, Error)]
pub enum GateError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Dispatch error
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Request body could not be parsed into the expected shape
    #[error("Invalid request body: {message}")]
    InvalidBody {
        /// Status chosen by the JSON extractor (400, 415 or 422)
        status: StatusCode,
        /// Extractor message
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Dispatch(e) => e.status_code(),
            Self::InvalidBody { status, .. } => *status,
            Self::Database(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message placed in the `detail` field of the response.
    ///
    /// Auth, dispatch and body errors are meant for the client and are returned as-is.
    /// Infrastructure errors are replaced with a generic message.
    pub fn external_message(&self) -> String {
        match self {
            Self::Auth(e) => e.to_string(),
            Self::Dispatch(e) => e.to_string(),
            Self::InvalidBody { message, .. } => message.clone(),
            Self::Database(_) | Self::Io(_) => "Internal server error".to_string(),
        }
    }
}

/// auditgate共通のResult型
pub type GateResult<T> = Result<T, GateError>;
