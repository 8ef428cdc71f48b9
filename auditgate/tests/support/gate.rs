use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use std::sync::Arc;

use auditgate::audit::{sequence_file::read_records, DurableLogger, LogRecord, SequenceFileSink};
use auditgate::config::AppConfig;
use auditgate::db::{migrations::initialize_database, requests::RequestLogStorage};
use auditgate::orchestrator::{DispatchFn, Orchestrator};
use auditgate::{api, bootstrap};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_JWT_SECRET: &str = "test_secret_key_for_jwt_testing_12345678";
pub const TEST_PORT: u16 = 8899;

/// テスト用のゲート（一時ディレクトリにシーケンスファイルとストアを置く）
pub struct TestGate {
    pub app: Router,
    pub logs_dir: PathBuf,
    _dir: TempDir,
}

impl TestGate {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let logs_dir = dir.path().join("logs");
        let config = AppConfig::new(TEST_API_KEY, TEST_JWT_SECRET, &logs_dir);
        let state = bootstrap::initialize(config, TEST_PORT)
            .await
            .expect("Failed to initialize gate");

        Self {
            app: api::create_app(state),
            logs_dir,
            _dir: dir,
        }
    }

    /// ディスパッチ関数を差し替えたゲート
    pub async fn with_dispatcher(dispatch: DispatchFn) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let logs_dir = dir.path().join("logs");
        let config = AppConfig::new(TEST_API_KEY, TEST_JWT_SECRET, &logs_dir);
        let mut state = bootstrap::initialize(config, TEST_PORT)
            .await
            .expect("Failed to initialize gate");

        let file = SequenceFileSink::open(logs_dir.join("requests.log"))
            .expect("Failed to open sequence file");
        let store = open_store(&logs_dir).await;
        let logger = DurableLogger::new(Arc::new(file), Arc::new(store));
        state.orchestrator = Orchestrator::with_dispatcher(logger, dispatch);

        Self {
            app: api::create_app(state),
            logs_dir,
            _dir: dir,
        }
    }

    /// リクエストを送信し、ステータスとJSONボディを返す
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// シーケンスファイルの全レコード
    pub fn file_records(&self) -> Vec<LogRecord> {
        read_records(&self.logs_dir.join("requests.log")).expect("Failed to read sequence file")
    }

    /// ストアの全レコード（新しい順）
    pub async fn store_records(&self) -> Vec<LogRecord> {
        let storage = open_store(&self.logs_dir).await;
        storage
            .recent(u32::MAX)
            .await
            .expect("Failed to query store")
            .into_iter()
            .map(|stored| stored.record)
            .collect()
    }

    /// ストアの件数
    pub async fn store_count(&self) -> i64 {
        open_store(&self.logs_dir)
            .await
            .count()
            .await
            .expect("Failed to count store")
    }
}

async fn open_store(logs_dir: &Path) -> RequestLogStorage {
    let url = auditgate::config::database_url_for(&logs_dir.join("logs.db"));
    let pool = initialize_database(&url).await.expect("Failed to open store");
    RequestLogStorage::new(pool)
}

/// `exp` を現在時刻からのオフセットで指定してトークンを発行する
pub fn token_with_exp(exp_offset_secs: i64) -> String {
    let exp = Utc::now().timestamp() + exp_offset_secs;
    encode(
        &Header::default(),
        &json!({"sub": "integration-user", "exp": exp}),
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

pub fn bearer() -> String {
    format!("Bearer {}", token_with_exp(3600))
}

/// 認証済みの `/process` リクエスト
pub fn process_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("X-API-Key", TEST_API_KEY)
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// 接続元アドレスつきの認証済みリクエスト
pub fn process_request_from(body: Value, addr: SocketAddr) -> Request<Body> {
    let mut request = process_request(body);
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}
