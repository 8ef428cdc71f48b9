//! ヘルスチェックAPI

use crate::common::protocol::HealthResponse;
use crate::AppState;
use axum::{extract::State, Json};

/// ヘルスチェックで返すサービス名
pub const SERVICE_NAME: &str = "process-api";

/// GET /health
///
/// 認証不要。監査ログには記録しない。
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        port: state.port,
    })
}
