//! `/process` ハンドラー

use crate::api::error::AppError;
use crate::auth::CredentialContext;
use crate::common::error::DispatchError;
use crate::common::ip::client_label;
use crate::common::protocol::{ProcessRequest, ProcessResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    Extension, Json,
};
use std::net::SocketAddr;
use tracing::debug;

/// POST /process
///
/// 認証済みリクエストをオーケストレーターに渡す。処理と監査ログ記録は
/// 別タスクで実行し、クライアントが切断しても記録は最後まで行われる。
///
/// # Returns
/// * `200` - `{request_id, status: "success", data}`
/// * `400` / `500` - `{detail}`（監査ログの `output` と同じ文字列）
/// * `400` / `415` / `422` - ボディ不正。ディスパッチせず記録もしない
pub async fn process(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Extension(credentials): Extension<CredentialContext>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    let Json(request) = body?;
    let client = client_label(connect_info.map(|ConnectInfo(addr)| addr));
    debug!(
        subject = credentials.token_claims.get("sub").and_then(|v| v.as_str()),
        action = %request.action,
        "Accepted process request"
    );

    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.handle(request, client).await })
        .await
        .map_err(|e| AppError::from(DispatchError::Unexpected(e.to_string())))?;

    let data = outcome.result?;
    Ok(Json(ProcessResponse::success(outcome.request_id, data)))
}
