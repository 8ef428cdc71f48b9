//! REST APIハンドラー
//!
//! `POST /process` は認証ミドルウェアの内側、`GET /health` は認証なし。

/// エラーレスポンス
pub mod error;

/// ヘルスチェック
pub mod health;

/// `/process` ハンドラー
pub mod process;

use crate::auth::middleware::credential_auth_middleware;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを構築する
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/process", post(process::process))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            credential_auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
