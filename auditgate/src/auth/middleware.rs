// 認証ミドルウェア（APIキー + JWT）

use crate::api::error::AppError;
use crate::auth::api_key::API_KEY_HEADER;
use crate::config::AppConfig;
use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// クエリ文字列から `api_key` を取り出す
///
/// クエリが不正な場合は未指定扱い。
pub(crate) fn extract_query_api_key(uri: &Uri) -> Option<String> {
    Query::<ApiKeyQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.api_key)
}

/// 二要素認証ミドルウェア
///
/// クエリ `api_key` / ヘッダー `X-API-Key` の静的キーと、
/// `Authorization: Bearer <token>` のJWTを検証する。
///
/// # Arguments
/// * `State(config)` - 認証用シークレットを保持する設定
/// * `request` - HTTPリクエスト
/// * `next` - 次のミドルウェア/ハンドラー
///
/// # Returns
/// * `Ok(Response)` - 認証成功、requestに`CredentialContext`を追加
/// * `Err(AppError)` - 認証失敗、401 Unauthorized（監査ログには記録しない）
pub async fn credential_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let query_key = extract_query_api_key(request.uri());
    let headers = request.headers();

    let context = crate::auth::verify(
        &config,
        query_key.as_deref(),
        header_str(headers, API_KEY_HEADER),
        header_str(headers, header::AUTHORIZATION.as_str()),
        Utc::now(),
    )
    .map_err(|e| {
        tracing::warn!(
            path = %request.uri().path(),
            "Authentication rejected: {}",
            e
        );
        AppError::from(e)
    })?;

    // 検証済みコンテキストをrequestの拡張データに格納
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
