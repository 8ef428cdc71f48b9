// 認証モジュール（静的APIキー + Bearer JWT の二要素）
//
// 認証に失敗したリクエストは監査ログに記録しない（運用ログのみ）。
// 監査証跡は「受理されたリクエスト」の記録であり、拒否された試行は対象外とする方針。

/// 静的APIキーの抽出・照合
pub mod api_key;

/// JWT検証（jsonwebtoken）
pub mod jwt;

/// 認証ミドルウェア
pub mod middleware;

use crate::common::error::AuthError;
use crate::config::AppConfig;
use chrono::{DateTime, Utc};

/// 認証済みコンテキスト（リクエスト単位、永続化しない）
#[derive(Debug, Clone)]
pub struct CredentialContext {
    /// 静的APIキーの照合に成功したか
    pub static_key_valid: bool,
    /// 検証済みJWTクレーム
    pub token_claims: jwt::TokenClaims,
}

/// 提示された資格情報を検証する
///
/// APIキー → トークンの順に評価し、最初に失敗したチェックのエラーを返す。
/// どちらも必須。
///
/// # Arguments
/// * `config` - APIキーとJWTシークレットを保持する設定
/// * `key_from_query` - クエリパラメータ `api_key`
/// * `key_from_header` - ヘッダー `X-API-Key`
/// * `authorization` - ヘッダー `Authorization`
/// * `now` - トークン有効期限の判定基準時刻
pub fn verify(
    config: &AppConfig,
    key_from_query: Option<&str>,
    key_from_header: Option<&str>,
    authorization: Option<&str>,
    now: DateTime<Utc>,
) -> Result<CredentialContext, AuthError> {
    let provided = api_key::select_api_key(&[key_from_query, key_from_header]);
    api_key::check_api_key(provided, &config.api_key)?;

    let token = jwt::extract_bearer_token(authorization)?;
    let token_claims = jwt::verify_jwt(token, &config.jwt_secret, now)?;

    Ok(CredentialContext {
        static_key_valid: true,
        token_claims,
    })
}
