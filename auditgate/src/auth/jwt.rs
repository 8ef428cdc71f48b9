// Bearer JWTの抽出と検証（jsonwebtoken実装、HS256固定）

use crate::common::error::AuthError;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

/// 署名アルゴリズム（単一固定）
pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// 検証済みクレーム
pub type TokenClaims = Map<String, Value>;

/// Authorizationヘッダーからトークン部分を取り出す
///
/// # Returns
/// * `Ok(&str)` - `Bearer <token>` のトークン部分
/// * `Err(AuthError::MissingAuthorization)` - ヘッダーなし（空文字含む）
/// * `Err(AuthError::MalformedAuthorization)` - 2要素でない、またはスキームがbearerでない
pub fn extract_bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingAuthorization)?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(*token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

/// JWTトークンを検証
///
/// 有効期限は `now` を基準に判定する（猶予なし、`exp <= now` で期限切れ）。
///
/// # Arguments
/// * `token` - 検証するJWTトークン
/// * `secret` - JWTシークレットキー
/// * `now` - 判定基準時刻
///
/// # Returns
/// * `Ok(TokenClaims)` - 検証済みクレーム
/// * `Err(AuthError::TokenExpired)` - 期限切れ
/// * `Err(AuthError::InvalidToken)` - 署名不正、exp欠落、アルゴリズム不一致など
pub fn verify_jwt(token: &str, secret: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    // 期限判定は呼び出し側の時刻で行う
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);

    let claims = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })?;

    let now_secs = now.timestamp();

    let exp = numeric_claim(&claims, "exp")?
        .ok_or_else(|| AuthError::InvalidToken("Missing required claim: exp".to_string()))?;
    if exp <= now_secs {
        return Err(AuthError::TokenExpired);
    }

    if let Some(nbf) = numeric_claim(&claims, "nbf")? {
        if nbf > now_secs {
            return Err(AuthError::InvalidToken(
                "The token is not yet valid (nbf)".to_string(),
            ));
        }
    }

    Ok(claims)
}

fn numeric_claim(claims: &TokenClaims, name: &str) -> Result<Option<i64>, AuthError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.floor() as i64))
            .map(Some)
            .ok_or_else(|| AuthError::InvalidToken(format!("Claim '{}' must be a number", name))),
    }
}
