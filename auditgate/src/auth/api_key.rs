//! 静的APIキーの抽出と照合

use crate::common::error::AuthError;
use sha2::{Digest, Sha256};

/// APIキーのヘッダー名
pub const API_KEY_HEADER: &str = "X-API-Key";

/// 候補を順に見て、最初の空でない値を返す
///
/// 候補の順序は `[クエリ, ヘッダー]`。どちらも等しく有効で、
/// 先に見つかった方だけが照合に使われる。
pub fn select_api_key<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| !value.is_empty())
}

/// 提示されたAPIキーを設定値と照合する
pub fn check_api_key(provided: Option<&str>, expected: &str) -> Result<(), AuthError> {
    let provided = provided.ok_or(AuthError::MissingKey)?;
    // 長さに依存しない比較のためダイジェスト同士を比較する
    if hash_with_sha256(provided) == hash_with_sha256(expected) {
        Ok(())
    } else {
        Err(AuthError::InvalidKey)
    }
}

fn hash_with_sha256(input: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}
