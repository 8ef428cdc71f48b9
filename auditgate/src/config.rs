//! Configuration management via environment variables
//!
//! 起動時に一度だけ読み込み、以降は不変の `AppConfig` として
//! 認証・監査ログの各コンポーネントへ参照で渡す。

use crate::common::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};

/// 静的APIキーの環境変数（優先順）
pub const API_KEY_ENV: &[&str] = &["AUDITGATE_API_KEY", "API_KEY"];
/// JWT署名シークレットの環境変数（優先順）
pub const JWT_SECRET_ENV: &[&str] = &["AUDITGATE_JWT_SECRET", "JWT_SECRET"];
/// ログディレクトリの環境変数
pub const LOGS_DIR_ENV: &str = "AUDITGATE_LOGS_DIR";

/// デフォルトのログディレクトリ
pub const DEFAULT_LOGS_DIR: &str = "logs";
/// シーケンスログファイル名
pub const SEQUENCE_LOG_FILE: &str = "requests.log";
/// SQLiteストアのファイル名
pub const STORE_DB_FILE: &str = "logs.db";

/// Get the first non-empty environment variable among `names`
///
/// # Arguments
/// * `names` - Candidate variable names, in priority order
///
/// # Returns
/// * `Some(value)` - The first candidate that is set and non-empty
/// * `None` - No candidate is set
///
/// # Example
/// ```
/// use auditgate::config::get_env_any;
///
/// let key = get_env_any(&["AUDITGATE_API_KEY", "API_KEY"]);
/// ```
pub fn get_env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Get an environment variable, returning a default value if unset or empty
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env_any(&[name]).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, returning `default` if unset or empty
///
/// A value that is set but cannot be parsed is a `ConfigError::Invalid`.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match get_env_any(&[name]) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: {}", name, value))),
        None => Ok(default),
    }
}

fn required_secret(names: &[&'static str]) -> Result<String, ConfigError> {
    get_env_any(names).ok_or(ConfigError::MissingSecret(names[names.len() - 1]))
}

/// アプリケーション設定（起動後は読み取り専用）
#[derive(Clone)]
pub struct AppConfig {
    /// 静的APIキー
    pub api_key: String,
    /// JWT署名シークレット（HS256）
    pub jwt_secret: String,
    /// 監査ログ・ストアを置くディレクトリ
    pub logs_dir: PathBuf,
}

impl AppConfig {
    /// 値を直接指定して生成
    pub fn new(
        api_key: impl Into<String>,
        jwt_secret: impl Into<String>,
        logs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            jwt_secret: jwt_secret.into(),
            logs_dir: logs_dir.into(),
        }
    }

    /// 環境変数から読み込む
    ///
    /// APIキーまたはJWTシークレットが未設定の場合は `ConfigError::MissingSecret`。
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required_secret(API_KEY_ENV)?;
        let jwt_secret = required_secret(JWT_SECRET_ENV)?;
        let logs_dir = get_env_or(LOGS_DIR_ENV, DEFAULT_LOGS_DIR);
        Ok(Self::new(api_key, jwt_secret, logs_dir))
    }

    /// シーケンスログのパス
    pub fn sequence_log_path(&self) -> PathBuf {
        self.logs_dir.join(SEQUENCE_LOG_FILE)
    }

    /// SQLiteストアのパス
    pub fn store_path(&self) -> PathBuf {
        self.logs_dir.join(STORE_DB_FILE)
    }

    /// SQLiteストアの接続URL
    pub fn database_url(&self) -> String {
        database_url_for(&self.store_path())
    }

    /// ログディレクトリを作成する（存在すれば何もしない）
    pub fn ensure_logs_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.logs_dir)
    }
}

/// ファイルパスからSQLite接続URLを組み立てる
pub fn database_url_for(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"***")
            .field("jwt_secret", &"***")
            .field("logs_dir", &self.logs_dir)
            .finish()
    }
}
