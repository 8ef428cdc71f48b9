//! serve サブコマンド
//!
//! 設定を読み込み、監査ログの出力先を準備してサーバーを起動します。

use crate::common::error::ConfigError;
use crate::config::{
    get_env_or, get_env_parse, AppConfig, DEFAULT_LOGS_DIR, LOGS_DIR_ENV,
};
use crate::{bootstrap, logging, server};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// デフォルトの待受ポート
pub const DEFAULT_PORT: u16 = 8899;
/// デフォルトの待受アドレス
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "AUDITGATE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = DEFAULT_HOST, env = "AUDITGATE_HOST")]
    pub host: String,

    /// Directory for the audit sequence file and store
    #[arg(long, default_value = DEFAULT_LOGS_DIR, env = LOGS_DIR_ENV)]
    pub logs_dir: PathBuf,
}

impl ServeArgs {
    /// サブコマンド省略時の引数を環境変数から組み立てる
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: get_env_parse("AUDITGATE_PORT", DEFAULT_PORT)?,
            host: get_env_or("AUDITGATE_HOST", DEFAULT_HOST),
            logs_dir: PathBuf::from(get_env_or(LOGS_DIR_ENV, DEFAULT_LOGS_DIR)),
        })
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Execute the serve command
///
/// APIキーまたはJWTシークレットが未設定の場合はサーバーを起動せずにエラーを返す。
pub async fn execute(args: ServeArgs) -> Result<(), anyhow::Error> {
    let mut config = AppConfig::from_env()?;
    config.logs_dir = args.logs_dir.clone();

    let _guard = logging::init(&config.logs_dir)?;

    info!("auditgate v{}", env!("CARGO_PKG_VERSION"));
    info!(
        api_key_len = config.api_key.len(),
        jwt_secret_len = config.jwt_secret.len(),
        "Credentials loaded"
    );

    let state = bootstrap::initialize(config, args.port).await?;
    server::run(state, &args.bind_addr()).await?;
    Ok(())
}
