//! auditgate Server
//!
//! 二要素認証つきの `/process` エンドポイントと、受理したリクエストを
//! シーケンスファイルとSQLiteストアに二重記録する監査ログ

#![warn(missing_docs)]

/// 共通型定義
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 認証（APIキー + JWT）
pub mod auth;

/// 監査ログ
pub mod audit;

/// サーバー初期化
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// アクションディスパッチャー
pub mod dispatch;

/// ロギング初期化ユーティリティ
pub mod logging;

/// リクエスト処理の本体
pub mod orchestrator;

/// axumサーバー起動
pub mod server;

use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 認証用シークレットとパス設定
    pub config: Arc<config::AppConfig>,
    /// リクエストオーケストレーター
    pub orchestrator: orchestrator::Orchestrator,
    /// 待受ポート
    pub port: u16,
}
