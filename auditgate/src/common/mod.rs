//! 共通型定義

/// エラー型
pub mod error;

/// IPアドレス正規化
pub mod ip;

/// リクエスト/レスポンス型
pub mod protocol;
