//! データベースアクセス層
//!
//! SQLiteベースの監査ログストア

/// 監査ログストア
pub mod requests;

/// データベースマイグレーション
pub mod migrations;
