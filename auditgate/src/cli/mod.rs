//! CLI module for auditgate
//!
//! Provides the command-line interface for the server and its audit store.

pub mod db;
pub mod serve;

use clap::{Parser, Subcommand};

/// auditgate - Authenticated process endpoint with a dual-sink audit log
#[derive(Parser, Debug)]
#[command(name = "auditgate")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    API_KEY / AUDITGATE_API_KEY         Static API key (required)
    JWT_SECRET / AUDITGATE_JWT_SECRET   HS256 signing secret (required)
    AUDITGATE_HOST                      Bind address (default: 0.0.0.0)
    AUDITGATE_PORT                      Listen port (default: 8899)
    AUDITGATE_LOGS_DIR                  Audit log directory (default: logs)
    AUDITGATE_LOG_LEVEL                 Log level (default: info)
    AUDITGATE_LOG_FILE                  Operational log file name under the logs directory
"#)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve(serve::ServeArgs),
    /// Audit store maintenance
    Db(db::DbArgs),
}
