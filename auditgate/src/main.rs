//! auditgate Server Entry Point

use auditgate::cli::{serve::ServeArgs, Cli, Commands};
use auditgate::logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to build Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Db(args)) => {
            if let Err(e) = logging::init_stdout() {
                eprintln!("Warning: failed to initialize logging: {}", e);
            }
            runtime.block_on(auditgate::cli::db::execute(&args))
        }
        Some(Commands::Serve(args)) => runtime.block_on(auditgate::cli::serve::execute(args)),
        None => match ServeArgs::from_env() {
            Ok(args) => runtime.block_on(auditgate::cli::serve::execute(args)),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
