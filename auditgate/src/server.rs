//! axumサーバー起動・シャットダウンハンドリング

use crate::AppState;
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

/// axumサーバーを起動し、Ctrl+C / SIGTERM を待機する
pub async fn run(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    serve(state, bind_addr, shutdown_signal()).await
}

/// 任意のシャットダウンシグナルでサーバーを起動する
pub async fn serve<F>(state: AppState, bind_addr: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = crate::api::create_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("auditgate server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
