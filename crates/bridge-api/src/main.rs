//! 터미널 브리지 API 서버.
//!
//! 설정을 읽어 터미널 커넥터를 준비하고 Axum REST 서버를 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bridge_core::{init_logging, AppConfig, PaperTerminal, TerminalConnector};
use tracing::{error, info, warn};

use bridge_api::{create_router, AppState};

/// 설정된 픽스처 파일로 페이퍼 터미널을 생성합니다.
///
/// 파일이 없거나 읽을 수 없으면 계좌 없는 터미널로 시작합니다.
fn create_connector(config: &AppConfig) -> Arc<dyn TerminalConnector> {
    let terminal = match &config.terminal.fixture_path {
        Some(path) => PaperTerminal::from_file(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load paper accounts, starting empty");
            PaperTerminal::empty()
        }),
        None => {
            warn!("No terminal fixture configured, every login will be rejected");
            PaperTerminal::empty()
        }
    };

    Arc::new(terminal)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("Failed to load configuration")?;

    init_logging(config.logging.to_log_config())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting terminal bridge server...");

    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "Invalid socket address. Check BRIDGE__SERVER__HOST and BRIDGE__SERVER__PORT"
        );
        e
    })?;

    let connector = create_connector(&config);
    let state = Arc::new(AppState::new(connector, config.terminal.history_start));

    info!(
        version = %state.version,
        terminal = state.gateway.name(),
        history_start = %state.history_start,
        "Application state initialized"
    );

    let app = create_router(
        Arc::clone(&state),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "Bridge server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown initiated, releasing terminal...");
    state.gateway.disconnect().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
