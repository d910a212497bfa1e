use ingredient_recognition::config::AppConfig;
use ingredient_recognition::logging::Logger;
use ingredient_recognition::{build_state, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::from_env();
    let config = AppConfig::load()?;

    let state = build_state(&config, logger.clone()).await?;
    let app = routes::app(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    logger.info(format_args!("Listening on {}", listener.local_addr()?));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await?;

    logger.info(format_args!("Server stopped"));
    logger.flush();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal(logger: Logger) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger.error(format_args!("Failed to listen for Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    logger.info(format_args!("Shutdown signal received, starting graceful shutdown"));
}
