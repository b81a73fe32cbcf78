use anyhow::{Context, Result};
use heroes_api::{Database, app, config::AppConfig, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to load application configuration")?;
    logging::init_tracing(config.log_format, config.database.echo)
        .context("failed to build the log filter")?;

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    db.ensure_schema()
        .await
        .context("failed to create hero tables")?;
    info!(backend = db.backend().as_str(), "connected database and created tables");

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "heroes api is ready");

    app::serve(listener, db, async {
        let signal = shutdown_signal().await;
        info!(signal, "shutting down, draining in-flight requests");
    })
    .await
    .context("server error")?;

    info!("heroes api stopped");

    Ok(())
}

/// Resolves with the name of the first termination signal received.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                error!(error = %err, "unable to listen for Ctrl+C");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        signal = ctrl_c => signal,
        signal = terminate => signal,
    }
}
