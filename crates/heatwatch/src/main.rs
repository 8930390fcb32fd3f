use anyhow::anyhow;
use axum::serve;
use futures::TryFutureExt;
use heatwatch::{app, build_app_state, get_config_info, get_log_level, setup_logger, Database};
use log::{error, info};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info()?;
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("heatwatch", log_level)
        .level_for("sqlx", log::LevelFilter::Warn.min(log_level))
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let db_dir = cli.db_dir();
    let db = Arc::new(
        Database::new(&db_dir)
            .await
            .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?,
    );

    let app_state = build_app_state(&cli, db.clone()).await.map_err(|e| {
        error!("error building app: {}", e);
        e
    })?;

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", cli.host(), cli.port()))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    let settings = &app_state.settings;
    info!("Heatwatch listening on http://{}", socket_addr);
    info!("  API docs: http://{}/docs", socket_addr);
    info!("  Database: {}", db_dir);
    info!("  Static files: {}", app_state.static_dir);
    info!(
        "  Forecast model: {} {} (timeout {:?})",
        cli.forecast_program(),
        cli.forecast_script(),
        cli.forecast_timeout()
    );
    info!(
        "  Danger threshold: {} °C, week policy: {:?}, UTC offset: {}",
        settings.danger_threshold, settings.week_policy, settings.utc_offset
    );

    let app = app(app_state);

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.checkpoint().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
