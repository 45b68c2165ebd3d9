use anyhow::Context;
use dotenv::dotenv;
use std::env;
use todo_tracker::{SharedData, app_env, db, logging, persistence};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if dotenv().is_err() {
        println!("Starting server without .env file.");
    }

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters.as_ref());

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("the {} environment variable must be set", app_env::DB_URL))?;
    let sqlx_db_connection = db::connect_sqlx(&db_url)
        .await
        .context("connecting to the database")?;
    db::migrate(&sqlx_db_connection)
        .await
        .context("migrating the database schema")?;

    let router = todo_tracker::build_router(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(sqlx_db_connection),
    });

    let listen_address = env::var(app_env::LISTEN_ADDRESS)
        .unwrap_or_else(|_| app_env::DEFAULT_LISTEN_ADDRESS.to_owned());
    let listener = TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("binding to {listen_address}"))?;

    info!("Starting server on {listen_address}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running the server")?;

    info!("Server stopped");
    if let Some(exporters) = otel_exporters {
        exporters.shutdown();
    }

    Ok(())
}

/// Resolves once the process is asked to stop with Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, finishing in-flight requests"),
        Err(err) => {
            warn!("Could not listen for the shutdown signal, server will only stop when killed: {err}");
            std::future::pending::<()>().await
        }
    }
}
