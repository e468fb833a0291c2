use sqlroute::{build_router, config, prepare, server, StartupError};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sqlroute=info,tower_http=info")),
        )
        .init();

    let config = config::from_env()?;
    let addr = config.socket_addr();
    let state = prepare(config.clone()).await?;
    let store = state.store.clone();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await.map_err(StartupError::Serve)?;
    tracing::info!(addr = %addr, "listening");
    server::serve(listener, app, &config, shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
