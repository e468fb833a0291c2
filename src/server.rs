//! Accept loop over hyper's HTTP/1 connection builder, so that connection-level bounds
//! (header read / idle keep-alive) from [`ServerConfig`] apply alongside the per-request
//! timeout layer.

use crate::config::ServerConfig;
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;

/// HTTP/1 connection settings. The header-read timer also runs while a keep-alive
/// connection waits for its next request, so it is the idle bound too.
pub fn connection_builder(config: &ServerConfig) -> http1::Builder {
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(config.idle_timeout())
        .keep_alive(config.keep_alive);
    builder
}

/// Serve `app` until `shutdown` resolves, then give open connections up to the request
/// timeout to finish.
pub async fn serve<F>(listener: TcpListener, app: Router, config: &ServerConfig, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let builder = connection_builder(config);
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                };
                let service = TowerToHyperService::new(app.clone());
                let conn = graceful.watch(builder.serve_connection(TokioIo::new(stream), service));
                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        tracing::debug!(peer = %peer, error = %e, "connection ended with error");
                    }
                });
            }
            _ = &mut shutdown => break,
        }
    }

    drop(listener);
    tokio::select! {
        _ = graceful.shutdown() => {}
        _ = tokio::time::sleep(config.request_timeout()) => {
            tracing::warn!("connections still open at shutdown deadline");
        }
    }
    Ok(())
}
