use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::rt::TokioTimer;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;

/// HTTP/1.1 builder shared by every accepted connection.
///
/// The header read timer doubles as the keep-alive idle timeout: a connection
/// that does not deliver a complete request head in time is closed.
fn http1_builder(idle_timeout: Duration) -> http1::Builder {
    let mut builder = http1::Builder::new();
    builder
        .keep_alive(true)
        .timer(TokioTimer::new())
        .header_read_timeout(idle_timeout);
    builder
}

/// Serve `router` on `listener` until `shutdown` resolves, then wait for open
/// connections to finish their in-flight requests.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    idle_timeout: Duration,
    shutdown: impl Future<Output = ()>,
) {
    let builder = http1_builder(idle_timeout);
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::error!("TCP accept error: {}", e);
                        continue;
                    }
                };
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
                }

                let service = TowerToHyperService::new(router.clone());
                let connection =
                    graceful.watch(builder.serve_connection(TokioIo::new(stream), service));

                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        if e.is_timeout() {
                            tracing::debug!(peer = %peer, "Idle connection closed");
                        } else if !e.is_incomplete_message() && !e.is_canceled() && !e.is_closed() {
                            tracing::debug!(peer = %peer, "Connection error: {}", e);
                        }
                    }
                });
            }
        }
    }

    drop(listener);
    tracing::info!("Draining open connections");
    graceful.shutdown().await;
}
