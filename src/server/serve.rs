//! Binding, serving and graceful shutdown.

use {
    super::PageServer,
    crate::Result,
    std::{future::Future, net::SocketAddr, time::Duration},
    tokio::{net::TcpListener, signal, sync::watch},
};

impl<S> PageServer<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Binds to `http.bind_addr:http.bind_port` and serves until SIGTERM or
    /// Ctrl+C.
    ///
    /// # Graceful Shutdown
    ///
    /// Once a signal arrives the server stops accepting connections and waits
    /// for in-flight requests, for at most `http.shutdown_timeout`.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.http.full_bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Bound to {}", &bind_addr);
        self.serve(listener).await
    }

    /// Serves on an already bound listener until SIGTERM or Ctrl+C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let timeout = self.config.http.shutdown_timeout;
        self.serve_with_shutdown(listener, shutdown_signal(timeout))
            .await
    }

    /// Serves until `signal` completes, then drains in-flight requests for
    /// at most `http.shutdown_timeout`.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(routes = self.table.len(), "Waiting for connections");

        let service = self
            .inner
            .with_state(self.state)
            .into_make_service_with_connect_info::<SocketAddr>();

        let shutdown_timeout = self.config.http.shutdown_timeout;
        let (initiated_tx, mut initiated_rx) = watch::channel(false);

        let serve_future = axum::serve(listener, service).with_graceful_shutdown(async move {
            signal.await;
            initiated_tx.send_replace(true);
        });

        // The drain timeout only starts once shutdown has been initiated
        tokio::select! {
            result = serve_future => {
                tracing::info!("Graceful shutdown completed");
                result?;
            }
            _ = async {
                if initiated_rx.wait_for(|initiated| *initiated).await.is_err() {
                    std::future::pending::<()>().await;
                }
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!("Graceful shutdown timeout expired, forcing shutdown");
            }
        }

        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed, logs a warning and waits on the other
/// one only.
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::debug!("Ctrl+C signal received"),
            Err(err) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal_handler) => {
                signal_handler.recv().await;
                tracing::debug!("SIGTERM signal received");
            }
            Err(err) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", err);
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

    tracing::info!(
        "Shutdown signal received, starting graceful shutdown (timeout: {}s)",
        timeout.as_secs()
    );
}
