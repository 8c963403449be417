mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use murmur_config::Config;
use tower_http::trace::TraceLayer;
use tts::Worker;

/// Assembled job server with its routes and middleware
pub struct Server {
    router: Router,
    worker: Arc<Worker>,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Under the eager init policy the model is loaded here, before any job
    /// is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker cannot be built or the eager model
    /// load fails
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        let worker = tts::build_worker(config)?;
        worker
            .prepare()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to prepare worker: {e}"))?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Job routes
        app = app.merge(tts::endpoint_router().with_state(Arc::clone(&worker)));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            worker,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Shared job worker behind the routes
    #[must_use]
    pub const fn worker(&self) -> &Arc<Worker> {
        &self.worker
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
