mod health;

use std::net::SocketAddr;

use axum::Router;
use painter_config::Config;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the image generator cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address;

        let generator = painter_imagegen::build_generator(config)?;
        let store = painter_gallery::build_store(config);

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.route("/api/status", axum::routing::get(health::status_handler));

        // Image generation routes
        app = app.merge(painter_imagegen::endpoint_router().with_state(generator));

        // Image history routes
        app = app.merge(painter_gallery::endpoint_router().with_state(store));

        // Front-end bundle; unknown paths get index.html for client-side routing
        let static_dir = &config.server.static_dir;
        if !static_dir.is_dir() {
            tracing::warn!(static_dir = %static_dir.display(), "static directory not found; front-end will not be served");
        }
        app = app.fallback_service(
            ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html"))),
        );

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
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
