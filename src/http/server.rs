//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum router with a catch-all gateway handler
//! - Wire up middleware (tracing, request timeout)
//! - Apply live configuration updates to per-request settings
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::gateway::Application;
use crate::http::host::{build_environ, serve_environ, HostSettings};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<dyn Application>,
    pub settings: Arc<ArcSwap<HostSettings>>,
}

/// HTTP server hosting one gateway application.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    settings: Arc<ArcSwap<HostSettings>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig, app: Arc<dyn Application>) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(HostSettings::from(&config)));
        let state = AppState {
            app,
            settings: settings.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            settings,
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            redirect_map = ?self.config.redirect.map,
            "HTTP server starting"
        );

        let settings = self.settings.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let new_settings = HostSettings::from(&new_config);
                tracing::info!(redirect_map = ?new_settings.redirect_map, "Applying reloaded configuration");
                settings.store(Arc::new(new_settings));
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes to the hosted application.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let settings = state.settings.load_full();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        "Dispatching request"
    );

    let environ = build_environ(&request, &settings, &request_id);
    serve_environ(state.app.clone(), environ, request_id).await
}
