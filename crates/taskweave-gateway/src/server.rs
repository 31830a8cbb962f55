use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use taskweave_agents::AgentRegistry;
use taskweave_core::config::ServerConfig;
use taskweave_engine::ExecutionEngine;
use taskweave_tools::ToolRegistry;

use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    config: ServerConfig,
    engine: Arc<ExecutionEngine>,
    agents: Arc<AgentRegistry>,
    tools: Arc<ToolRegistry>,
}

impl GatewayServer {
    pub fn new(
        config: ServerConfig,
        engine: Arc<ExecutionEngine>,
        agents: Arc<AgentRegistry>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            config,
            engine,
            agents,
            tools,
        }
    }

    /// Build the router; exposed separately so tests can drive it.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            engine: self.engine.clone(),
            agents: self.agents.clone(),
            tools: self.tools.clone(),
        });

        Router::new()
            .route("/", get(routes::root))
            .route("/health", get(routes::health))
            .route("/agents", get(routes::list_agents))
            .route("/tools", get(routes::list_tools))
            .route("/workflows", post(routes::execute_workflow))
            .route("/workflows/{id}", get(routes::get_workflow))
            .route("/workflows/{id}/cancel", post(routes::cancel_workflow))
            .route("/workflows/templates/{name}", get(routes::get_template))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the gateway until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let app = self.router();

        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        info!(bind = %self.config.bind_addr(), "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}
