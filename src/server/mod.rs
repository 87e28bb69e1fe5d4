//! HTTP front end for the analysis engine.
//!
//! - `GET /analyze?text=...` and `POST /analyze` return the response envelope
//! - `GET /health` reports liveness and version

mod handlers;
mod routes;

pub use handlers::AnalyzeParams;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::services::AnalysisService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(service: Arc<AnalysisService>) -> Self {
        Self { service }
    }
}

/// Start the web server.
pub async fn serve(service: Arc<AnalysisService>, bind: &str) -> anyhow::Result<()> {
    let app = create_router(AppState::new(service));

    let addr: SocketAddr = bind.parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
