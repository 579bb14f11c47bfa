use crate::fetcher::Fetcher;
use crate::models::{Identifier, MetricSpec, ScraperError};
use crate::report::FETCH_FAILED;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<Fetcher>,
    spec: Arc<MetricSpec>,
}

impl AppState {
    pub fn new(fetcher: Fetcher, spec: MetricSpec) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            spec: Arc::new(spec),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/metrics", get(list_metrics))
        .route("/api/analyze/:isin", get(analyze))
        .with_state(state)
}

async fn list_metrics(State(state): State<AppState>) -> Json<MetricSpec> {
    Json(state.spec.as_ref().clone())
}

async fn analyze(State(state): State<AppState>, Path(isin): Path<String>) -> Response {
    let identifier = match Identifier::new(&isin) {
        Ok(identifier) => identifier,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response()
        }
    };

    match state.fetcher.analyze(&identifier, &state.spec).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("analysis of {} failed: {}", identifier, e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": FETCH_FAILED }))).into_response()
        }
    }
}

pub async fn serve(listen: SocketAddr, state: AppState) -> Result<(), ScraperError> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
