//! HTTP request handlers for the analysis API.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::AppState;
use crate::models::{AnalysisResponse, StatusType};

/// `text` parameter, from the query string or a form body.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub text: Option<String>,
}

/// HTTP status for an envelope: 200 on success, 400 on a bad request, 500 otherwise.
fn http_status(response: &AnalysisResponse) -> StatusCode {
    if response.code == StatusType::Success.code() {
        StatusCode::OK
    } else if response.code == StatusType::Error.code() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn analyze(state: AppState, text: Option<String>) -> Response {
    let response = state.service.respond(text.as_deref()).await;
    (http_status(&response), Json(response)).into_response()
}

/// `GET /analyze?text=...`
///
/// An unreadable query string is answered like a missing `text`.
pub async fn analyze_get(
    State(state): State<AppState>,
    params: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Response {
    let text = match params {
        Ok(Query(params)) => params.text,
        Err(rejection) => {
            tracing::debug!("Rejected analyze query: {}", rejection);
            None
        }
    };
    analyze(state, text).await
}

/// `POST /analyze` with a form-encoded `text` field.
pub async fn analyze_post(
    State(state): State<AppState>,
    params: Result<Form<AnalyzeParams>, FormRejection>,
) -> Response {
    let text = match params {
        Ok(Form(params)) => params.text,
        Err(rejection) => {
            tracing::debug!("Rejected analyze form: {}", rejection);
            None
        }
    };
    analyze(state, text).await
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
