//! HTTP surface: `POST /predict` and `GET /health`.

use crate::core::engine::InferenceEngine;
use crate::domain::model::Prediction;
use crate::utils::error::ShimError;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub struct AppState {
    engine: InferenceEngine,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}

/// Every request-scoped failure becomes a 400 carrying the error text.
pub struct ApiError(ShimError);

impl From<ShimError> for ApiError {
    fn from(err: ShimError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_kind: String,
    pub n_features: usize,
    pub started_at: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        // oversized bodies must reach the handler; a 413 would bypass the JSON error
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// The body is taken raw so that a missing or wrong Content-Type, invalid
// JSON and non-object JSON all take the same 400 path.
async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Prediction>, ApiError> {
    match state.engine.predict_body(&body) {
        Ok(prediction) => {
            tracing::debug!("Predicted {}", prediction.prediction);
            Ok(Json(prediction))
        }
        Err(e) => {
            tracing::warn!("Prediction failed: {}", e);
            Err(e.into())
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: true,
        model_kind: state.engine.model().kind().to_string(),
        n_features: state.engine.schema().len(),
        started_at: state.started_at,
    })
}
