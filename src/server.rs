//! HTTP front of the service.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/stories/{no_of_stories}` | Best stories, highest score first |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Errors are returned as `{ "error": { "code": "...", "message": "..." } }`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::best_stories::BestStories;
use crate::error::StoryError;
use crate::story::Story;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) best_stories: Arc<BestStories>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stories/{no_of_stories}", get(handle_best_stories))
        .route("/health", get(handle_health))
        .with_state(state)
}

pub(crate) async fn run_server(bind_address: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoryError> for AppError {
    fn from(err: StoryError) -> Self {
        if err.is_upstream() {
            AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "upstream_error",
                message: err.to_string(),
            }
        } else {
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal",
                message: err.to_string(),
            }
        }
    }
}

async fn handle_best_stories(
    State(state): State<AppState>,
    Path(no_of_stories): Path<i64>,
) -> Result<Json<Vec<Story>>, AppError> {
    if no_of_stories <= 0 {
        return Err(AppError {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: format!("noOfStories must be a positive integer, got {no_of_stories}"),
        });
    }

    let n = usize::try_from(no_of_stories).unwrap_or(usize::MAX);
    match state.best_stories.get_best_stories(n).await {
        Ok(stories) => {
            tracing::info!(
                requested = no_of_stories,
                num_stories = stories.len(),
                "Served best stories"
            );
            Ok(Json(stories))
        }
        Err(e) => {
            tracing::error!(error =? e, requested = no_of_stories, "Error getting best stories");
            Err(e.into())
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
