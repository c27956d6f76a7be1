use crate::commands::{names, CommandFailure, CommandRouter};
use crate::config::FormhelperConfig;
use crate::database::Database;
use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub commands: CommandRouter,
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Command(CommandFailure),
}

/// Error body returned for every non-2xx answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    kind: "bad_request".into(),
                    message,
                },
            ),
            ApiError::Command(CommandFailure::Internal(err)) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        kind: "internal".into(),
                        message: "internal server error".into(),
                    },
                )
            }
            ApiError::Command(failure) => {
                let status = match &failure {
                    CommandFailure::UnknownCommand(_) | CommandFailure::NotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (
                    status,
                    ErrorResponse {
                        kind: failure.kind().into(),
                        message: failure.to_string(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<CommandFailure> for ApiError {
    fn from(err: CommandFailure) -> Self {
        ApiError::Command(err)
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    commands: &'static [&'static str],
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        commands: names::ALL,
    })
}

async fn invoke_handler(
    State(state): State<AppState>,
    Path(command): Path<String>,
    body: Bytes,
) -> ApiResult<Value> {
    let args = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::BadRequest(format!("request body is not JSON: {err}")))?
    };
    let result = state.commands.dispatch(&command, args)?;
    Ok(Json(result))
}

pub fn build_router(database: Database) -> Router {
    let state = AppState {
        commands: CommandRouter::new(database),
    };
    Router::new()
        .route("/health", get(health_handler))
        .route("/commands/:command", post(invoke_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Tries to bind to the given port, or finds the next available port.
pub async fn bind_listener(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let Some(port) = start_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let bound = listener.local_addr()?.port();
                return Ok((listener, bound));
            }
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "port in use, trying next port");
                }
            }
        }
    }

    anyhow::bail!(
        "could not find available port in range {}-{}",
        start_port,
        start_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
    )
}

pub async fn serve_listener(listener: TcpListener, database: Database) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, build_router(database).into_make_service()).await?;
    Ok(())
}

pub async fn serve_http(config: FormhelperConfig, database: Database) -> Result<()> {
    let (listener, actual_port) = bind_listener(config.api_port).await?;
    if actual_port != config.api_port {
        tracing::warn!(
            requested_port = config.api_port,
            actual_port,
            "configured port was in use, bound to next available port"
        );
    }
    serve_listener(listener, database).await
}
