//! HTTP surface: health check and conversion endpoint.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tracing::info;

use crate::handler::{Converter, HTML_REQUIRED};
use crate::types::ConvertRequest;
use crate::{H2pError, Result};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: &'static str,
    status_code: u16,
}

pub fn build_router(converter: Converter) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert))
        .with_state(converter)
}

async fn health() -> Json<HealthResponse> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(HealthResponse {
        status: "OK",
        timestamp,
    })
}

async fn convert(
    State(converter): State<Converter>,
    Json(request): Json<ConvertRequest>,
) -> Response {
    if request.html().is_none() {
        let body = ErrorResponse {
            error: HTML_REQUIRED,
            status_code: 400,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let envelope = converter.handle(&request).await;
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

/// Serve until Ctrl-C/SIGTERM, then shut the browser down.
pub async fn serve(converter: Converter, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "HTML to PDF converter listening");
    info!("health check: http://{local}/health");
    info!("convert endpoint: POST http://{local}/convert");

    let manager = converter.renderer().manager().clone();
    let result = axum::serve(listener, build_router(converter))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| H2pError::Config(format!("server error: {err}")));

    manager.shutdown().await;
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
