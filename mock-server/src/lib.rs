//! HTTP peer for exercising the dispatcher over a real socket.
//!
//! Each route produces one response shape normalization has to handle: a
//! parsed JSON body at any status, an empty body, a non-JSON body, and an
//! arbitrarily large body. Request bodies are read as raw bytes because the
//! client sends no content type.

use axum::{
    body::Bytes,
    extract::Path,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

/// Upper bound for `/large/{len}`.
pub const MAX_LARGE_BODY: usize = 64 * 1024 * 1024;

/// Error responses always carry a JSON body so clients can surface it.
#[derive(Debug)]
pub enum ApiError {
    BadStatus(u16),
    TooLarge(usize),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::BadStatus(code) => format!("invalid status code {code}"),
            ApiError::TooLarge(len) => format!("body of {len} bytes exceeds {MAX_LARGE_BODY}"),
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(json_status))
        .route("/empty/{code}", any(empty_status))
        .route("/text/{code}", any(text_status))
        .route("/large/{len}", any(large_body))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// JSON body if it parses, `null` otherwise (including an empty body).
fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn status_code(code: u16) -> Result<StatusCode, ApiError> {
    StatusCode::from_u16(code).map_err(|_| ApiError::BadStatus(code))
}

/// Reflects the method and the parsed body.
async fn echo(method: Method, body: Bytes) -> Json<Value> {
    debug!(%method, len = body.len(), "echo");
    Json(json!({ "method": method.as_str(), "body": parse_body(&body) }))
}

async fn json_status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), ApiError> {
    Ok((status_code(code)?, Json(json!({ "status": code }))))
}

async fn empty_status(Path(code): Path<u16>) -> Result<StatusCode, ApiError> {
    status_code(code)
}

async fn text_status(Path(code): Path<u16>) -> Result<(StatusCode, &'static str), ApiError> {
    Ok((status_code(code)?, "not json"))
}

/// A 200 whose body is one JSON string of exactly `len` bytes.
async fn large_body(Path(len): Path<usize>) -> Result<Json<Value>, ApiError> {
    if len < 2 || len > MAX_LARGE_BODY {
        return Err(ApiError::TooLarge(len));
    }
    Ok(Json(Value::String("x".repeat(len - 2))))
}
