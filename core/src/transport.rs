//! Transport boundary and the ureq-backed implementation.
//!
//! # Design
//! The dispatcher only ever sees a `RequestDescriptor` going out and an
//! `HttpResponse` coming back; everything about sockets, TLS and DNS lives
//! behind `Transport`. Any status code is a response, never an error: only a
//! failure to obtain a response at all is a `TransportError`.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::trace;

use crate::config::DispatcherConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpResponse, RequestDescriptor};

/// Sends one request and returns the response as plain data.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, request: RequestDescriptor) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: &str, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        (**self).send(url, request).await
    }
}

/// Blocking ureq agent driven from `spawn_blocking`, or from a dedicated
/// thread when no Tokio runtime is running, so any executor can poll it.
///
/// Headers from the descriptor are forwarded verbatim (the dispatcher always
/// leaves them empty) and no content type is added. The mode tag has no
/// meaning outside a browser and is only logged.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(config: &DispatcherConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .user_agent(config.user_agent.as_str())
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: config.body_limit,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&DispatcherConfig::default())
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, url: &str, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        let url = url.to_string();
        let job = move || execute(&agent, &url, request, body_limit);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle
                .spawn_blocking(job)
                .await
                .map_err(|e| TransportError::Join(e.to_string()))?,
            Err(_) => {
                let (tx, rx) = oneshot::channel();
                thread::Builder::new()
                    .name("fetch-core-ureq".to_string())
                    .spawn(move || {
                        let _ = tx.send(job());
                    })
                    .map_err(|e| TransportError::Io(e.to_string()))?;
                rx.await.map_err(|e| TransportError::Join(e.to_string()))?
            }
        }
    }
}

fn execute(
    agent: &ureq::Agent,
    url: &str,
    request: RequestDescriptor,
    body_limit: u64,
) -> Result<HttpResponse, TransportError> {
    trace!(method = %request.method, url, mode = request.mode.as_str(), "ureq request");

    let mut response = match (request.method, request.body) {
        (HttpMethod::Get, Some(_)) => {
            return Err(TransportError::InvalidRequest(
                "GET request cannot carry a body".to_string(),
            ));
        }
        (HttpMethod::Get, None) => with_headers(agent.get(url), &request.headers).call(),
        (HttpMethod::Delete, None) => with_headers(agent.delete(url), &request.headers).call(),
        (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(url), &request.headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Post, body) => send_with_body(with_headers(agent.post(url), &request.headers), body),
        (HttpMethod::Put, body) => send_with_body(with_headers(agent.put(url), &request.headers), body),
        (HttpMethod::Patch, body) => send_with_body(with_headers(agent.patch(url), &request.headers), body),
    }
    .map_err(map_ureq_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(map_ureq_error)?;

    Ok(HttpResponse { status, headers, body })
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        ureq::Error::HostNotFound => TransportError::HostNotFound(err.to_string()),
        ureq::Error::ConnectionFailed => TransportError::Connection(err.to_string()),
        ureq::Error::BadUri(uri) => TransportError::InvalidUrl(uri),
        ureq::Error::Io(e) if is_connection_error(&e) => TransportError::Connection(e.to_string()),
        ureq::Error::Io(e) => TransportError::Io(e.to_string()),
        other => TransportError::Io(other.to_string()),
    }
}

fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
    )
}
