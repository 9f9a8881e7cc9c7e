//! Request dispatcher: binds a method, builds the request, sends it, and
//! normalizes whatever comes back.
//!
//! # Design
//! `Dispatcher` is created once and hands out `RequestFn` values, one per
//! method. A `RequestFn` holds only shared, immutable handles to the
//! transport and the environment; every call builds its own
//! `RequestDescriptor`, so any number of calls may run concurrently. The
//! `build` step is pure and can be tested without a transport, mirroring the
//! `normalize` step on the way back.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DispatcherConfig;
use crate::env::{Environment, ProcessEnvironment};
use crate::error::FetchError;
use crate::http::{HttpMethod, RequestDescriptor, RequestMode};
use crate::result::{normalize, FetchResult};
use crate::status::observe;
use crate::transport::{Transport, UreqTransport};

/// Factory for method-bound request functions.
#[derive(Debug)]
pub struct Dispatcher<T, E> {
    transport: Arc<T>,
    env: Arc<E>,
}

impl<T, E> Clone for Dispatcher<T, E> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            env: Arc::clone(&self.env),
        }
    }
}

impl Dispatcher<UreqTransport, ProcessEnvironment> {
    /// ureq transport with the mode read from the process environment.
    pub fn standard(config: &DispatcherConfig) -> Self {
        Self::new(UreqTransport::new(config), ProcessEnvironment::from_config(config))
    }
}

impl<T: Transport, E: Environment> Dispatcher<T, E> {
    pub fn new(transport: T, env: E) -> Self {
        Self {
            transport: Arc::new(transport),
            env: Arc::new(env),
        }
    }

    /// Request function bound to `method`. Nothing is sent until it is called.
    pub fn bind(&self, method: HttpMethod) -> RequestFn<T, E> {
        RequestFn {
            method,
            transport: Arc::clone(&self.transport),
            env: Arc::clone(&self.env),
        }
    }

    pub fn get(&self) -> RequestFn<T, E> {
        self.bind(HttpMethod::Get)
    }

    pub fn post(&self) -> RequestFn<T, E> {
        self.bind(HttpMethod::Post)
    }

    pub fn put(&self) -> RequestFn<T, E> {
        self.bind(HttpMethod::Put)
    }

    pub fn patch(&self) -> RequestFn<T, E> {
        self.bind(HttpMethod::Patch)
    }

    pub fn delete(&self) -> RequestFn<T, E> {
        self.bind(HttpMethod::Delete)
    }
}

/// A request function bound to one HTTP method.
#[derive(Debug)]
pub struct RequestFn<T, E> {
    method: HttpMethod,
    transport: Arc<T>,
    env: Arc<E>,
}

impl<T, E> Clone for RequestFn<T, E> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            transport: Arc::clone(&self.transport),
            env: Arc::clone(&self.env),
        }
    }
}

impl<T: Transport, E: Environment> RequestFn<T, E> {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Build the request for `data` without sending it.
    ///
    /// Data serializing to JSON `null` is treated as no data.
    pub fn build<D: Serialize + ?Sized>(&self, data: Option<&D>) -> Result<RequestDescriptor, FetchError> {
        let body = match data {
            Some(data) => Some(serde_json::to_string(data).map_err(FetchError::Serialize)?),
            None => None,
        }
        .filter(|text| text != "null");
        Ok(RequestDescriptor {
            method: self.method,
            headers: Vec::new(),
            mode: RequestMode::for_environment(self.env.as_ref()),
            body,
        })
    }

    /// Perform one round-trip.
    ///
    /// Any response, whatever its status or body, comes back as `Ok`. `Err`
    /// means the payload could not be serialized or the transport produced no
    /// response; the transport's error is returned unchanged.
    pub async fn call<D: Serialize + ?Sized>(&self, url: &str, data: Option<&D>) -> Result<FetchResult, FetchError> {
        let request = self.build(data)?;
        debug!(
            method = %self.method,
            url,
            mode = request.mode.as_str(),
            has_body = request.body.is_some(),
            "dispatching request"
        );

        let response = match self.transport.send(url, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %self.method, url, error = %e, "transport failed");
                return Err(e.into());
            }
        };

        observe(&response);
        let result = normalize(response);
        debug!(method = %self.method, url, ok = result.ok, status = result.status, "request finished");
        Ok(result)
    }

    /// `call` without data.
    pub async fn send(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.call::<Value>(url, None).await
    }

    /// `call` with a JSON payload.
    pub async fn send_json<D: Serialize + ?Sized>(&self, url: &str, data: &D) -> Result<FetchResult, FetchError> {
        self.call(url, Some(data)).await
    }
}
