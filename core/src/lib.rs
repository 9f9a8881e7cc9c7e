//! Minimal JSON request helper.
//!
//! # Overview
//! A `Dispatcher` hands out request functions bound to one HTTP method.
//! Calling one builds a request from a URL and optional JSON payload, sends
//! it through a `Transport`, and normalizes the response into a
//! `FetchResult { ok, status, data }`.
//!
//! # Design
//! - Request building and response normalization are pure; only the
//!   `Transport` performs I/O, so both ends are testable as plain data.
//! - No headers are set and the only per-call configuration read is the
//!   development flag, which selects the request mode.
//! - Non-2xx statuses and unparseable bodies are ordinary `FetchResult`s.
//!   Only a transport failure (or an unserializable payload) yields `Err`.

pub mod client;
pub mod config;
pub mod env;
pub mod error;
pub mod http;
pub mod result;
pub mod status;
pub mod transport;

pub use client::{Dispatcher, RequestFn};
pub use config::DispatcherConfig;
pub use env::{Environment, FixedEnvironment, ProcessEnvironment};
pub use error::{FetchError, TransportError};
pub use http::{HttpMethod, HttpResponse, RequestDescriptor, RequestMode};
pub use result::{normalize, FetchResult};
pub use status::{classify, observe, StatusBand};
pub use transport::{Transport, UreqTransport};
