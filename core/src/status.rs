//! Status classification.
//!
//! # Design
//! `classify` is a pure function from status code to band. `observe` is the
//! single place a response's band is reported (through `tracing`); it takes
//! the response by reference so it cannot alter what normalization sees.

use tracing::{debug, warn};

use crate::http::HttpResponse;

/// Coarse category of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBand {
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 400, usually a validation failure.
    Validation,
    /// 401 or 403
    Auth,
    /// 404
    NotFound,
    /// 500 and above
    ServerError,
    /// 1xx and the 4xx codes without a band of their own.
    Unclassified,
}

impl StatusBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBand::Success => "success",
            StatusBand::Redirect => "redirect",
            StatusBand::Validation => "validation",
            StatusBand::Auth => "auth",
            StatusBand::NotFound => "not_found",
            StatusBand::ServerError => "server_error",
            StatusBand::Unclassified => "unclassified",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusBand::Validation | StatusBand::Auth | StatusBand::NotFound | StatusBand::ServerError
        )
    }
}

pub fn classify(status: u16) -> StatusBand {
    match status {
        200..=299 => StatusBand::Success,
        300..=399 => StatusBand::Redirect,
        400 => StatusBand::Validation,
        401 | 403 => StatusBand::Auth,
        404 => StatusBand::NotFound,
        500.. => StatusBand::ServerError,
        _ => StatusBand::Unclassified,
    }
}

/// Report the response's band and hand it back untouched.
pub fn observe(response: &HttpResponse) -> StatusBand {
    let band = classify(response.status);
    let content_type = response.content_type().unwrap_or("");
    if band.is_error() {
        warn!(status = response.status, band = band.as_str(), content_type, "error status");
    } else {
        debug!(status = response.status, band = band.as_str(), content_type, "response status");
    }
    band
}
