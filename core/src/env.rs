//! Process configuration boundary: is this a development build?
//!
//! The dispatcher asks once per call and never caches the answer, so a
//! `ProcessEnvironment` picks up changes to the variable between calls.

use crate::config::DispatcherConfig;

/// Source of the development/production flag.
pub trait Environment: Send + Sync {
    fn is_development(&self) -> bool;
}

/// Reads a process environment variable on every call.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    var: String,
    development_value: String,
}

impl ProcessEnvironment {
    pub fn new(var: impl Into<String>, development_value: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            development_value: development_value.into(),
        }
    }

    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self::new(&config.environment_var, &config.development_value)
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::from_config(&DispatcherConfig::default())
    }
}

impl Environment for ProcessEnvironment {
    fn is_development(&self) -> bool {
        std::env::var(&self.var).is_ok_and(|v| v == self.development_value)
    }
}

/// Constant answer, for tests and embedders that decide at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEnvironment {
    pub development: bool,
}

impl FixedEnvironment {
    pub fn development() -> Self {
        Self { development: true }
    }

    pub fn production() -> Self {
        Self { development: false }
    }
}

impl Environment for FixedEnvironment {
    fn is_development(&self) -> bool {
        self.development
    }
}
