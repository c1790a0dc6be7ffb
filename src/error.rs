// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for crobot

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrobotError>;

/// Crate-level failures outside of an audit run.
#[derive(Error, Debug)]
pub enum CrobotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rule catalog error: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to acquire a rendered page.
///
/// The `Display` text of this error becomes the details of the single
/// `Error` finding an audit returns when fetching fails.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("timed out after {}s fetching {url}", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not HTML (content-type: {content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("render failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page at {url} is empty")]
    Empty { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_reports_seconds() {
        let err = FetchError::Timeout {
            url: "https://shop.example".to_string(),
            timeout: Duration::from_secs(20),
        };
        assert_eq!(err.to_string(), "timed out after 20s fetching https://shop.example");
    }

    #[test]
    fn test_config_error_display() {
        let err = CrobotError::Config("bad threshold".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad threshold");
    }
}
