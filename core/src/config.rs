//! Client configuration.
//!
//! The core never reads files or the environment; the embedding application
//! supplies a `ClientConfig`, either built in code or deserialized from its
//! own configuration source.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, used verbatim. A trailing slash is not stripped.
    pub base_url: String,
    /// Sent on every request as `Authorization: N3 <issuer_id>`.
    pub issuer_id: String,
    /// Whole-request timeout. `None` leaves the transport without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, issuer_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            issuer_id: issuer_id.into(),
            timeout_ms: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
