//! Wire types for the ValueSet API.
//!
//! # Design
//! Request bodies are FHIR `Parameters` resources carrying only string
//! values. Optional arguments are `Option`s until the envelope is built; an
//! absent value drops its entry entirely instead of serializing as `null`.
//! Response bodies stay as `serde_json::Value` because the service's
//! resources are returned to the caller as-is.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource type tag of every POST body.
pub const PARAMETERS_RESOURCE_TYPE: &str = "Parameters";

/// One `{name, valueString}` entry of a `Parameters` envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "valueString")]
    pub value_string: String,
}

/// The JSON body of every POST request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameters {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    pub parameter: Vec<Parameter>,
}

impl Parameters {
    /// Build an envelope from `(name, value)` pairs, keeping supplied order
    /// and skipping every pair whose value is `None`.
    pub fn from_named<I, N>(named: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<String>)>,
        N: Into<String>,
    {
        let parameter = named
            .into_iter()
            .filter_map(|(name, value)| {
                value.map(|value_string| Parameter {
                    name: name.into(),
                    value_string,
                })
            })
            .collect();
        Self {
            resource_type: PARAMETERS_RESOURCE_TYPE.to_string(),
            parameter,
        }
    }
}

/// A ValueSet version number. Built from an integer or a string through the
/// `From` impls, and always sent as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i32> for Version {
    fn from(v: i32) -> Self {
        Self(v.to_string())
    }
}

impl From<i64> for Version {
    fn from(v: i64) -> Self {
        Self(v.to_string())
    }
}

impl From<u32> for Version {
    fn from(v: u32) -> Self {
        Self(v.to_string())
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<&str> for Version {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for Version {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Outcome of one completed call.
///
/// `body` is `Some` exactly when `status` is 200. Any other status leaves it
/// `None`; the status is the only diagnostic the service gives.
#[derive(Debug, Clone, PartialEq)]
pub struct TermResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl TermResponse {
    pub fn is_success(&self) -> bool {
        self.body.is_some()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}
