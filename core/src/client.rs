//! Request builder, response parser and blocking client for the ValueSet API.
//!
//! # Design
//! Each operation is split into a pure `build_*` method that produces an
//! `HttpRequest` and the shared `parse_response` that consumes an
//! `HttpResponse`. The operation methods (`info`, `expand`, ...) glue the two
//! together around one `Transport::execute` call.
//!
//! Every call returns its own `TermResponse`. The client additionally keeps
//! the status of the most recent call in a `Cell`, which makes it `!Sync`:
//! sharing one instance across threads requires the caller to synchronize.

use std::cell::Cell;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Parameters, TermResponse, Version};

pub const VALUE_SET: &str = "/ValueSet";
pub const EXPAND: &str = "/ValueSet/$expand";
pub const LOOKUP: &str = "/ValueSet/$lookup";
pub const VALIDATE_CODE: &str = "/ValueSet/$validate-code";

/// Blocking client for an N3 terminology service.
#[derive(Debug)]
pub struct TerminologyClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    last_status: Cell<u16>,
}

impl TerminologyClient<UreqTransport> {
    /// Store `base_url` and `issuer_id` verbatim.
    pub fn new(base_url: &str, issuer_id: &str) -> Self {
        Self::from_config(ClientConfig::new(base_url, issuer_id))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> TerminologyClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            last_status: Cell::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Status of the most recently completed call, or 0 if none completed.
    /// A call that failed in transport leaves the previous value.
    pub fn last_status(&self) -> u16 {
        self.last_status.get()
    }

    /// Metadata of the ValueSet identified by `oid`.
    pub fn info(&self, oid: &str) -> Result<TermResponse, ApiError> {
        self.send(self.build_info(oid))
    }

    /// Codes of the ValueSet, from `version` or the current version.
    pub fn expand(&self, oid: &str, version: Option<Version>) -> Result<TermResponse, ApiError> {
        self.send(self.build_expand(oid, version)?)
    }

    /// Additional properties of the entry with `code`.
    pub fn lookup(
        &self,
        oid: &str,
        code: &str,
        version: Option<Version>,
    ) -> Result<TermResponse, ApiError> {
        self.send(self.build_lookup(oid, code, version)?)
    }

    /// Version list of the ValueSet with service resource id `resource_guid`.
    pub fn history(&self, resource_guid: &str) -> Result<TermResponse, ApiError> {
        self.send(self.build_history(resource_guid))
    }

    /// Whether `code` belongs to the ValueSet.
    pub fn validate(
        &self,
        oid: &str,
        code: &str,
        version: Option<Version>,
    ) -> Result<TermResponse, ApiError> {
        self.send(self.build_validate(oid, code, version)?)
    }

    /// POST `named` as a `Parameters` envelope to `entry_point`.
    pub fn post_json(
        &self,
        entry_point: &str,
        named: Vec<(&str, Option<String>)>,
    ) -> Result<TermResponse, ApiError> {
        self.send(self.build_post(entry_point, named)?)
    }

    /// GET `entry_point` with `_format=json` and `named` as the query.
    pub fn get_json(
        &self,
        entry_point: &str,
        named: Vec<(&str, String)>,
    ) -> Result<TermResponse, ApiError> {
        self.send(self.build_get(entry_point, named))
    }

    fn send(&self, request: HttpRequest) -> Result<TermResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "terminology request");
        let response = self.transport.execute(&request).inspect_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "terminology request failed");
        })?;
        self.last_status.set(response.status);
        tracing::debug!(url = %request.url, status = response.status, "terminology response");
        parse_response(response)
    }
}

impl<T> TerminologyClient<T> {
    pub fn build_info(&self, oid: &str) -> HttpRequest {
        self.build_get(VALUE_SET, vec![("url", system_uri(oid))])
    }

    pub fn build_expand(
        &self,
        oid: &str,
        version: Option<Version>,
    ) -> Result<HttpRequest, ApiError> {
        self.build_post(
            EXPAND,
            vec![
                ("system", Some(system_uri(oid))),
                ("version", version.map(|v| v.to_string())),
            ],
        )
    }

    pub fn build_lookup(
        &self,
        oid: &str,
        code: &str,
        version: Option<Version>,
    ) -> Result<HttpRequest, ApiError> {
        self.build_post(LOOKUP, coded_params(oid, code, version))
    }

    pub fn build_history(&self, resource_guid: &str) -> HttpRequest {
        self.build_get(&format!("{VALUE_SET}/{resource_guid}/_history"), Vec::new())
    }

    pub fn build_validate(
        &self,
        oid: &str,
        code: &str,
        version: Option<Version>,
    ) -> Result<HttpRequest, ApiError> {
        self.build_post(VALIDATE_CODE, coded_params(oid, code, version))
    }

    pub fn build_post(
        &self,
        entry_point: &str,
        named: Vec<(&str, Option<String>)>,
    ) -> Result<HttpRequest, ApiError> {
        let envelope = Parameters::from_named(named);
        let body = serde_json::to_string(&envelope)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(entry_point),
            query: Vec::new(),
            headers: self.headers(),
            body: Some(body),
        })
    }

    pub fn build_get(&self, entry_point: &str, named: Vec<(&str, String)>) -> HttpRequest {
        let query = std::iter::once(("_format".to_string(), "json".to_string()))
            .chain(named.into_iter().map(|(k, v)| (k.to_string(), v)))
            .collect();
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(entry_point),
            query,
            headers: self.headers(),
            body: None,
        }
    }

    fn url(&self, entry_point: &str) -> String {
        format!("{}{entry_point}", self.config.base_url)
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("N3 {}", self.config.issuer_id),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }
}

/// Turn a response into a `TermResponse`: the parsed body on 200, no body
/// on any other status.
pub fn parse_response(response: HttpResponse) -> Result<TermResponse, ApiError> {
    if response.status != 200 {
        return Ok(TermResponse {
            status: response.status,
            body: None,
        });
    }
    let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
        tracing::warn!(error = %e, "terminology response is not JSON");
        ApiError::Decode(e.to_string())
    })?;
    Ok(TermResponse {
        status: response.status,
        body: Some(body),
    })
}

fn system_uri(oid: &str) -> String {
    format!("urn:oid:{oid}")
}

fn coded_params(
    oid: &str,
    code: &str,
    version: Option<Version>,
) -> Vec<(&'static str, Option<String>)> {
    vec![
        ("system", Some(system_uri(oid))),
        ("code", Some(code.to_string())),
        ("version", version.map(|v| v.to_string())),
    ]
}
