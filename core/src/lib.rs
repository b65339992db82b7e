//! Synchronous client for the N3 terminology service's ValueSet API.
//!
//! # Overview
//! `TerminologyClient` shapes requests for the five ValueSet operations
//! (`info`, `expand`, `lookup`, `history`, `validate`), sends each through a
//! blocking [`Transport`], and hands back the parsed JSON body when the
//! service answers 200.
//!
//! # Design
//! - Request building and response parsing are pure (`build_*`,
//!   [`parse_response`]); only the transport touches the network.
//! - A non-200 answer is a [`TermResponse`] without a body, not an error.
//!   [`ApiError`] covers transport failures and undecodable 200 bodies.
//! - One attempt per call. No retries, no caching.
//!
//! ```no_run
//! use n3_term_core::TerminologyClient;
//!
//! let client = TerminologyClient::new("http://nsi.example/fhir", "issuer-guid");
//! let codes = client.expand("1.2.643.5.1.13.13.11.1040", None)?;
//! if let Some(body) = codes.body {
//!     println!("{body}");
//! } else {
//!     eprintln!("service answered {}", codes.status);
//! }
//! # Ok::<(), n3_term_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{parse_response, TerminologyClient};
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Parameter, Parameters, TermResponse, Version};
