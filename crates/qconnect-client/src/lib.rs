//! Remote FHIR server client.
//!
//! [`RemoteServerClient`] is bound to one [`qconnect_config::ServerConfig`] and
//! issues relative search paths against it, one at a time or as an ordered
//! concurrent batch. No retries are performed; failures are returned per call.

pub mod client;
pub mod error;

pub use client::{FhirSearch, RemoteServerClient};
pub use error::{ClientError, Result};
