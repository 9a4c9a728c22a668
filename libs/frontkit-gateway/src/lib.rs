#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Request gateway for the Frontkit web client
//!
//! This crate wraps an HTTP transport with the request-lifecycle management
//! the client needs on every call:
//! - **Duplicate supersession**: concurrent requests with the same
//!   fingerprint (method + URL + query + body) cancel the older in-flight
//!   one, so at most one copy of a logical request is ever live.
//! - **Loading indicator lifecycle**: a reference-counted hold on the global
//!   loading indicator, shown while any tracked request is in flight and
//!   released on every exit path.
//! - **Response normalization**: the backend envelope
//!   `{ code, data, message, success }` is stripped to its payload, and every
//!   failure is translated once into a typed [`GatewayError`] with exactly
//!   one user-facing notification (none for cancellations).
//!
//! Cancellation is modeled as control flow, not failure: a superseded or
//! bulk-cancelled request settles as [`GatewayError::Cancelled`] and stays
//! silent.
//!
//! # Example
//!
//! ```ignore
//! use frontkit_gateway::ApiGateway;
//!
//! let gateway = ApiGateway::builder()
//!     .base_url("https://backend.example.com/api")
//!     .build()?;
//!
//! // Envelope is stripped: callers receive only the payload.
//! let profile: Profile = gateway.get("/profile").send().await?;
//!
//! // Downloads carry the filename parsed from content-disposition.
//! let export = gateway.download("/export").download().await?;
//! std::fs::write(&export.filename, &export.data)?;
//! ```

mod builder;
mod client;
mod config;
mod envelope;
mod error;
mod fingerprint;
mod loading;
mod normalize;
mod notify;
mod pending;
mod request;

pub use builder::{ApiGatewayBuilder, UnauthorizedHook};
pub use client::ApiGateway;
pub use config::{
    BASE_URL_ENV, CredentialPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GatewayConfig,
};
pub use envelope::ApiEnvelope;
pub use error::{BoxError, CancelReason, GatewayError};
pub use normalize::{
    DEFAULT_DOWNLOAD_NAME, DownloadedFile, NOTICE_FORBIDDEN, NOTICE_NETWORK, NOTICE_NOT_FOUND,
    NOTICE_REQUEST_FAILED, NOTICE_SERVER_ERROR, NOTICE_SESSION_EXPIRED,
};
pub use notify::{Notifier, TracingNotifier};
pub use request::RequestBuilder;
