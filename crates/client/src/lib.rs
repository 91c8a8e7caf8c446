//! HTTP client for the Scribe transcription service
//!
//! The client owns a bearer token pair, persists it through a pluggable
//! [`scribe_core::store::SessionStore`], and retries a request once after
//! transparently refreshing an expired access token.

pub mod client;

pub use client::envelope::ApiEnvelope;
pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder};
