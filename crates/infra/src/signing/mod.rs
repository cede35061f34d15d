//! Envelope API adapter

pub mod client;
pub mod rate_limit;

pub use client::EnvelopeApiClient;
pub use rate_limit::diagnostics_from_headers;
