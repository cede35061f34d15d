//! # QuillSign Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client implementations (envelope API, geo-IP lookup)
//! - Filesystem asset resolution for bundled documents
//! - Platform code (system browser launcher)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `quillsign-core` and `quillsign-common`
//! - Contains all "impure" code (I/O, platform APIs)

pub mod assets;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod platform;
pub mod signing;

// Re-export commonly used items
pub use assets::FsAssetResolver;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use integrations::GeoIpClient;
pub use platform::SystemBrowserLauncher;
pub use signing::EnvelopeApiClient;
