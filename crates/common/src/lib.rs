//! Modular common utilities shared across QuillSign crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: validation framework
//! - `runtime`: async infrastructure (tokio, async-trait)
//! - `platform`: platform integrations (Implicit Grant login, identity
//!   provider client)
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: mock collaborators for the platform tier

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod validation;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "platform", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use validation::{
    EmailValidator, FieldError, FieldValidator, StringValidator, ValidationError,
    ValidationResult, Validator,
};
