//! # QuillSign Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Envelope construction and submission rules
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Depends only on `quillsign-common` and `quillsign-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits

pub mod signing;

pub use signing::definition::EnvelopeDefinition;
pub use signing::ports::{AssetResolver, EnvelopeGateway};
pub use signing::SigningService;
