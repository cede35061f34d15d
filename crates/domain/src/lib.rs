//! # QuillSign Domain
//!
//! Business domain types and models for QuillSign.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures (identity provider, signing, geo-IP)
//! - Envelope request/result types shared by the signing pipeline
//! - Domain constants (API paths, header names, default document)
//!
//! ## Architecture
//! - No dependencies on other QuillSign crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
