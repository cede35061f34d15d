//! Shared test helpers for `quillsign-core` integration tests.
//!
//! In-memory implementations of the signing ports so tests can focus on
//! behaviour instead of filesystem and HTTP plumbing.

pub mod ports;
