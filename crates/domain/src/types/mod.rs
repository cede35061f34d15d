//! Domain types and models

pub mod envelope;

pub use envelope::{
    ApiDiagnostics, DocumentRef, EnvelopeRequest, EnvelopeResult, FailureKind, Recipient,
};
