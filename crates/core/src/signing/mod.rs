//! Envelope signing
//!
//! [`SigningService`] turns a recipient and a bundled document into an
//! envelope definition and hands it to an [`EnvelopeGateway`]. Locating the
//! document and talking to the API are ports implemented in
//! `quillsign-infra`.

pub mod definition;
pub mod ports;
pub mod service;

pub use definition::EnvelopeDefinition;
pub use ports::{AssetResolver, EnvelopeGateway};
pub use service::SigningService;
