//! Port interfaces for envelope signing
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quillsign_domain::{EnvelopeResult, Result};

use super::definition::EnvelopeDefinition;

/// Trait for locating documents bundled with the application
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Find the first candidate location holding `file_name`
    async fn locate(&self, file_name: &str) -> Option<PathBuf>;

    /// Read a located document
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Application base path, reported when no candidate holds the file
    fn base_path(&self) -> String;
}

/// Trait for the envelope creation API
///
/// Implementations never fail: every outcome, transport problems included,
/// is reported as an [`EnvelopeResult`].
#[async_trait]
pub trait EnvelopeGateway: Send + Sync {
    /// Create and send an envelope in the given account
    async fn create_envelope(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
        definition: &EnvelopeDefinition,
    ) -> EnvelopeResult;
}
