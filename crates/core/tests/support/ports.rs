//! Mock implementations of the signing ports

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use quillsign_core::signing::ports::{AssetResolver, EnvelopeGateway};
use quillsign_core::EnvelopeDefinition;
use quillsign_domain::{ApiDiagnostics, EnvelopeResult, QuillSignError, Result as DomainResult};

/// In-memory asset store keyed by file name.
#[derive(Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
    unreadable: bool,
}

impl MemoryAssets {
    pub fn with_file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.files.insert(name.to_string(), bytes.to_vec());
        self
    }

    /// Files are located but every read fails.
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

#[async_trait]
impl AssetResolver for MemoryAssets {
    async fn locate(&self, file_name: &str) -> Option<PathBuf> {
        self.files.contains_key(file_name).then(|| PathBuf::from("/app/assets").join(file_name))
    }

    async fn read(&self, path: &Path) -> DomainResult<Vec<u8>> {
        if self.unreadable {
            return Err(QuillSignError::Platform("permission denied".into()));
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.files.get(name).cloned().ok_or_else(|| QuillSignError::NotFound(name.to_string()))
    }

    fn base_path(&self) -> String {
        "/app/resources/app".to_string()
    }
}

/// A recorded `create_envelope` call
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub base_uri: String,
    pub account_id: String,
    pub access_token: String,
    pub definition: EnvelopeDefinition,
}

/// Gateway that records calls and answers with a fixed result.
pub struct RecordingGateway {
    response: EnvelopeResult,
    calls: Mutex<Vec<GatewayCall>>,
}

impl RecordingGateway {
    pub fn succeeding(envelope_id: &str) -> Self {
        Self::answering(EnvelopeResult::Success {
            envelope_id: envelope_id.to_string(),
            diagnostics: ApiDiagnostics::default(),
        })
    }

    pub fn answering(response: EnvelopeResult) -> Self {
        Self { response, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EnvelopeGateway for RecordingGateway {
    async fn create_envelope(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
        definition: &EnvelopeDefinition,
    ) -> EnvelopeResult {
        self.calls.lock().push(GatewayCall {
            base_uri: base_uri.to_string(),
            account_id: account_id.to_string(),
            access_token: access_token.to_string(),
            definition: definition.clone(),
        });
        self.response.clone()
    }
}
