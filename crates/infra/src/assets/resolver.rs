//! Filesystem [`AssetResolver`]
//!
//! Documents ship in an `assets/` directory beside the installed
//! application. Packaged builds keep it one level above the application
//! path, development checkouts two levels above, so both are probed in that
//! order and the first readable file wins.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use quillsign_core::signing::ports::AssetResolver;
use quillsign_domain::{QuillSignError, Result};
use tracing::debug;

use crate::errors::InfraError;

const ASSETS_DIR: &str = "assets";
const CANDIDATE_PARENTS: [&str; 2] = ["..", "../.."];

#[derive(Debug, Clone)]
pub struct FsAssetResolver {
    base: PathBuf,
    roots: Vec<PathBuf>,
}

impl FsAssetResolver {
    /// Resolver rooted at an application path, probing `../assets` then
    /// `../../assets`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let roots = CANDIDATE_PARENTS.iter().map(|parent| base.join(parent).join(ASSETS_DIR)).collect();
        Self { base, roots }
    }

    /// Resolver rooted at the running executable's directory.
    ///
    /// # Errors
    /// Returns [`QuillSignError::Platform`] if the executable path is unknown.
    pub fn from_current_exe() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| QuillSignError::from(InfraError::from(e)))?;
        let dir = exe
            .parent()
            .ok_or_else(|| QuillSignError::Platform("executable has no parent directory".into()))?;
        Ok(Self::new(dir))
    }

    /// Resolver with an explicit, ordered list of asset directories.
    pub fn with_roots(base: impl Into<PathBuf>, roots: Vec<PathBuf>) -> Self {
        Self { base: base.into(), roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Only bare file names are looked up; anything with a directory part is not
/// an asset.
fn is_plain_file_name(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

#[async_trait]
impl AssetResolver for FsAssetResolver {
    async fn locate(&self, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) {
            debug!(file_name, "asset name is not a plain file name");
            return None;
        }

        for root in &self.roots {
            let candidate = root.join(file_name);
            match tokio::fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => match tokio::fs::File::open(&candidate).await {
                    Ok(_) => return Some(candidate),
                    Err(e) => {
                        debug!(path = %candidate.display(), error = %e, "asset candidate not readable");
                    }
                },
                _ => debug!(path = %candidate.display(), "asset candidate missing"),
            }
        }
        None
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| InfraError::from(e).into())
    }

    fn base_path(&self) -> String {
        self.base.display().to_string()
    }
}
