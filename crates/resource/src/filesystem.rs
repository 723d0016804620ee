//! Loads image sources from a directory on disk.
//!
//! Sources are resolved under a root directory. Absolute sources and sources
//! that climb out of the root with `..` are refused.

use crate::provider::{ResourceError, ResourceProvider, SharedResourceData};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
    /// `None` when the root did not exist at construction time.
    canonical_root: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self { root, canonical_root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `src` to a path inside the root, or `None` if it would escape it.
    fn resolve(&self, src: &str) -> Option<PathBuf> {
        let relative = Path::new(src);
        if relative.is_absolute() {
            return None;
        }

        let joined = self.root.join(relative);
        if let Ok(canonical) = joined.canonicalize()
            && let Some(root) = &self.canonical_root
        {
            return canonical.starts_with(root).then_some(canonical);
        }

        // Not on disk yet, so symlinks cannot be followed; refuse any `..`.
        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }
        Some(joined)
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError> {
        let path = self.resolve(src).ok_or_else(|| ResourceError::LoadFailed {
            src: src.to_string(),
            message: "source resolves outside the resource root".to_string(),
        })?;
        log::debug!("Reading '{}' from {}", src, path.display());

        std::fs::read(&path).map(Arc::new).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound(src.to_string()),
            _ => ResourceError::LoadFailed {
                src: src.to_string(),
                message: e.to_string(),
            },
        })
    }

    fn exists(&self, src: &str) -> bool {
        self.resolve(src).is_some_and(|p| p.is_file())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
