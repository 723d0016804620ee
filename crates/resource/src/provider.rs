//! The `ResourceProvider` seam through which image sources are fetched.
//!
//! Style compilation never reads files or sockets itself. It hands the
//! `src` of an image symbol to a provider, which may be backed by memory,
//! the filesystem, or anything else a host application supplies.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{src}': {message}")]
    LoadFailed { src: String, message: String },

    #[error("Could not decode image '{src}': {message}")]
    Decode { src: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Raw resource bytes, shared without copying.
pub type SharedResourceData = Arc<Vec<u8>>;

/// Fetches resource bytes by source string.
///
/// Providers are shared across threads: texture loads call `load` from a
/// background thread while compilation continues on the caller's.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError>;

    fn exists(&self, src: &str) -> bool;

    /// A short name used in log output.
    fn name(&self) -> &'static str;
}

/// A provider over a map of pre-registered resources.
///
/// An image symbol whose `src` was never registered fails to load, but
/// compilation of its style still succeeds.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `src`, replacing any earlier entry.
    pub fn insert(&self, src: impl Into<String>, data: Vec<u8>) {
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(src.into(), Arc::new(data));
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_resource(self, src: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(src, data);
        self
    }

    pub fn remove(&self, src: &str) -> Option<SharedResourceData> {
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(src)
    }

    pub fn len(&self) -> usize {
        self.resources.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, src: &str) -> Result<SharedResourceData, ResourceError> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(src)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(src.to_string()))
    }

    fn exists(&self, src: &str) -> bool {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(src)
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_load() {
        let provider = InMemoryResourceProvider::new().with_resource("icons/pin.png", vec![1, 2, 3]);
        assert_eq!(&*provider.load("icons/pin.png").unwrap(), &[1, 2, 3]);
        assert!(provider.exists("icons/pin.png"));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_missing_resource() {
        let provider = InMemoryResourceProvider::new();
        assert_eq!(
            provider.load("nope.png"),
            Err(ResourceError::NotFound("nope.png".to_string()))
        );
        assert!(provider.is_empty());
    }

    #[test]
    fn test_replace_and_remove() {
        let provider = InMemoryResourceProvider::new();
        provider.insert("a", b"old".to_vec());
        provider.insert("a", b"new".to_vec());
        assert_eq!(&*provider.load("a").unwrap(), b"new");
        assert_eq!(provider.remove("a").as_deref().map(Vec::as_slice), Some(&b"new"[..]));
        assert!(!provider.exists("a"));
        assert!(provider.remove("a").is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ResourceError::Decode {
            src: "pin.png".to_string(),
            message: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "Could not decode image 'pin.png': bad header");
        let io: ResourceError = std::io::Error::other("disk gone").into();
        assert!(matches!(io, ResourceError::Io(_)));
    }
}
