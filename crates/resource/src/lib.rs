//! Resource access for stipple styles.
//!
//! ## Providers
//!
//! - [`InMemoryResourceProvider`]: pre-registered bytes, the default
//! - [`FilesystemResourceProvider`]: files under a root directory
//!
//! Image symbols are loaded through a [`TextureLoader`], which decodes on a
//! background thread and reports progress through a [`TextureHandle`].

mod filesystem;
mod provider;
mod texture;

pub use filesystem::FilesystemResourceProvider;
pub use provider::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
pub use texture::{TextureHandle, TextureImage, TextureLoader, TextureState};
