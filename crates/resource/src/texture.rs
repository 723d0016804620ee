//! Background image loading for textured symbols.
//!
//! Compiling an image symbol starts a load and returns immediately. The
//! returned [`TextureHandle`] is stored in the uniform table; a renderer
//! polls [`TextureHandle::state`] or blocks on [`TextureHandle::wait`]
//! before drawing with it.

use crate::provider::{ResourceError, ResourceProvider};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Decodes PNG, JPEG or GIF bytes.
    pub fn decode(src: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| ResourceError::Decode {
                src: src.to_string(),
                message: e.to_string(),
            })?
            .to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureState {
    /// Not loaded and no load running.
    Idle,
    Loading,
    Ready(Arc<TextureImage>),
    Failed(ResourceError),
}

impl TextureState {
    fn is_settled(&self) -> bool {
        matches!(self, TextureState::Ready(_) | TextureState::Failed(_))
    }
}

struct Shared {
    src: String,
    cross_origin: String,
    state: Mutex<TextureState>,
    settled: Condvar,
}

/// A cloneable handle on one image source and its load state.
#[derive(Clone)]
pub struct TextureHandle {
    shared: Arc<Shared>,
}

impl TextureHandle {
    /// A handle that never loads on its own; see [`TextureLoader::spawn`].
    pub fn idle(src: impl Into<String>, cross_origin: impl Into<String>) -> Self {
        Self::with_state(src.into(), cross_origin.into(), TextureState::Idle)
    }

    fn with_state(src: String, cross_origin: String, state: TextureState) -> Self {
        Self {
            shared: Arc::new(Shared {
                src,
                cross_origin,
                state: Mutex::new(state),
                settled: Condvar::new(),
            }),
        }
    }

    pub fn src(&self) -> &str {
        &self.shared.src
    }

    /// The cross-origin policy requested for the source.
    pub fn cross_origin(&self) -> &str {
        &self.shared.cross_origin
    }

    pub fn state(&self) -> TextureState {
        self.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), TextureState::Ready(_))
    }

    /// The decoded image, if loading already finished.
    pub fn image(&self) -> Option<Arc<TextureImage>> {
        match &*self.lock() {
            TextureState::Ready(image) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Blocks until the load settles. Returns immediately for idle handles.
    pub fn wait(&self) -> Result<Arc<TextureImage>, ResourceError> {
        let mut state = self.lock();
        while matches!(*state, TextureState::Loading) {
            state = self
                .shared
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Self::outcome(&self.shared.src, &state)
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Arc<TextureImage>, ResourceError>> {
        let state = self.lock();
        let (state, _) = self
            .shared
            .settled
            .wait_timeout_while(state, timeout, |s| matches!(s, TextureState::Loading))
            .unwrap_or_else(PoisonError::into_inner);
        match *state {
            TextureState::Loading => None,
            _ => Some(Self::outcome(&self.shared.src, &state)),
        }
    }

    fn outcome(src: &str, state: &TextureState) -> Result<Arc<TextureImage>, ResourceError> {
        match state {
            TextureState::Ready(image) => Ok(Arc::clone(image)),
            TextureState::Failed(err) => Err(err.clone()),
            TextureState::Idle | TextureState::Loading => Err(ResourceError::LoadFailed {
                src: src.to_string(),
                message: "texture load was never started".to_string(),
            }),
        }
    }

    fn settle(&self, state: TextureState) {
        debug_assert!(state.is_settled());
        *self.lock() = state;
        self.shared.settled.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, TextureState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle")
            .field("src", &self.shared.src)
            .field("cross_origin", &self.shared.cross_origin)
            .field("state", &*self.lock())
            .finish()
    }
}

/// Starts texture loads against a provider.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    provider: Arc<dyn ResourceProvider>,
}

impl TextureLoader {
    pub fn new(provider: Arc<dyn ResourceProvider>) -> Self {
        Self { provider }
    }

    /// Starts loading `src` on a background thread and returns at once.
    pub fn spawn(&self, src: &str, cross_origin: &str) -> TextureHandle {
        let handle = TextureHandle::with_state(
            src.to_string(),
            cross_origin.to_string(),
            TextureState::Loading,
        );
        log::debug!(
            "Loading texture '{}' via {} provider (crossOrigin: {})",
            src,
            self.provider.name(),
            cross_origin
        );

        let provider = Arc::clone(&self.provider);
        let worker = handle.clone();
        let spawned = thread::Builder::new()
            .name("stipple-texture".to_string())
            .spawn(move || worker.settle(load_image(provider.as_ref(), worker.src())));

        if let Err(e) = spawned {
            log::warn!("Could not start texture load for '{}': {}", src, e);
            handle.settle(TextureState::Failed(e.into()));
        }
        handle
    }

    /// Loads `src` on the calling thread.
    pub fn load_blocking(&self, src: &str, cross_origin: &str) -> TextureHandle {
        let state = load_image(self.provider.as_ref(), src);
        TextureHandle::with_state(src.to_string(), cross_origin.to_string(), state)
    }
}

fn load_image(provider: &dyn ResourceProvider, src: &str) -> TextureState {
    match provider
        .load(src)
        .and_then(|bytes| TextureImage::decode(src, &bytes))
    {
        Ok(image) => {
            log::info!("Texture '{}' ready ({}x{})", src, image.width, image.height);
            TextureState::Ready(Arc::new(image))
        }
        Err(err) => {
            log::warn!("Texture '{}' failed to load: {}", src, err);
            TextureState::Failed(err)
        }
    }
}
