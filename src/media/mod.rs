//! Camera media streams and the host's media-device API
//!
//! Hosts expose camera access in one of three shapes: the promise-based
//! `mediaDevices.getUserMedia`, an older vendor-prefixed callback API, or
//! nothing at all. [`MediaBackend::resolve`] picks the best one once, so the
//! capture path only ever deals with a single "acquire stream" capability.

pub mod native;

use crate::errors::CameraError;
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use native::NativeUserMedia;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// Resolution a track actually delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
}

/// What to ask the media API for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

impl MediaConstraints {
    /// Video at the given resolution, no audio. The resolution is advisory;
    /// the device may negotiate something else.
    pub fn video_only(width: u32, height: u32) -> Self {
        Self {
            video: VideoConstraints { width, height },
            audio: false,
        }
    }
}

/// One media channel of a stream
pub trait MediaTrack: Send + Sync {
    fn kind(&self) -> TrackKind;

    fn settings(&self) -> TrackSettings;

    /// Release the device behind this track
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// A live camera stream
#[async_trait]
pub trait MediaStream: Send + Sync {
    fn id(&self) -> String;

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// The frame the bound video view currently shows. Device reads and
    /// decoding happen off the async worker threads.
    async fn current_frame(&self) -> Result<DynamicImage, CameraError>;

    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == TrackKind::Video)
            .collect()
    }

    /// Stop every track of the stream
    fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }

    fn is_active(&self) -> bool {
        self.tracks().iter().any(|track| track.is_live())
    }
}

/// Promise-style API (`navigator.mediaDevices.getUserMedia`)
#[async_trait]
pub trait UserMedia: Send + Sync {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError>;
}

pub type StreamCallback = Box<dyn FnOnce(Arc<dyn MediaStream>) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(String) + Send>;

/// Callback-style API (`navigator.getUserMedia` and its vendor prefixes)
pub trait LegacyUserMedia: Send + Sync {
    /// Name of the entry point, e.g. `webkitGetUserMedia`
    fn name(&self) -> &str;

    fn get_user_media(
        &self,
        constraints: MediaConstraints,
        on_success: StreamCallback,
        on_error: ErrorCallback,
    );
}

/// Media entry points a host exposes
#[derive(Clone, Default)]
pub struct MediaCapabilities {
    pub modern: Option<Arc<dyn UserMedia>>,
    /// Callback variants in preference order: unprefixed, webkit, moz, ms
    pub legacy: Vec<Arc<dyn LegacyUserMedia>>,
}

impl MediaCapabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn modern(api: Arc<dyn UserMedia>) -> Self {
        Self {
            modern: Some(api),
            legacy: Vec::new(),
        }
    }

    pub fn with_legacy(mut self, api: Arc<dyn LegacyUserMedia>) -> Self {
        self.legacy.push(api);
        self
    }
}

/// The single "acquire media stream" capability the capture path uses
#[derive(Clone)]
pub enum MediaBackend {
    Modern(Arc<dyn UserMedia>),
    LegacyCallback(Arc<dyn LegacyUserMedia>),
    Unavailable,
}

impl std::fmt::Debug for MediaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaBackend::Modern(_) => write!(f, "MediaBackend::Modern"),
            MediaBackend::LegacyCallback(api) => {
                write!(f, "MediaBackend::LegacyCallback({})", api.name())
            }
            MediaBackend::Unavailable => write!(f, "MediaBackend::Unavailable"),
        }
    }
}

impl MediaBackend {
    /// Pick the best available API: modern first, then the first legacy
    /// variant present
    pub fn resolve(capabilities: MediaCapabilities) -> Self {
        if let Some(modern) = capabilities.modern {
            log::debug!("Using promise-based media API");
            return MediaBackend::Modern(modern);
        }
        if let Some(legacy) = capabilities.legacy.into_iter().next() {
            log::debug!("Using legacy media API: {}", legacy.name());
            return MediaBackend::LegacyCallback(legacy);
        }
        log::warn!("No media API available, live capture is disabled");
        MediaBackend::Unavailable
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, MediaBackend::Unavailable)
    }

    /// Request a stream; `CapabilityUnavailable` when there is no API
    pub async fn acquire(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        match self {
            MediaBackend::Modern(api) => api.get_user_media(constraints).await,
            MediaBackend::LegacyCallback(api) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                let tx = Arc::new(std::sync::Mutex::new(Some(tx)));
                let tx_err = tx.clone();

                api.get_user_media(
                    constraints,
                    Box::new(move |stream| {
                        if let Some(tx) = tx.lock().ok().and_then(|mut g| g.take()) {
                            let _ = tx.send(Ok(stream));
                        }
                    }),
                    Box::new(move |message| {
                        if let Some(tx) = tx_err.lock().ok().and_then(|mut g| g.take()) {
                            let _ = tx.send(Err(CameraError::StreamError(message)));
                        }
                    }),
                );

                rx.await.map_err(|_| {
                    CameraError::StreamError("media request dropped without a response".to_string())
                })?
            }
            MediaBackend::Unavailable => Err(CameraError::CapabilityUnavailable),
        }
    }
}
