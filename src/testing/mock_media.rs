//! Scripted media devices
//!
//! Streams negotiate a fixed resolution regardless of the constraints, which
//! is how real cameras behave when asked for a size they do not support.

use super::synthetic_data::synthetic_image;
use crate::errors::CameraError;
use crate::media::{
    ErrorCallback, LegacyUserMedia, MediaConstraints, MediaStream, MediaTrack, StreamCallback,
    TrackKind, TrackSettings, UserMedia,
};
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockTrack {
    kind: TrackKind,
    settings: TrackSettings,
    live: AtomicBool,
    stop_calls: AtomicUsize,
}

impl MockTrack {
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            kind: TrackKind::Video,
            settings: TrackSettings { width, height },
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl MediaTrack for MockTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct MockStream {
    id: String,
    tracks: Vec<Arc<MockTrack>>,
    frame: DynamicImage,
    frame_delay: Option<Duration>,
}

impl MockStream {
    /// Stream with one video track delivering a gradient frame
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks: vec![Arc::new(MockTrack::video(width, height))],
            frame: synthetic_image(width, height),
            frame_delay: None,
        }
    }

    /// Stream with no tracks at all
    pub fn empty() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks: Vec::new(),
            frame: synthetic_image(1, 1),
            frame_delay: None,
        }
    }

    /// Every frame read blocks its thread for `delay`, like a device read
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    pub fn mock_tracks(&self) -> &[Arc<MockTrack>] {
        &self.tracks
    }

    /// Every track was stopped at least once
    pub fn all_stopped(&self) -> bool {
        self.tracks.iter().all(|t| !t.is_live() && t.stop_calls() > 0)
    }
}

#[async_trait]
impl MediaStream for MockStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .iter()
            .map(|t| t.clone() as Arc<dyn MediaTrack>)
            .collect()
    }

    async fn current_frame(&self) -> Result<DynamicImage, CameraError> {
        if !self.is_active() {
            return Err(CameraError::StreamError("Stream already stopped".to_string()));
        }
        let frame = self.frame.clone();
        match self.frame_delay {
            None => Ok(frame),
            Some(delay) => tokio::task::spawn_blocking(move || {
                std::thread::sleep(delay);
                frame
            })
            .await
            .map_err(|e| CameraError::StreamError(format!("Task join error: {}", e))),
        }
    }
}

#[derive(Clone, Copy)]
enum StreamShape {
    Video(u32, u32),
    NoTracks,
}

/// Shared bookkeeping for both API styles
struct Devices {
    shape: StreamShape,
    deny: Option<String>,
    frame_delay: Option<Duration>,
    requests: Mutex<Vec<MediaConstraints>>,
    streams: Mutex<Vec<Arc<MockStream>>>,
}

impl Devices {
    fn new(width: u32, height: u32) -> Self {
        Self {
            shape: StreamShape::Video(width, height),
            deny: None,
            frame_delay: None,
            requests: Mutex::new(Vec::new()),
            streams: Mutex::new(Vec::new()),
        }
    }

    fn request(&self, constraints: MediaConstraints) -> Result<Arc<MockStream>, String> {
        self.requests
            .lock()
            .expect("mock media poisoned")
            .push(constraints);

        if let Some(reason) = &self.deny {
            return Err(reason.clone());
        }

        let mut stream = match self.shape {
            StreamShape::Video(w, h) => MockStream::video(w, h),
            StreamShape::NoTracks => MockStream::empty(),
        };
        stream.frame_delay = self.frame_delay;
        let stream = Arc::new(stream);
        self.streams
            .lock()
            .expect("mock media poisoned")
            .push(stream.clone());
        Ok(stream)
    }

    fn requests(&self) -> Vec<MediaConstraints> {
        self.requests.lock().expect("mock media poisoned").clone()
    }

    fn last_stream(&self) -> Option<Arc<MockStream>> {
        self.streams.lock().expect("mock media poisoned").last().cloned()
    }
}

/// Promise-style API whose camera negotiates `width` x `height`
pub struct MockUserMedia {
    devices: Devices,
}

impl MockUserMedia {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            devices: Devices::new(width, height),
        }
    }

    /// Reject every request with `reason`
    pub fn denying(mut self, reason: &str) -> Self {
        self.devices.deny = Some(reason.to_string());
        self
    }

    /// Hand out streams that carry no video track
    pub fn without_tracks(mut self) -> Self {
        self.devices.shape = StreamShape::NoTracks;
        self
    }

    /// Hand out streams whose frame reads block for `delay`
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.devices.frame_delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.devices.requests()
    }

    pub fn last_stream(&self) -> Option<Arc<MockStream>> {
        self.devices.last_stream()
    }
}

#[async_trait]
impl UserMedia for MockUserMedia {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        self.devices
            .request(constraints)
            .map(|s| s as Arc<dyn MediaStream>)
            .map_err(CameraError::StreamError)
    }
}

/// Callback-style API, answering synchronously
pub struct MockLegacyUserMedia {
    name: String,
    devices: Devices,
}

impl MockLegacyUserMedia {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            devices: Devices::new(width, height),
        }
    }

    pub fn denying(mut self, reason: &str) -> Self {
        self.devices.deny = Some(reason.to_string());
        self
    }

    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.devices.requests()
    }

    pub fn last_stream(&self) -> Option<Arc<MockStream>> {
        self.devices.last_stream()
    }
}

impl LegacyUserMedia for MockLegacyUserMedia {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_user_media(
        &self,
        constraints: MediaConstraints,
        on_success: StreamCallback,
        on_error: ErrorCallback,
    ) {
        match self.devices.request(constraints) {
            Ok(stream) => on_success(stream as Arc<dyn MediaStream>),
            Err(reason) => on_error(reason),
        }
    }
}
