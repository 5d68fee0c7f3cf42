//! Promise-style media API backed by a local camera
//!
//! Lets a desktop host (the CLI, or a webview without camera access) serve
//! live capture from a real device through nokhwa.

use super::{MediaConstraints, MediaStream, MediaTrack, TrackKind, TrackSettings, UserMedia};
use crate::errors::CameraError;
use async_trait::async_trait;
use image::DynamicImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    CallbackCamera,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Opens the camera at `device_index` on each request
#[derive(Debug, Clone)]
pub struct NativeUserMedia {
    device_index: u32,
    frame_rate: u32,
}

impl NativeUserMedia {
    pub fn new(device_index: u32, frame_rate: u32) -> Self {
        Self {
            device_index,
            frame_rate,
        }
    }

    fn open(&self, constraints: MediaConstraints) -> Result<NativeStream, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            nokhwa::utils::CameraFormat::new(
                Resolution::new(constraints.video.width, constraints.video.height),
                FrameFormat::MJPEG,
                self.frame_rate,
            ),
        ));

        let mut camera = CallbackCamera::new(CameraIndex::Index(self.device_index), requested, |_| {})
            .map_err(|e| CameraError::StreamError(format!("Failed to open camera: {}", e)))?;

        camera
            .open_stream()
            .map_err(|e| CameraError::StreamError(format!("Failed to start stream: {}", e)))?;

        let camera = Arc::new(Mutex::new(camera));

        // The negotiated resolution is whatever the first decoded frame has.
        let first = poll_rgb(&camera)?;
        let settings = TrackSettings {
            width: first.width(),
            height: first.height(),
        };

        log::info!(
            "Camera {} streaming at {}x{} (requested {}x{})",
            self.device_index,
            settings.width,
            settings.height,
            constraints.video.width,
            constraints.video.height
        );

        let track = Arc::new(NativeVideoTrack {
            camera: camera.clone(),
            settings,
            live: AtomicBool::new(true),
        });

        Ok(NativeStream {
            id: uuid::Uuid::new_v4().to_string(),
            camera,
            track,
        })
    }
}

#[async_trait]
impl UserMedia for NativeUserMedia {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        let this = self.clone();
        let stream = tokio::task::spawn_blocking(move || this.open(constraints))
            .await
            .map_err(|e| CameraError::StreamError(format!("Task join error: {}", e)))??;
        Ok(Arc::new(stream))
    }
}

fn poll_rgb(camera: &Arc<Mutex<CallbackCamera>>) -> Result<DynamicImage, CameraError> {
    let mut camera = camera
        .lock()
        .map_err(|_| CameraError::StreamError("Failed to lock camera".to_string()))?;

    let buffer = camera
        .poll_frame()
        .map_err(|e| CameraError::StreamError(format!("Failed to capture frame: {}", e)))?;

    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::DecodeFailed(format!("Failed to decode frame: {}", e)))?;

    let (width, height) = (decoded.width(), decoded.height());
    let rgb = image::RgbImage::from_raw(width, height, decoded.into_raw())
        .ok_or_else(|| CameraError::DecodeFailed("Frame buffer size mismatch".to_string()))?;

    Ok(DynamicImage::ImageRgb8(rgb))
}

pub struct NativeVideoTrack {
    camera: Arc<Mutex<CallbackCamera>>,
    settings: TrackSettings,
    live: AtomicBool,
}

impl MediaTrack for NativeVideoTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn stop(&self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        match self.camera.lock() {
            Ok(mut camera) => {
                if let Err(e) = camera.stop_stream() {
                    log::warn!("Failed to stop camera stream: {}", e);
                }
            }
            Err(_) => log::warn!("Camera lock poisoned while stopping track"),
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct NativeStream {
    id: String,
    camera: Arc<Mutex<CallbackCamera>>,
    track: Arc<NativeVideoTrack>,
}

#[async_trait]
impl MediaStream for NativeStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![self.track.clone() as Arc<dyn MediaTrack>]
    }

    async fn current_frame(&self) -> Result<DynamicImage, CameraError> {
        if !self.track.is_live() {
            return Err(CameraError::StreamError("Stream already stopped".to_string()));
        }
        let camera = self.camera.clone();
        tokio::task::spawn_blocking(move || poll_rgb(&camera))
            .await
            .map_err(|e| CameraError::StreamError(format!("Task join error: {}", e)))?
    }
}
