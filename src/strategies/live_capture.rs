//! Picture from the live camera
//!
//! Opens a video-only stream, shows it in an overlay above the page and waits
//! for the user to press Cancel or Capture. The stream is stopped before the
//! overlay leaves the page on every exit path, including errors and the
//! future being dropped.

use crate::config::ProxyConfig;
use crate::data_url::DataUrl;
use crate::errors::CameraError;
use crate::media::{MediaBackend, MediaConstraints, MediaStream};
use crate::normalizer::{export, Normalizer};
use crate::page::{Element, ElementId, OverlayAction, OverlaySpec, Page};
use crate::types::CaptureOptions;
use std::sync::Arc;

/// Overlay shown while the camera is live
pub fn overlay_spec(config: &ProxyConfig, width: u32, height: u32) -> OverlaySpec {
    OverlaySpec {
        class_name: config.overlay.class_name.clone(),
        z_index: config.overlay.z_index,
        video_width: width,
        video_height: height,
        cancel_label: config.overlay.cancel_label.clone(),
        capture_label: config.overlay.capture_label.clone(),
    }
}

/// An overlay in the page bound to an active stream
pub struct AcquisitionSession<'a> {
    page: &'a dyn Page,
    stream: Arc<dyn MediaStream>,
    overlay: ElementId,
    closed: bool,
}

impl<'a> AcquisitionSession<'a> {
    /// Insert the overlay, bind the stream to its video view and start playback
    pub fn present(page: &'a dyn Page, stream: Arc<dyn MediaStream>, spec: OverlaySpec) -> Self {
        let overlay = page.append(Element::CaptureOverlay(spec));
        page.attach_stream(overlay, stream.clone());
        log::debug!("Capture overlay {} presented for stream {}", overlay, stream.id());
        Self {
            page,
            stream,
            overlay,
            closed: false,
        }
    }

    pub fn overlay(&self) -> ElementId {
        self.overlay
    }

    pub fn stream(&self) -> &Arc<dyn MediaStream> {
        &self.stream
    }

    /// Stop every track, then take the overlay out of the page
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.stream.stop_all();
        if !self.page.remove(self.overlay) {
            log::warn!("Capture overlay {} was already gone from the page", self.overlay);
        }
        log::debug!("Capture overlay {} closed", self.overlay);
    }
}

impl Drop for AcquisitionSession<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Grab one frame from the camera.
///
/// The requested size is only a hint: once the stream is up, the track's
/// negotiated resolution becomes the output size.
pub async fn acquire(
    page: &dyn Page,
    media: &MediaBackend,
    options: &CaptureOptions,
    config: &ProxyConfig,
) -> Result<DataUrl, CameraError> {
    let (width, height) =
        options.live_target(config.capture.default_width, config.capture.default_height);

    if !media.is_available() {
        log::warn!("Live capture requested but the host has no camera API");
        if config.overlay.alert_on_unavailable {
            page.alert(&config.overlay.unsupported_message);
        }
        return Err(CameraError::CapabilityUnavailable);
    }

    log::info!("Requesting camera stream at {}x{}", width, height);
    let stream = media
        .acquire(MediaConstraints::video_only(width, height))
        .await?;

    let settings = match stream.video_tracks().first() {
        Some(track) => track.settings(),
        None => {
            stream.stop_all();
            return Err(CameraError::StreamError(
                "Stream has no video track".to_string(),
            ));
        }
    };

    if (settings.width, settings.height) != (width, height) {
        log::info!(
            "Camera negotiated {}x{} instead of {}x{}",
            settings.width,
            settings.height,
            width,
            height
        );
    }
    let (width, height) = (settings.width, settings.height);

    let mut session =
        AcquisitionSession::present(page, stream, overlay_spec(config, width, height));

    match page.overlay_action(session.overlay()).await {
        OverlayAction::Cancel => {
            session.close();
            log::info!("User cancelled live capture");
            Err(CameraError::UserCancelled)
        }
        OverlayAction::Capture => {
            let frame = session.stream().current_frame().await?;
            let surface = Normalizer::new(config.capture.resize_filter).draw(&frame, width, height);
            let payload = export(&surface, &options.encoding, options.quality())?;
            session.close();
            log::info!("Captured {}x{} frame as {}", width, height, payload.mime_type());
            Ok(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPage, MockUserMedia};
    use crate::types::{EncodingType, SourceMode};

    #[tokio::test]
    async fn test_requests_defaults_for_sentinel() {
        let page = MockPage::default();
        page.queue_action(OverlayAction::Cancel);
        let api = Arc::new(MockUserMedia::new(640, 480));
        let media = MediaBackend::Modern(api.clone());

        let options = CaptureOptions::new(SourceMode::LiveCapture).with_target(-1, -1);
        let _ = acquire(&page, &media, &options, &ProxyConfig::default()).await;

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], MediaConstraints::video_only(320, 240));
        assert!(!requests[0].audio);
    }

    #[tokio::test]
    async fn test_overlay_uses_negotiated_size() {
        let page = Arc::new(MockPage::default());
        let api = Arc::new(MockUserMedia::new(640, 480));
        let media = MediaBackend::Modern(api.clone());
        let options = CaptureOptions::new(SourceMode::LiveCapture)
            .with_target(100, 100)
            .with_encoding(EncodingType::png());

        let task = {
            let page = page.clone();
            tokio::spawn(async move {
                acquire(page.as_ref(), &media, &options, &ProxyConfig::default()).await
            })
        };

        while page.overlays().is_empty() {
            tokio::task::yield_now().await;
        }
        let overlay = page.overlays().remove(0);
        assert_eq!((overlay.video_width, overlay.video_height), (640, 480));
        assert_eq!(overlay.z_index, crate::config::HIGHEST_POSSIBLE_Z_INDEX);
        assert_eq!(page.attached_streams().len(), 1);

        assert!(page.activate(OverlayAction::Capture));
        let url = task.await.unwrap().unwrap();
        assert!(url.has_mime_prefix("image/png"));
        assert!(page.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_missing_video_track() {
        let page = MockPage::default();
        let api = Arc::new(MockUserMedia::new(640, 480).without_tracks());
        let media = MediaBackend::Modern(api);

        let options = CaptureOptions::new(SourceMode::LiveCapture);
        let err = acquire(&page, &media, &options, &ProxyConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CameraError::StreamError(_)));
        assert!(page.elements().is_empty());
    }

    #[tokio::test]
    async fn test_session_drop_releases_stream() {
        let page = MockPage::default();
        let stream = Arc::new(crate::testing::MockStream::video(32, 32));
        {
            let _session = AcquisitionSession::present(
                &page,
                stream.clone(),
                overlay_spec(&ProxyConfig::default(), 32, 32),
            );
            assert_eq!(page.overlays().len(), 1);
        }
        assert!(stream.all_stopped());
        assert!(page.overlays().is_empty());
    }
}
