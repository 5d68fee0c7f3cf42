//! Camera capability entry point
//!
//! [`CameraProxy`] owns the host page, the media backend resolved once at
//! construction and the active configuration. `take_picture` routes to the
//! file-pick or live-capture strategy based on the options' mode flag.

use crate::config::ProxyConfig;
use crate::data_url::DataUrl;
use crate::errors::CameraError;
use crate::media::{MediaBackend, MediaCapabilities};
use crate::page::Page;
use crate::strategies::{file_pick, live_capture};
use crate::types::{CaptureOptions, SourceMode};
use serde_json::Value;
use std::sync::{Arc, RwLock};

pub struct CameraProxy {
    page: Arc<dyn Page>,
    media: MediaBackend,
    config: RwLock<ProxyConfig>,
}

impl CameraProxy {
    pub fn new(page: Arc<dyn Page>, capabilities: MediaCapabilities, config: ProxyConfig) -> Self {
        Self::with_backend(page, MediaBackend::resolve(capabilities), config)
    }

    pub fn with_backend(page: Arc<dyn Page>, media: MediaBackend, config: ProxyConfig) -> Self {
        log::info!("Camera proxy ready (media backend: {:?})", media);
        Self {
            page,
            media,
            config: RwLock::new(config),
        }
    }

    pub fn media_backend(&self) -> &MediaBackend {
        &self.media
    }

    pub fn config(&self) -> ProxyConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the active configuration after validating it
    pub fn set_config(&self, config: ProxyConfig) -> Result<(), CameraError> {
        config.validate().map_err(CameraError::ConfigError)?;
        let mut current = self
            .config
            .write()
            .map_err(|_| CameraError::ConfigError("Config lock poisoned".to_string()))?;
        *current = config;
        Ok(())
    }

    /// Acquire one picture
    pub async fn take_picture(&self, options: &CaptureOptions) -> Result<DataUrl, CameraError> {
        let config = self.config();
        log::info!(
            "take_picture: mode={:?} target={}x{} encoding={} quality={}",
            options.mode,
            options.target_width,
            options.target_height,
            options.encoding,
            options.quality
        );

        let result = match options.mode {
            SourceMode::LiveCapture => {
                live_capture::acquire(self.page.as_ref(), &self.media, options, &config).await
            }
            SourceMode::FilePick => file_pick::acquire(self.page.as_ref(), options, &config).await,
        };

        match &result {
            Ok(url) => log::info!("Picture ready: {} ({} bytes)", url.mime_type(), url.len()),
            Err(e) if e.is_user_initiated() => log::info!("No picture: {}", e),
            Err(e) => log::error!("Failed to take picture: {}", e),
        }
        result
    }

    /// Parse the positional argument array, then take a picture
    pub async fn take_picture_args(&self, args: &[Value]) -> Result<DataUrl, CameraError> {
        let options = CaptureOptions::from_args(args, &self.config().capture)?;
        self.take_picture(&options).await
    }

    /// Teardown hook. Nothing is held between calls, so there is nothing to
    /// release.
    pub fn cleanup(&self) {
        log::debug!("cleanup: nothing to release");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPage, MockUserMedia};
    use serde_json::json;

    #[tokio::test]
    async fn test_file_pick_is_default_mode() {
        let page = Arc::new(MockPage::default());
        page.select_files(vec![]);
        let camera = CameraProxy::new(page.clone(), MediaCapabilities::none(), ProxyConfig::default());

        let err = camera.take_picture_args(&[json!(50)]).await.unwrap_err();
        assert_eq!(err, CameraError::NoFileSelected);
        assert_eq!(page.dispatched().len(), 1);
    }

    #[tokio::test]
    async fn test_mode_flag_one_uses_camera() {
        let page = Arc::new(MockPage::default());
        page.queue_action(crate::page::OverlayAction::Cancel);
        let api = Arc::new(MockUserMedia::new(320, 240));
        let camera = CameraProxy::new(
            page.clone(),
            MediaCapabilities::modern(api.clone()),
            ProxyConfig::default(),
        );

        let err = camera
            .take_picture_args(&[json!(50), json!(0), json!(1), json!(-1), json!(-1), json!("image/png")])
            .await
            .unwrap_err();
        assert_eq!(err, CameraError::UserCancelled);
        assert_eq!(api.requests().len(), 1);
        assert!(page.file_inputs().is_empty());
    }

    #[test]
    fn test_set_config_validates() {
        let camera = CameraProxy::new(
            Arc::new(MockPage::default()),
            MediaCapabilities::none(),
            ProxyConfig::default(),
        );
        let mut bad = ProxyConfig::default();
        bad.capture.default_width = 0;
        assert!(camera.set_config(bad).is_err());

        let mut good = ProxyConfig::default();
        good.capture.default_quality = 90;
        camera.set_config(good.clone()).unwrap();
        assert_eq!(camera.config(), good);
    }

    #[test]
    fn test_cleanup_is_noop() {
        let page = Arc::new(MockPage::default());
        let camera = CameraProxy::new(page.clone(), MediaCapabilities::none(), ProxyConfig::default());
        camera.cleanup();
        camera.cleanup();
        assert!(page.elements().is_empty());
    }
}
