use camera_proxy::config::{ProxyConfig, ResizeFilter};
use camera_proxy::errors::CameraError;
use camera_proxy::media::MediaCapabilities;
use camera_proxy::testing::{synthetic_file, MockPage};
use camera_proxy::CameraProxy;
use image::ImageFormat;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_partial_toml_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("camera-proxy.toml");
    std::fs::write(&path, "[capture]\ndefault_width = 640\n").unwrap();

    let err = ProxyConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, CameraError::ConfigError(_)));
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("camera-proxy.toml");

    let mut config = ProxyConfig::default();
    config.overlay.cancel_label = "Abbrechen".to_string();
    config.overlay.capture_label = "Aufnehmen".to_string();
    config.native.device_index = 2;
    config.capture.resize_filter = ResizeFilter::CatmullRom;
    config.save_to_file(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("resize_filter = \"catmull_rom\""));
    assert_eq!(ProxyConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_invalid_default_encoding_rejected() {
    let mut config = ProxyConfig::default();
    config.capture.default_encoding = "application/pdf".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_updated_config_used_by_next_call() {
    let page = Arc::new(MockPage::default());
    let camera = CameraProxy::new(page.clone(), MediaCapabilities::none(), ProxyConfig::default());

    let mut config = camera.config();
    config.picker.class_name = "custom-select".to_string();
    config.capture.default_encoding = "image/jpeg".to_string();
    camera.set_config(config).unwrap();

    page.select_files(vec![synthetic_file("a.png", 8, 8, ImageFormat::Png)]);
    let url = tokio_test::block_on(camera.take_picture_args(&[json!(50)])).unwrap();

    assert!(url.has_mime_prefix("image/jpeg"));
    assert_eq!(camera.config().picker.class_name, "custom-select");
}

#[test]
fn test_invalid_update_keeps_previous_config() {
    let camera = CameraProxy::new(
        Arc::new(MockPage::default()),
        MediaCapabilities::none(),
        ProxyConfig::default(),
    );
    let mut bad = camera.config();
    bad.native.frame_rate = 0;

    assert!(camera.set_config(bad).is_err());
    assert_eq!(camera.config(), ProxyConfig::default());
}
