use camera_proxy::config::ProxyConfig;
use camera_proxy::media::MediaCapabilities;
use camera_proxy::page::OverlayAction;
use camera_proxy::proxy::{register, ExecProxy, ProxyError, ServiceHandler, CAMERA_SERVICE};
use camera_proxy::testing::{synthetic_file, MockPage, MockUserMedia};
use camera_proxy::{CameraProxy, DataUrl};
use image::ImageFormat;
use serde_json::{json, Value};
use std::sync::Arc;

fn registered(page: &Arc<MockPage>, capabilities: MediaCapabilities) -> ExecProxy {
    let proxy = ExecProxy::new();
    let camera = Arc::new(CameraProxy::new(page.clone(), capabilities, ProxyConfig::default()));
    register(&proxy, camera).unwrap();
    proxy
}

#[test]
fn test_camera_registered_under_service_name() {
    let page = Arc::new(MockPage::default());
    let proxy = registered(&page, MediaCapabilities::none());
    assert_eq!(CAMERA_SERVICE, "Camera");
    assert_eq!(proxy.services(), vec!["Camera".to_string()]);
}

#[test]
fn test_camera_actions() {
    let camera = CameraProxy::new(
        Arc::new(MockPage::default()),
        MediaCapabilities::none(),
        ProxyConfig::default(),
    );
    assert_eq!(camera.actions(), vec!["takePicture", "cleanup"]);
}

#[tokio::test]
async fn test_take_picture_through_proxy() {
    let page = Arc::new(MockPage::default());
    page.select_files(vec![synthetic_file("a.png", 16, 16, ImageFormat::Png)]);
    let proxy = registered(&page, MediaCapabilities::none());

    let value = proxy
        .exec("Camera", "takePicture", vec![json!(50), json!(0), json!(0)])
        .await
        .unwrap();

    let url = match value {
        Value::String(s) => DataUrl::parse(s).unwrap(),
        other => panic!("expected a data URL string, got {}", other),
    };
    assert!(url.has_mime_prefix("image/png"));
}

#[tokio::test]
async fn test_failures_carry_human_readable_message() {
    let page = Arc::new(MockPage::default());
    page.queue_action(OverlayAction::Cancel);
    let proxy = registered(
        &page,
        MediaCapabilities::modern(Arc::new(MockUserMedia::new(32, 32))),
    );

    let err = proxy
        .exec("Camera", "takePicture", vec![json!(50), json!(0), json!(1)])
        .await
        .unwrap_err();
    assert_eq!(err, ProxyError::Failed("User cancelled the capture.".to_string()));

    page.select_files(vec![]);
    let err = proxy
        .exec("Camera", "takePicture", vec![json!(50), json!(0), json!(0)])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No file selected by user.");
}

#[tokio::test]
async fn test_cleanup_is_repeatable() {
    let page = Arc::new(MockPage::default());
    let proxy = registered(&page, MediaCapabilities::none());

    for _ in 0..3 {
        assert_eq!(proxy.exec("Camera", "cleanup", vec![]).await.unwrap(), Value::Null);
    }
    assert!(page.elements().is_empty());
}

#[tokio::test]
async fn test_unregistered_service() {
    let proxy = ExecProxy::new();
    let err = proxy.exec("Camera", "takePicture", vec![]).await.unwrap_err();
    assert_eq!(err, ProxyError::UnknownService("Camera".to_string()));
}
