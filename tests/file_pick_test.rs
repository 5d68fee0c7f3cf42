use camera_proxy::config::ProxyConfig;
use camera_proxy::errors::CameraError;
use camera_proxy::normalizer::decode;
use camera_proxy::page::{ActivationEvent, Element, EventSupport, SelectedFile};
use camera_proxy::strategies::file_pick::{acquire, file_input_spec};
use camera_proxy::testing::{synthetic_data_url, synthetic_file, MockPage};
use camera_proxy::types::{CaptureOptions, EncodingType, SourceMode};
use image::{GenericImageView, ImageFormat};
use std::sync::Arc;

fn options() -> CaptureOptions {
    CaptureOptions::new(SourceMode::FilePick)
}

#[tokio::test]
async fn test_dismissed_dialog_rejects_once_and_removes_control() {
    let page = MockPage::default();
    page.select_files(vec![]);

    let err = acquire(&page, &options(), &ProxyConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err, CameraError::NoFileSelected);
    assert_eq!(err.message(), "No file selected by user.");
    assert!(page.elements().is_empty());
    assert_eq!(page.removed().len(), 1);
}

#[tokio::test]
async fn test_control_is_hidden_image_input() {
    let page = Arc::new(MockPage::default());
    let config = ProxyConfig::default();

    let task = {
        let page = page.clone();
        let config = config.clone();
        tokio::spawn(async move { acquire(page.as_ref(), &options(), &config).await })
    };

    while page.file_inputs().is_empty() {
        tokio::task::yield_now().await;
    }
    let inputs = page.file_inputs();
    assert_eq!(inputs[0], file_input_spec(&config));
    assert_eq!(inputs[0].accept, "image/*");
    assert!(inputs[0].hidden);

    let (target, event) = page.dispatched().remove(0);
    let (input_id, _) = page.elements().remove(0);
    assert_eq!(target, input_id);
    assert!(event.is_user_activation());

    page.select_files(vec![synthetic_file("pic.png", 12, 12, ImageFormat::Png)]);
    task.await.unwrap().unwrap();
    assert!(!page.contains(input_id));
}

#[tokio::test]
async fn test_pass_through_returns_file_contents_verbatim() {
    let page = MockPage::default();
    let file = synthetic_file("pic.png", 30, 20, ImageFormat::Png);
    let expected = file.read_as_data_url();
    page.select_files(vec![file]);

    let url = acquire(
        &page,
        &options().with_encoding(EncodingType::png()),
        &ProxyConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(url, expected);
}

#[tokio::test]
async fn test_converts_and_fits_into_box() {
    let page = MockPage::default();
    page.select_files(vec![synthetic_file("wide.png", 400, 300, ImageFormat::Png)]);

    let options = options()
        .with_quality(80)
        .with_target(200, 200)
        .with_encoding(EncodingType::jpeg());
    let url = acquire(&page, &options, &ProxyConfig::default()).await.unwrap();

    assert!(url.has_mime_prefix("image/jpeg"));
    assert_eq!(decode(&url).unwrap().dimensions(), (200, 150));
}

#[tokio::test]
async fn test_small_file_in_same_encoding_is_untouched() {
    let page = MockPage::default();
    let file = synthetic_file("small.jpg", 50, 40, ImageFormat::Jpeg);
    let expected = file.read_as_data_url();
    page.select_files(vec![file]);

    let options = options()
        .with_target(200, 200)
        .with_encoding(EncodingType::jpeg());
    let url = acquire(&page, &options, &ProxyConfig::default()).await.unwrap();
    assert_eq!(url, expected);
}

#[tokio::test]
async fn test_legacy_hosts_get_legacy_click() {
    let page = MockPage::new(EventSupport::Legacy);
    page.select_files(vec![synthetic_file("a.png", 4, 4, ImageFormat::Png)]);

    acquire(&page, &options(), &ProxyConfig::default()).await.unwrap();

    let dispatched = page.dispatched();
    assert_eq!(dispatched.len(), 1);
    match &dispatched[0].1 {
        ActivationEvent::Legacy { kind, detail, .. } => {
            assert_eq!(kind, "click");
            assert_eq!(*detail, 1);
        }
        other => panic!("expected legacy click, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_file_fails_after_cleanup() {
    let page = MockPage::default();
    page.select_files(vec![SelectedFile::new(
        "broken.png",
        "image/png",
        b"definitely not a png".to_vec(),
    )]);

    let err = acquire(
        &page,
        &options().with_encoding(EncodingType::jpeg()),
        &ProxyConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CameraError::DecodeFailed(_)));
    assert!(page.elements().is_empty());
}

#[tokio::test]
async fn test_custom_picker_config() {
    let page = MockPage::default();
    page.select_files(vec![]);

    let mut config = ProxyConfig::default();
    config.picker.accept = "image/png,image/jpeg".to_string();
    config.picker.class_name = "my-picker".to_string();

    let _ = acquire(&page, &options(), &config).await;
    assert_eq!(page.dispatched().len(), 1);
    assert!(page
        .elements()
        .iter()
        .all(|(_, e)| !matches!(e, Element::FileInput(_))));

    let spec = file_input_spec(&config);
    assert_eq!(spec.accept, "image/png,image/jpeg");
    assert_eq!(spec.class_name, "my-picker");
}

#[test]
fn test_synthetic_payload_has_prefix() {
    let url = synthetic_data_url(2, 2, ImageFormat::Png);
    assert!(url.as_str().starts_with("data:image/png;base64,"));
}
