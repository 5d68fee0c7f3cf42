//! Picture from a user-chosen file

use crate::config::ProxyConfig;
use crate::data_url::DataUrl;
use crate::errors::CameraError;
use crate::normalizer::Normalizer;
use crate::page::{ActivationEvent, Element, FileInputSpec, Page};
use crate::types::CaptureOptions;

/// Hidden file input the dialog is opened from
pub fn file_input_spec(config: &ProxyConfig) -> FileInputSpec {
    FileInputSpec {
        accept: config.picker.accept.clone(),
        class_name: config.picker.class_name.clone(),
        hidden: true,
    }
}

/// Let the user pick an image file and normalize it.
///
/// The input is removed from the page as soon as the selection event fires,
/// whether or not a file was chosen.
pub async fn acquire(
    page: &dyn Page,
    options: &CaptureOptions,
    config: &ProxyConfig,
) -> Result<DataUrl, CameraError> {
    let input = page.append(Element::FileInput(file_input_spec(config)));
    page.dispatch(input, ActivationEvent::click(page.event_support()));
    log::debug!("File dialog opened from input {}", input);

    let files = page.file_selection(input).await;

    if !page.remove(input) {
        log::warn!("File input {} was already gone from the page", input);
    }

    let file = files.into_iter().next().ok_or_else(|| {
        log::warn!("File dialog closed without a selection");
        CameraError::NoFileSelected
    })?;

    log::info!(
        "User selected '{}' ({}, {} bytes)",
        file.name,
        file.mime_type,
        file.bytes.len()
    );

    let payload = file.read_as_data_url();
    Normalizer::new(config.capture.resize_filter).normalize(
        payload,
        &options.encoding,
        options.file_target(),
        options.quality(),
    )
}
