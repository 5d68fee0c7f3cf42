use crate::camera::CameraProxy;
use crate::proxy::ExecProxy;
use serde_json::Value;
use std::sync::Arc;
use tauri::{command, State};

/// Take a picture with the positional options array
/// `[quality, _, mode, width, height, encoding]`; resolves to a data URL
#[command]
pub async fn take_picture(
    camera: State<'_, Arc<CameraProxy>>,
    options: Vec<Value>,
) -> Result<String, String> {
    match camera.take_picture_args(&options).await {
        Ok(url) => Ok(url.into_string()),
        Err(e) => {
            log::warn!("take_picture failed: {}", e);
            Err(e.message())
        }
    }
}

/// Teardown hook
#[command]
pub async fn cleanup(camera: State<'_, Arc<CameraProxy>>) -> Result<(), String> {
    camera.cleanup();
    Ok(())
}

/// Generic bridge entry: route `service.action(args)` through the exec proxy
#[command]
pub async fn exec(
    proxy: State<'_, Arc<ExecProxy>>,
    service: String,
    action: String,
    args: Vec<Value>,
) -> Result<Value, String> {
    proxy
        .exec(&service, &action, args)
        .await
        .map_err(|e| e.to_string())
}
