use crate::camera::CameraProxy;
use crate::config::ProxyConfig;
use std::sync::Arc;
use tauri::{command, State};

/// Get the active configuration
#[command]
pub async fn get_config(camera: State<'_, Arc<CameraProxy>>) -> Result<ProxyConfig, String> {
    Ok(camera.config())
}

/// Validate, apply and persist a new configuration
#[command]
pub async fn update_config(
    camera: State<'_, Arc<CameraProxy>>,
    new_config: ProxyConfig,
) -> Result<(), String> {
    camera
        .set_config(new_config.clone())
        .map_err(|e| e.to_string())?;

    new_config
        .save_to_file(ProxyConfig::default_path())
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config(camera: State<'_, Arc<CameraProxy>>) -> Result<ProxyConfig, String> {
    let default_config = ProxyConfig::default();

    camera
        .set_config(default_config.clone())
        .map_err(|e| format!("Failed to reset config: {}", e))?;

    default_config
        .save_to_file(ProxyConfig::default_path())
        .map_err(|e| e.to_string())?;

    Ok(default_config)
}
