//! camera-proxy: the Camera capability for browser-hosted hybrid apps
//!
//! Maps the framework's `takePicture` / `cleanup` calls onto what a page can
//! offer: a file picker, or a live camera stream shown in an overlay. Every
//! picture is returned as a data URL, converted to the requested encoding and
//! scaled into the requested bounding box.
//!
//! # Features
//! - File-pick and live-capture acquisition behind one entry point
//! - Encoding conversion and aspect-preserving downscaling
//! - Promise-style, legacy callback and native (nokhwa) camera backends
//! - Explicit registration with the bridge's exec proxy
//!
//! # Usage
//! ```rust,ignore
//! use camera_proxy::{CameraProxy, MediaCapabilities, ProxyConfig};
//! use std::sync::Arc;
//!
//! fn main() {
//!     let camera = Arc::new(CameraProxy::new(page, MediaCapabilities::none(), ProxyConfig::load_or_default()));
//!     tauri::Builder::default()
//!         .plugin(camera_proxy::init(camera))
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod camera;
pub mod commands;
pub mod config;
pub mod data_url;
pub mod errors;
pub mod media;
pub mod normalizer;
pub mod page;
pub mod proxy;
pub mod strategies;
pub mod types;

// Testing utilities - scripted page and media doubles for offline testing
pub mod testing;

// Re-exports for convenience
pub use camera::CameraProxy;
pub use config::ProxyConfig;
pub use data_url::DataUrl;
pub use errors::CameraError;
pub use media::{MediaBackend, MediaCapabilities};
pub use page::Page;
pub use proxy::{register, ExecProxy, ProxyError, CAMERA_SERVICE};
pub use types::{CaptureOptions, EncodingType, SourceMode, TargetSize};

use std::sync::Arc;
use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

/// Initialize the camera plugin. The camera is registered with a fresh exec
/// proxy, and both are managed as app state for the commands.
pub fn init<R: Runtime>(camera: Arc<CameraProxy>) -> TauriPlugin<R> {
    Builder::new("camera")
        .invoke_handler(tauri::generate_handler![
            commands::camera::take_picture,
            commands::camera::cleanup,
            commands::camera::exec,
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
        ])
        .setup(move |app, _api| {
            let exec = Arc::new(ExecProxy::new());
            register(&exec, camera.clone())?;
            app.manage(camera);
            app.manage(exec);
            Ok(())
        })
        .build()
}

/// Initialize logging for the camera proxy
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camera_proxy=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        service: CAMERA_SERVICE.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub service: String,
}
