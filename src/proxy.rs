//! Exec proxy: the bridge's table of named services
//!
//! Cross-language calls arrive as `(service, action, args)`. Services are
//! added by an explicit call during bridge initialization; nothing registers
//! itself on load.

use crate::camera::CameraProxy;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Name the camera is registered under
pub const CAMERA_SERVICE: &str = "Camera";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("service already registered: {0}")]
    AlreadyRegistered(String),
    #[error("unknown service: {0}")]
    UnknownService(String),
    #[error("service {service} has no action {action}")]
    UnknownAction { service: String, action: String },
    /// The action ran and failed; carries the human-readable message
    #[error("{0}")]
    Failed(String),
    #[error("service table lock poisoned")]
    PoisonedLock,
}

/// A service callable through the bridge
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    fn actions(&self) -> Vec<&'static str>;

    async fn invoke(&self, action: &str, args: Vec<Value>) -> Result<Value, ProxyError>;
}

#[derive(Default)]
pub struct ExecProxy {
    services: RwLock<HashMap<String, Arc<dyn ServiceHandler>>>,
}

impl ExecProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: &str, handler: Arc<dyn ServiceHandler>) -> Result<(), ProxyError> {
        let mut services = self.services.write().map_err(|_| ProxyError::PoisonedLock)?;
        if services.contains_key(name) {
            return Err(ProxyError::AlreadyRegistered(name.to_string()));
        }
        log::info!("Registered service '{}' ({:?})", name, handler.actions());
        services.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn ServiceHandler>> {
        self.services.write().ok()?.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.services
            .read()
            .map(|s| s.contains_key(name))
            .unwrap_or(false)
    }

    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Route a call to the named service
    pub async fn exec(
        &self,
        service: &str,
        action: &str,
        args: Vec<Value>,
    ) -> Result<Value, ProxyError> {
        let handler = {
            let services = self.services.read().map_err(|_| ProxyError::PoisonedLock)?;
            services
                .get(service)
                .cloned()
                .ok_or_else(|| ProxyError::UnknownService(service.to_string()))?
        };
        log::debug!("exec {}.{} with {} args", service, action, args.len());
        handler.invoke(action, args).await
    }
}

#[async_trait]
impl ServiceHandler for CameraProxy {
    fn actions(&self) -> Vec<&'static str> {
        vec!["takePicture", "cleanup"]
    }

    async fn invoke(&self, action: &str, args: Vec<Value>) -> Result<Value, ProxyError> {
        match action {
            "takePicture" => self
                .take_picture_args(&args)
                .await
                .map(|url| Value::String(url.into_string()))
                .map_err(|e| ProxyError::Failed(e.message())),
            "cleanup" => {
                self.cleanup();
                Ok(Value::Null)
            }
            other => Err(ProxyError::UnknownAction {
                service: CAMERA_SERVICE.to_string(),
                action: other.to_string(),
            }),
        }
    }
}

/// Register the camera with the bridge under [`CAMERA_SERVICE`]
pub fn register(proxy: &ExecProxy, camera: Arc<CameraProxy>) -> Result<(), ProxyError> {
    proxy.add(CAMERA_SERVICE, camera)
}
