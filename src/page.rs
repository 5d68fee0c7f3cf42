//! Host page abstraction
//!
//! The acquisition strategies never touch a concrete document. They insert
//! elements, dispatch activation events and wait for user interaction through
//! the [`Page`] trait; a webview bridge, a terminal host or the test doubles in
//! [`crate::testing`] provide the implementation.

use crate::data_url::DataUrl;
use crate::media::MediaStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle of an element inserted into the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(uuid::Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hidden file input restricted to image types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInputSpec {
    pub accept: String,
    pub class_name: String,
    pub hidden: bool,
}

/// Live capture overlay: a video view plus Cancel and Capture buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub class_name: String,
    pub z_index: i32,
    pub video_width: u32,
    pub video_height: u32,
    pub cancel_label: String,
    pub capture_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    FileInput(FileInputSpec),
    CaptureOverlay(OverlaySpec),
}

/// How the host can construct a synthetic event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSupport {
    /// Native event constructors (`new MouseEvent(...)`)
    Native,
    /// Only the legacy `createEvent` + `init*Event` path
    Legacy,
}

/// Synthetic click used to open the file dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationEvent {
    Native {
        kind: String,
        bubbles: bool,
        cancelable: bool,
    },
    Legacy {
        kind: String,
        bubbles: bool,
        cancelable: bool,
        detail: i32,
    },
}

impl ActivationEvent {
    /// Build a bubbling, cancelable click with whatever construction path the
    /// host supports
    pub fn click(support: EventSupport) -> Self {
        match support {
            EventSupport::Native => ActivationEvent::Native {
                kind: "click".to_string(),
                bubbles: true,
                cancelable: true,
            },
            EventSupport::Legacy => ActivationEvent::Legacy {
                kind: "click".to_string(),
                bubbles: true,
                cancelable: true,
                detail: 1,
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            ActivationEvent::Native { kind, .. } | ActivationEvent::Legacy { kind, .. } => kind,
        }
    }

    /// Both construction paths must yield the same user-activation signal
    pub fn is_user_activation(&self) -> bool {
        match self {
            ActivationEvent::Native {
                kind,
                bubbles,
                cancelable,
            } => kind == "click" && *bubbles && *cancelable,
            ActivationEvent::Legacy {
                kind,
                bubbles,
                cancelable,
                detail,
            } => kind == "click" && *bubbles && *cancelable && *detail >= 1,
        }
    }
}

/// A file chosen in the file dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read the file the way `readAsDataURL` does
    pub fn read_as_data_url(&self) -> DataUrl {
        DataUrl::from_bytes(&self.mime_type, &self.bytes)
    }
}

/// Button pressed on the capture overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayAction {
    Cancel,
    Capture,
}

/// The host document
#[async_trait]
pub trait Page: Send + Sync {
    /// Which synthetic event construction path is available
    fn event_support(&self) -> EventSupport;

    /// Append an element to the document body
    fn append(&self, element: Element) -> ElementId;

    /// Remove an element; returns false if it was not in the page
    fn remove(&self, id: ElementId) -> bool;

    fn dispatch(&self, id: ElementId, event: ActivationEvent);

    /// Bind a stream to the overlay's video view and start playback
    fn attach_stream(&self, id: ElementId, stream: Arc<dyn MediaStream>);

    /// Blocking user notification (`alert`)
    fn alert(&self, message: &str);

    /// Resolves when the file input fires its change event
    async fn file_selection(&self, id: ElementId) -> Vec<SelectedFile>;

    /// Resolves when Cancel or Capture is activated on the overlay
    async fn overlay_action(&self, id: ElementId) -> OverlayAction;
}
