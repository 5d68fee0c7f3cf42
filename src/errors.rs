use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The file dialog was dismissed without choosing a file
    NoFileSelected,
    /// The decoded bitmap reported a zero width or height
    ImageSizeUnknown,
    /// The user pressed Cancel during live capture
    UserCancelled,
    /// The host exposes no camera media API at all
    CapabilityUnavailable,
    DecodeFailed(String),
    EncodeFailed(String),
    StreamError(String),
    InvalidOptions(String),
    InvalidDataUrl(String),
    ConfigError(String),
}

impl CameraError {
    /// Human-readable message handed to the caller's error channel
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// True for errors caused by the user rather than the host or the image
    pub fn is_user_initiated(&self) -> bool {
        matches!(self, CameraError::NoFileSelected | CameraError::UserCancelled)
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::NoFileSelected => write!(f, "No file selected by user."),
            CameraError::ImageSizeUnknown => write!(f, "Unable to determine image size."),
            CameraError::UserCancelled => write!(f, "User cancelled the capture."),
            CameraError::CapabilityUnavailable => write!(f, "Browser does not support camera :("),
            CameraError::DecodeFailed(msg) => write!(f, "Image decode error: {}", msg),
            CameraError::EncodeFailed(msg) => write!(f, "Image encode error: {}", msg),
            CameraError::StreamError(msg) => write!(f, "Stream error: {}", msg),
            CameraError::InvalidOptions(msg) => write!(f, "Invalid capture options: {}", msg),
            CameraError::InvalidDataUrl(msg) => write!(f, "Invalid data URL: {}", msg),
            CameraError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => CameraError::EncodeFailed(e.to_string()),
            other => CameraError::DecodeFailed(other.to_string()),
        }
    }
}
