//! `data:` URL payloads
//!
//! Every image that leaves this crate is a self-describing data URL:
//! `data:<mime>[;base64],<body>`. The MIME type embedded in the header is the
//! payload's encoding tag, which the normalizer compares against the requested
//! output encoding.

use crate::errors::CameraError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME type a file reader reports for files with no known type
pub const FALLBACK_MIME: &str = "application/octet-stream";

const SCHEME: &str = "data:";

/// A validated `data:` URL string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl(String);

impl DataUrl {
    /// Validate an existing data URL string
    pub fn parse(value: impl Into<String>) -> Result<Self, CameraError> {
        let value = value.into();
        if !value.starts_with(SCHEME) {
            return Err(CameraError::InvalidDataUrl(
                "missing 'data:' scheme".to_string(),
            ));
        }
        if !value.contains(',') {
            return Err(CameraError::InvalidDataUrl(
                "missing ',' between header and body".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Base64-encode raw bytes under the given MIME type, the way a file
    /// reader produces `readAsDataURL` output
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let mime = if mime_type.trim().is_empty() {
            FALLBACK_MIME
        } else {
            mime_type.trim()
        };
        Self(format!("{}{};base64,{}", SCHEME, mime, STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn header(&self) -> &str {
        let end = self.0.find(',').unwrap_or(self.0.len());
        &self.0[SCHEME.len()..end]
    }

    fn body(&self) -> &str {
        match self.0.find(',') {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// The embedded encoding tag, e.g. `image/png`
    pub fn mime_type(&self) -> &str {
        self.header().split(';').next().unwrap_or("")
    }

    pub fn is_base64(&self) -> bool {
        self.header()
            .split(';')
            .skip(1)
            .any(|param| param.eq_ignore_ascii_case("base64"))
    }

    /// Whether the URL starts with `data:<mime>`
    pub fn has_mime_prefix(&self, mime: &str) -> bool {
        self.mime_type().eq_ignore_ascii_case(mime)
    }

    /// Decode the body into raw bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>, CameraError> {
        if self.is_base64() {
            STANDARD
                .decode(self.body().trim())
                .map_err(|e| CameraError::InvalidDataUrl(format!("bad base64 body: {}", e)))
        } else {
            Ok(urlencoding::decode_binary(self.body().as_bytes()).into_owned())
        }
    }

    /// Size of the URL string in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The payload after the header carries no data
    pub fn has_empty_body(&self) -> bool {
        self.body().is_empty()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DataUrl {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = CameraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> Self {
        url.0
    }
}
