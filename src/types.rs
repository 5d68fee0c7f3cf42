use crate::config::CaptureConfig;
use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encoder quality a drawing surface falls back to when the requested
/// quality is outside 0.0..=1.0
pub const DEFAULT_ENCODER_QUALITY: f32 = 0.92;

/// Positional argument indices consumed from the bridge's options array
const ARG_QUALITY: usize = 0;
const ARG_MODE: usize = 2;
const ARG_WIDTH: usize = 3;
const ARG_HEIGHT: usize = 4;
const ARG_ENCODING: usize = 5;

/// Where the picture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Let the user choose an image file
    FilePick,
    /// Grab a frame from the live camera
    LiveCapture,
}

impl SourceMode {
    /// Mode flag `1` selects the camera; every other value picks a file
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 {
            SourceMode::LiveCapture
        } else {
            SourceMode::FilePick
        }
    }

    pub fn as_flag(&self) -> i64 {
        match self {
            SourceMode::FilePick => 0,
            SourceMode::LiveCapture => 1,
        }
    }
}

/// Output encoding, carried as a lowercase MIME type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingType(String);

impl EncodingType {
    pub fn from_mime(mime: &str) -> Self {
        Self(mime.trim().to_ascii_lowercase())
    }

    pub fn jpeg() -> Self {
        Self::from_mime("image/jpeg")
    }

    pub fn png() -> Self {
        Self::from_mime("image/png")
    }

    /// The framework's numeric encoding enum: 0 = JPEG, 1 = PNG
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::jpeg()),
            1 => Some(Self::png()),
            _ => None,
        }
    }

    pub fn mime(&self) -> &str {
        &self.0
    }

    /// Whether a payload tagged with `tag` already has this encoding
    pub fn matches(&self, tag: &str) -> bool {
        self.0.eq_ignore_ascii_case(tag.trim())
    }

    /// The codec used to write this encoding, if the image stack knows it
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        image::ImageFormat::from_mime_type(&self.0)
    }
}

impl std::fmt::Display for EncodingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller quality on the 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(i64);

impl Quality {
    pub fn new(percent: i64) -> Self {
        Self(percent)
    }

    pub fn percent(&self) -> i64 {
        self.0
    }

    /// Quality on the encoder's 0.0-1.0 scale, `None` when out of range
    pub fn encoder_scale(&self) -> Option<f32> {
        if (0..=100).contains(&self.0) {
            Some(self.0 as f32 / 100.0)
        } else {
            None
        }
    }

    /// Quality passed to the JPEG encoder (1-100)
    pub fn jpeg_quality(&self) -> u8 {
        let scale = self.encoder_scale().unwrap_or(DEFAULT_ENCODER_QUALITY);
        ((scale * 100.0).round() as i64).clamp(1, 100) as u8
    }
}

/// Bounding box for the file-pick path; `None` means "not specified"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Non-positive values (including the `-1` sentinel) are unset
    pub fn from_raw(width: i64, height: i64) -> Self {
        Self {
            width: positive(width),
            height: positive(height),
        }
    }

    /// Both dimensions given
    pub fn is_box(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

fn positive(value: i64) -> Option<u32> {
    if value > 0 {
        Some(value.min(u32::MAX as i64) as u32)
    } else {
        None
    }
}

/// Acquisition parameters for one `take_picture` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOptions {
    pub quality: i64,
    pub mode: SourceMode,
    pub target_width: i64,
    pub target_height: i64,
    pub encoding: EncodingType,
}

impl CaptureOptions {
    pub fn new(mode: SourceMode) -> Self {
        Self {
            quality: 50,
            mode,
            target_width: -1,
            target_height: -1,
            encoding: EncodingType::jpeg(),
        }
    }

    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_target(mut self, width: i64, height: i64) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingType) -> Self {
        self.encoding = encoding;
        self
    }

    /// Build options from the positional array
    /// `[quality, _, mode, width, height, encoding, ...]`.
    pub fn from_args(args: &[Value], defaults: &CaptureConfig) -> Result<Self, CameraError> {
        let quality = int_arg(args, ARG_QUALITY, "quality")?.unwrap_or(defaults.default_quality as i64);
        let mode = mode_arg(args);
        let target_width = int_arg(args, ARG_WIDTH, "targetWidth")?.unwrap_or(-1);
        let target_height = int_arg(args, ARG_HEIGHT, "targetHeight")?.unwrap_or(-1);

        let encoding = match args.get(ARG_ENCODING) {
            None | Some(Value::Null) => EncodingType::from_mime(&defaults.default_encoding),
            Some(Value::String(mime)) => EncodingType::from_mime(mime),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(EncodingType::from_code)
                .ok_or_else(|| {
                    CameraError::InvalidOptions(format!("unknown encoding code: {}", n))
                })?,
            Some(other) => {
                return Err(CameraError::InvalidOptions(format!(
                    "encoding must be a MIME string or code, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            quality,
            mode,
            target_width,
            target_height,
            encoding,
        })
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Bounding box used when normalizing a picked file
    pub fn file_target(&self) -> TargetSize {
        TargetSize::from_raw(self.target_width, self.target_height)
    }

    /// Requested camera resolution, substituting defaults for unset values
    pub fn live_target(&self, default_width: u32, default_height: u32) -> (u32, u32) {
        (
            positive(self.target_width).unwrap_or(default_width),
            positive(self.target_height).unwrap_or(default_height),
        )
    }
}

/// Only a numeric 1 selects the camera; anything else, strings included,
/// picks a file
fn mode_arg(args: &[Value]) -> SourceMode {
    let flag = match args.get(ARG_MODE) {
        Some(Value::Number(n)) if n.as_f64() == Some(1.0) => 1,
        _ => 0,
    };
    SourceMode::from_flag(flag)
}

fn int_arg(args: &[Value], index: usize, name: &str) -> Result<Option<i64>, CameraError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| CameraError::InvalidOptions(format!("{} is not a number", name))),
        Some(other) => Err(CameraError::InvalidOptions(format!(
            "{} must be a number, got {}",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_args_reads_positional_slots() {
        let args = vec![json!(80), json!(0), json!(1), json!(640), json!(480), json!("image/png")];
        let options = CaptureOptions::from_args(&args, &CaptureConfig::default()).unwrap();
        assert_eq!(options.quality, 80);
        assert_eq!(options.mode, SourceMode::LiveCapture);
        assert_eq!(options.target_width, 640);
        assert_eq!(options.target_height, 480);
        assert_eq!(options.encoding, EncodingType::png());
    }

    #[test]
    fn test_from_args_defaults() {
        let defaults = CaptureConfig::default();
        let options = CaptureOptions::from_args(&[], &defaults).unwrap();
        assert_eq!(options.mode, SourceMode::FilePick);
        assert_eq!(options.quality, defaults.default_quality as i64);
        assert_eq!(options.encoding.mime(), defaults.default_encoding);
        assert!(!options.file_target().is_box());
    }

    #[test]
    fn test_numeric_encoding_codes() {
        let args = vec![json!(50), json!(0), json!(0), json!(10), json!(10), json!(0)];
        let options = CaptureOptions::from_args(&args, &CaptureConfig::default()).unwrap();
        assert_eq!(options.encoding, EncodingType::jpeg());

        let bad = vec![json!(50), json!(0), json!(0), json!(10), json!(10), json!(7)];
        assert!(CaptureOptions::from_args(&bad, &CaptureConfig::default()).is_err());
    }

    #[test]
    fn test_non_numeric_quality_rejected() {
        let args = vec![json!("high")];
        let err = CaptureOptions::from_args(&args, &CaptureConfig::default()).unwrap_err();
        assert!(matches!(err, CameraError::InvalidOptions(_)));
    }

    #[test]
    fn test_quality_scale() {
        assert_eq!(Quality::new(80).encoder_scale(), Some(0.8));
        assert_eq!(Quality::new(80).jpeg_quality(), 80);
        assert_eq!(Quality::new(0).jpeg_quality(), 1);
        assert_eq!(Quality::new(150).encoder_scale(), None);
        assert_eq!(Quality::new(150).jpeg_quality(), 92);
    }

    #[test]
    fn test_sentinel_targets() {
        let options = CaptureOptions::new(SourceMode::LiveCapture).with_target(-1, -1);
        assert_eq!(options.live_target(320, 240), (320, 240));
        assert_eq!(options.file_target(), TargetSize::unbounded());

        let options = options.with_target(200, -1);
        assert_eq!(options.live_target(320, 240), (200, 240));
        assert_eq!(options.file_target().width, Some(200));
        assert!(!options.file_target().is_box());
    }

    #[test]
    fn test_mode_slot_requires_exact_one() {
        let defaults = CaptureConfig::default();
        let with_mode = |mode: Value| {
            vec![json!(50), json!(0), mode, json!(-1), json!(-1), json!("image/png")]
        };

        let live = CaptureOptions::from_args(&with_mode(json!(1)), &defaults).unwrap();
        assert_eq!(live.mode, SourceMode::LiveCapture);
        let live = CaptureOptions::from_args(&with_mode(json!(1.0)), &defaults).unwrap();
        assert_eq!(live.mode, SourceMode::LiveCapture);

        for other in [json!(1.5), json!(0.9), json!("1"), json!(true), json!(null), json!(2)] {
            let options = CaptureOptions::from_args(&with_mode(other.clone()), &defaults).unwrap();
            assert_eq!(options.mode, SourceMode::FilePick, "mode slot {}", other);
        }
    }

    #[test]
    fn test_mode_flag() {
        assert_eq!(SourceMode::from_flag(1), SourceMode::LiveCapture);
        assert_eq!(SourceMode::from_flag(0), SourceMode::FilePick);
        assert_eq!(SourceMode::from_flag(2), SourceMode::FilePick);
    }
}
