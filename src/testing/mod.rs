//! Testing utilities for the camera proxy
//!
//! Scripted host doubles and synthetic images so the acquisition strategies
//! can be exercised offline, without a document or a camera.

pub mod mock_media;
pub mod mock_page;
pub mod synthetic_data;

pub use mock_media::{MockLegacyUserMedia, MockStream, MockTrack, MockUserMedia};
pub use mock_page::MockPage;
pub use synthetic_data::{synthetic_data_url, synthetic_file, synthetic_image, synthetic_image_bytes};
