//! Acquisition strategies: where a picture comes from

pub mod file_pick;
pub mod live_capture;

pub use live_capture::AcquisitionSession;
