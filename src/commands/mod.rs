pub mod camera;
pub mod config;

pub use camera::*;
pub use config::*;
