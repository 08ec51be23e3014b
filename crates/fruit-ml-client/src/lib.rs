//! Client for hosted ripeness classification models.
//!
//! Photos are forwarded to Roboflow's hosted inference API, which answers
//! with class predictions and confidences. The fruit → model table is
//! configuration loaded once at startup.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::RoboflowClient;
pub use config::RoboflowConfig;
pub use error::{MlError, MlResult};
pub use types::Classification;
