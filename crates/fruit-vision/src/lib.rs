//! Local ripeness analysis from pixel color statistics.
//!
//! The pipeline is decode → sample → classify:
//! - [`color`] converts 8-bit RGB triples to HSV
//! - [`sampler`] aggregates an image into a single color statistic
//! - [`classifier`] maps that statistic to a [`RipenessLabel`] under a named policy
//! - [`analyzer`] exposes the whole pipeline through the [`FruitAnalyzer`] capability
//!
//! Everything here is synchronous and stateless. Callers running inside an
//! async runtime should move analysis onto a blocking thread.

pub mod analyzer;
pub mod classifier;
pub mod color;
pub mod decode;
pub mod error;
pub mod sampler;

pub use analyzer::{BananaAnalyzer, FruitAnalyzer};
pub use classifier::{ClassificationPolicy, PolicyParseError};
pub use color::{rgb_to_hsv, Hsv, Rgb8};
pub use decode::decode_image;
pub use error::{VisionError, VisionResult};
pub use fruit_models::RipenessLabel;
pub use sampler::{sample, ColorStatistic, SamplingMode};
