//! Fruit analyzers.
//!
//! Each fruit type has its own analyzer implementing the [`FruitAnalyzer`]
//! capability. Callers hold `Arc<dyn FruitAnalyzer>` and never name a
//! concrete type, so new fruits plug in without touching existing ones.

use fruit_models::RipenessLabel;

use crate::error::VisionResult;

pub mod banana;

pub use banana::BananaAnalyzer;

/// Ripeness analysis for one fruit type.
pub trait FruitAnalyzer: Send + Sync {
    /// Decode `image_bytes` and classify the fruit in it.
    ///
    /// Fails only when the bytes are not a decodable raster image.
    fn analyze(&self, image_bytes: &[u8]) -> VisionResult<RipenessLabel>;

    /// Analyzer name for logging.
    fn name(&self) -> &'static str;
}
