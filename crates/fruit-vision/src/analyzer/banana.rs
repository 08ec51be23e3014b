//! Banana ripeness from average peel color.

use image::RgbImage;
use tracing::debug;

use fruit_models::RipenessLabel;

use crate::analyzer::FruitAnalyzer;
use crate::classifier::ClassificationPolicy;
use crate::decode::decode_image;
use crate::error::VisionResult;
use crate::sampler::sample;

/// Banana analyzer.
///
/// Green peel reads as hue 60-120, a yellow peel as 40-60 and a brown,
/// spotted peel as a duller 20-40. The policy decides which rule set
/// applies and how the photo is sampled.
#[derive(Debug, Clone, Copy, Default)]
pub struct BananaAnalyzer {
    policy: ClassificationPolicy,
}

impl BananaAnalyzer {
    /// Create an analyzer using the given policy.
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    /// Classify an already-decoded image.
    pub fn analyze_image(&self, image: &RgbImage) -> RipenessLabel {
        let stat = sample(image, self.policy.sampling_mode());
        let label = self.policy.classify(&stat);
        let hsv = stat.hsv();

        debug!(
            policy = %self.policy,
            width = image.width(),
            height = image.height(),
            mean_rgb = ?stat.rgb(),
            hue = hsv.hue,
            saturation = hsv.saturation,
            value = hsv.value,
            label = %label,
            "Banana color statistics"
        );

        label
    }
}

impl FruitAnalyzer for BananaAnalyzer {
    fn analyze(&self, image_bytes: &[u8]) -> VisionResult<RipenessLabel> {
        let image = decode_image(image_bytes)?;
        // Alpha is dropped here; 16-bit images are scaled down to 8 bits.
        Ok(self.analyze_image(&image.to_rgb8()))
    }

    fn name(&self) -> &'static str {
        "banana"
    }
}
