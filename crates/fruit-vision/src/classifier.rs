//! Threshold rules mapping a color statistic to a ripeness label.
//!
//! Rules are evaluated in declaration order and the first match wins, so
//! overlapping bands resolve toward the earlier (greener) label. Hue bounds
//! are inclusive on both ends; saturation gates are strict.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use fruit_models::RipenessLabel;

use crate::color::{Hsv, Rgb8};
use crate::sampler::{ColorStatistic, SamplingMode};

/// Saturation constraint attached to a hue band.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SaturationGate {
    Any,
    Above(f64),
    Below(f64),
}

impl SaturationGate {
    fn admits(self, saturation: f64) -> bool {
        match self {
            SaturationGate::Any => true,
            SaturationGate::Above(min) => saturation > min,
            SaturationGate::Below(max) => saturation < max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HueBand {
    min: f64,
    max: f64,
    saturation: SaturationGate,
    label: RipenessLabel,
}

impl HueBand {
    const fn new(min: f64, max: f64, saturation: SaturationGate, label: RipenessLabel) -> Self {
        Self { min, max, saturation, label }
    }

    fn matches(&self, hsv: &Hsv) -> bool {
        hsv.hue >= self.min && hsv.hue <= self.max && self.saturation.admits(hsv.saturation)
    }
}

const HSV_BANDS: [HueBand; 3] = [
    HueBand::new(60.0, 120.0, SaturationGate::Above(0.5), RipenessLabel::Green),
    HueBand::new(40.0, 60.0, SaturationGate::Above(0.5), RipenessLabel::Ripe),
    HueBand::new(20.0, 40.0, SaturationGate::Below(0.7), RipenessLabel::Overripe),
];

const HUE_ONLY_BANDS: [HueBand; 3] = [
    HueBand::new(50.0, 80.0, SaturationGate::Any, RipenessLabel::Green),
    HueBand::new(35.0, 55.0, SaturationGate::Any, RipenessLabel::Ripe),
    HueBand::new(15.0, 35.0, SaturationGate::Any, RipenessLabel::Overripe),
];

const RGB_GREEN_MIN: u8 = 150;
const RGB_RED_MIN: u8 = 150;
const RGB_RIPE_GREEN_MIN: u8 = 100;
const RGB_OVERRIPE_BLUE_MIN: u8 = 100;

fn first_band(bands: &[HueBand], hsv: &Hsv) -> Option<RipenessLabel> {
    bands.iter().find(|band| band.matches(hsv)).map(|band| band.label)
}

fn rgb_dominance(rgb: Rgb8) -> Option<RipenessLabel> {
    let Rgb8 { red: r, green: g, blue: b } = rgb;

    if g > r && g > b && g > RGB_GREEN_MIN {
        Some(RipenessLabel::Green)
    } else if r > g && g > b && r > RGB_RED_MIN && g > RGB_RIPE_GREEN_MIN {
        Some(RipenessLabel::Ripe)
    } else if r > g && b > g && r > RGB_RED_MIN && b > RGB_OVERRIPE_BLUE_MIN {
        Some(RipenessLabel::Overripe)
    } else {
        None
    }
}

/// A named rule set, including how the image must be sampled for it.
///
/// Each policy is one complete chain; policies are never stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Mean RGB converted to HSV, saturation-gated hue bands, then RGB
    /// channel-dominance comparisons before giving up.
    #[default]
    HsvRgbFallback,

    /// Mean RGB converted to HSV, saturation-gated hue bands only.
    HsvThreshold,

    /// Per-pixel HSV averaged, hue bands with no saturation gate.
    HueOnly,
}

impl ClassificationPolicy {
    pub const ALL: &'static [ClassificationPolicy] = &[
        ClassificationPolicy::HsvRgbFallback,
        ClassificationPolicy::HsvThreshold,
        ClassificationPolicy::HueOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationPolicy::HsvRgbFallback => "hsv_rgb_fallback",
            ClassificationPolicy::HsvThreshold => "hsv_threshold",
            ClassificationPolicy::HueOnly => "hue_only",
        }
    }

    /// The sampling mode this policy's thresholds were written against.
    pub fn sampling_mode(&self) -> SamplingMode {
        match self {
            ClassificationPolicy::HsvRgbFallback | ClassificationPolicy::HsvThreshold => {
                SamplingMode::MeanRgb
            }
            ClassificationPolicy::HueOnly => SamplingMode::MeanHsv,
        }
    }

    /// Returns true if this policy falls back to RGB comparisons.
    pub fn uses_rgb_fallback(&self) -> bool {
        matches!(self, ClassificationPolicy::HsvRgbFallback)
    }

    /// Map a statistic to a label.
    ///
    /// The RGB fallback only runs when the statistic carries a mean RGB; an
    /// HSV statistic under [`ClassificationPolicy::HsvRgbFallback`] skips it.
    pub fn classify(&self, stat: &ColorStatistic) -> RipenessLabel {
        let hsv = stat.hsv();

        let banded = match self {
            ClassificationPolicy::HsvRgbFallback | ClassificationPolicy::HsvThreshold => {
                first_band(&HSV_BANDS, &hsv)
            }
            ClassificationPolicy::HueOnly => first_band(&HUE_ONLY_BANDS, &hsv),
        };

        banded
            .or_else(|| {
                if self.uses_rgb_fallback() {
                    stat.rgb().and_then(rgb_dominance)
                } else {
                    None
                }
            })
            .unwrap_or(RipenessLabel::Unknown)
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassificationPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hsv_rgb_fallback" | "hsv_rgb" => Ok(ClassificationPolicy::HsvRgbFallback),
            "hsv_threshold" | "hsv" => Ok(ClassificationPolicy::HsvThreshold),
            "hue_only" | "hue" => Ok(ClassificationPolicy::HueOnly),
            _ => Err(PolicyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown classification policy: {0}")]
pub struct PolicyParseError(String);
