//! RGB to HSV color-space conversion.

use serde::Serialize;

/// An 8-bit RGB triple. Alpha never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rgb8 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb8 {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Convert to HSV.
    pub fn to_hsv(self) -> Hsv {
        rgb_to_hsv(self.red, self.green, self.blue)
    }
}

impl From<image::Rgb<u8>> for Rgb8 {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [red, green, blue] = pixel.0;
        Self { red, green, blue }
    }
}

/// A color in HSV space.
///
/// Hue is in degrees within `[0, 360)`; saturation and value are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    pub const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self { hue, saturation, value }
    }
}

/// Convert an 8-bit RGB triple to HSV.
///
/// Achromatic inputs (`r == g == b`) have hue 0 and saturation 0. When two
/// channels tie for the maximum, red wins over green and green over blue.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let rf = f64::from(r) / 255.0;
    let gf = f64::from(g) / 255.0;
    let bf = f64::from(b) / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == gf {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        hue,
        saturation,
        value: max,
    }
}
