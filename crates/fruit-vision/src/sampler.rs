//! Whole-image color statistics.
//!
//! Rows are summed in parallel and the per-row partial sums are combined in
//! row order, so the result does not depend on how many threads ran.

use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;

use crate::color::{rgb_to_hsv, Hsv, Rgb8};

const CHANNELS: usize = 3;

/// How pixels are aggregated.
///
/// The two modes are not interchangeable: averaging hue angles after
/// conversion differs from converting the averaged color, which moves the
/// classification boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Average the channels at 16-bit depth, convert later.
    MeanRgb,
    /// Convert every pixel to HSV, then average hue, saturation and value.
    MeanHsv,
}

/// Aggregate color of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum ColorStatistic {
    Rgb(Rgb8),
    Hsv(Hsv),
}

impl ColorStatistic {
    /// The statistic of an image with no pixels.
    pub fn zero(mode: SamplingMode) -> Self {
        match mode {
            SamplingMode::MeanRgb => ColorStatistic::Rgb(Rgb8::default()),
            SamplingMode::MeanHsv => ColorStatistic::Hsv(Hsv::default()),
        }
    }

    /// HSV view of the statistic, converting a mean RGB if needed.
    pub fn hsv(&self) -> Hsv {
        match self {
            ColorStatistic::Rgb(rgb) => rgb.to_hsv(),
            ColorStatistic::Hsv(hsv) => *hsv,
        }
    }

    /// The mean RGB, if this statistic was sampled in RGB.
    pub fn rgb(&self) -> Option<Rgb8> {
        match self {
            ColorStatistic::Rgb(rgb) => Some(*rgb),
            ColorStatistic::Hsv(_) => None,
        }
    }
}

/// Aggregate every pixel of `image` into one statistic.
///
/// An image with zero width or height yields [`ColorStatistic::zero`].
pub fn sample(image: &RgbImage, mode: SamplingMode) -> ColorStatistic {
    let (width, height) = image.dimensions();
    let pixel_count = u64::from(width) * u64::from(height);
    if pixel_count == 0 {
        return ColorStatistic::zero(mode);
    }

    let row_len = width as usize * CHANNELS;
    let pixels = &image.as_raw()[..row_len * height as usize];

    match mode {
        SamplingMode::MeanRgb => ColorStatistic::Rgb(mean_rgb(pixels, row_len, pixel_count)),
        SamplingMode::MeanHsv => ColorStatistic::Hsv(mean_hsv(pixels, row_len, pixel_count)),
    }
}

fn mean_rgb(pixels: &[u8], row_len: usize, pixel_count: u64) -> Rgb8 {
    // Integer sums are exact, so reduction order is irrelevant here.
    let [red, green, blue] = pixels
        .par_chunks_exact(row_len)
        .map(|row| {
            row.chunks_exact(CHANNELS).fold([0u64; 3], |mut acc, px| {
                acc[0] += u64::from(px[0]);
                acc[1] += u64::from(px[1]);
                acc[2] += u64::from(px[2]);
                acc
            })
        })
        .reduce(|| [0u64; 3], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]]);

    Rgb8::new(
        channel_mean(red, pixel_count),
        channel_mean(green, pixel_count),
        channel_mean(blue, pixel_count),
    )
}

/// Mean of an 8-bit channel, taken at 16-bit depth (`c * 257`) and shifted
/// back down. Fractions of roughly one half or more round up.
fn channel_mean(sum: u64, pixel_count: u64) -> u8 {
    // At most 0xFFFF before the shift.
    ((sum * 257 / pixel_count) >> 8) as u8
}

fn mean_hsv(pixels: &[u8], row_len: usize, pixel_count: u64) -> Hsv {
    let row_sums: Vec<[f64; 3]> = pixels
        .par_chunks_exact(row_len)
        .map(|row| {
            row.chunks_exact(CHANNELS).fold([0.0f64; 3], |mut acc, px| {
                let hsv = rgb_to_hsv(px[0], px[1], px[2]);
                acc[0] += hsv.hue;
                acc[1] += hsv.saturation;
                acc[2] += hsv.value;
                acc
            })
        })
        .collect();

    let [hue, saturation, value] = row_sums
        .iter()
        .fold([0.0f64; 3], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]]);

    let n = pixel_count as f64;
    Hsv::new(hue / n, saturation / n, value / n)
}
