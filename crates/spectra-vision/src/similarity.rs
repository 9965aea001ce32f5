//! Structural similarity (SSIM) between equally sized RGB images.
//!
//! Uses a 7x7 uniform window with sample covariance, `K1 = 0.01`,
//! `K2 = 0.03` and a data range of 255. Only windows that lie fully inside
//! the image contribute, and the score is the mean over the three channels.

use image::RgbImage;
use spectra_types::Result;

use crate::vision_error;

const WINDOW: u32 = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

pub fn structural_similarity(a: &RgbImage, b: &RgbImage) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(vision_error(format!(
            "similarity inputs differ in size: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let (width, height) = a.dimensions();
    if width < WINDOW || height < WINDOW {
        return Err(vision_error(format!(
            "similarity needs at least {WINDOW}x{WINDOW} pixels, got {width}x{height}"
        )));
    }

    let total: f64 = (0..3).map(|channel| channel_similarity(a, b, channel)).sum();
    Ok(total / 3.0)
}

fn channel_similarity(a: &RgbImage, b: &RgbImage, channel: usize) -> f64 {
    let (width, height) = a.dimensions();
    let x = |px: u32, py: u32| a.get_pixel(px, py)[channel] as f64;
    let y = |px: u32, py: u32| b.get_pixel(px, py)[channel] as f64;

    let sum_x = SummedArea::build(width, height, &x);
    let sum_y = SummedArea::build(width, height, &y);
    let sum_xx = SummedArea::build(width, height, |px, py| x(px, py) * x(px, py));
    let sum_yy = SummedArea::build(width, height, |px, py| y(px, py) * y(px, py));
    let sum_xy = SummedArea::build(width, height, |px, py| x(px, py) * y(px, py));

    let np = (WINDOW * WINDOW) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut windows = 0usize;
    for top in 0..=(height - WINDOW) {
        for left in 0..=(width - WINDOW) {
            let ux = sum_x.window(left, top) / np;
            let uy = sum_y.window(left, top) / np;
            let uxx = sum_xx.window(left, top) / np;
            let uyy = sum_yy.window(left, top) / np;
            let uxy = sum_xy.window(left, top) / np;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            windows += 1;
        }
    }
    total / windows as f64
}

/// Summed-area table for constant-time window sums.
struct SummedArea {
    stride: usize,
    sums: Vec<f64>,
}

impl SummedArea {
    fn build(width: u32, height: u32, value: impl Fn(u32, u32) -> f64) -> Self {
        let stride = width as usize + 1;
        let mut sums = vec![0.0; stride * (height as usize + 1)];
        for py in 0..height {
            let mut row = 0.0;
            for px in 0..width {
                row += value(px, py);
                let idx = (py as usize + 1) * stride + px as usize + 1;
                sums[idx] = sums[idx - stride] + row;
            }
        }
        Self { stride, sums }
    }

    fn window(&self, left: u32, top: u32) -> f64 {
        let (x0, y0) = (left as usize, top as usize);
        let (x1, y1) = (x0 + WINDOW as usize, y0 + WINDOW as usize);
        self.sums[y1 * self.stride + x1] - self.sums[y0 * self.stride + x1]
            - self.sums[y1 * self.stride + x0]
            + self.sums[y0 * self.stride + x0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checkerboard(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn identical_images_score_one() {
        let image = RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 13) as u8, (y * 17) as u8, 90]));
        let score = structural_similarity(&image, &image).expect("same size");
        assert!((score - 1.0).abs() < 1e-9, "score {score}");
    }

    #[test]
    fn flat_image_does_not_match_pattern() {
        let pattern = checkerboard(16);
        let flat = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
        let score = structural_similarity(&flat, &pattern).expect("same size");
        assert!(score < 0.1, "score {score}");
    }

    #[test]
    fn inverted_pattern_scores_negative() {
        let pattern = checkerboard(16);
        let inverted = RgbImage::from_fn(16, 16, |x, y| {
            let p = pattern.get_pixel(x, y);
            Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
        });
        let score = structural_similarity(&pattern, &inverted).expect("same size");
        assert!(score < 0.0, "score {score}");
    }

    #[test]
    fn mismatched_or_tiny_inputs_are_rejected() {
        let a = RgbImage::new(16, 16);
        let b = RgbImage::new(16, 15);
        assert!(structural_similarity(&a, &b).is_err());
        let tiny = RgbImage::new(6, 6);
        assert!(structural_similarity(&tiny, &tiny).is_err());
    }
}
