use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Per-channel population mean and standard deviation of an RGB image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

impl ChannelStats {
    /// An empty image yields all-zero statistics.
    pub fn of(image: &RgbImage) -> Self {
        let count = image.width() as usize * image.height() as usize;
        if count == 0 {
            return Self::default();
        }
        let mut sum = [0f64; 3];
        let mut sum_sq = [0f64; 3];
        for pixel in image.pixels() {
            for channel in 0..3 {
                let value = pixel[channel] as f64;
                sum[channel] += value;
                sum_sq[channel] += value * value;
            }
        }
        let n = count as f64;
        let mut stats = Self::default();
        for channel in 0..3 {
            let mean = sum[channel] / n;
            let variance = (sum_sq[channel] / n - mean * mean).max(0.0);
            stats.mean[channel] = mean;
            stats.std_dev[channel] = variance.sqrt();
        }
        stats
    }

    pub fn max_std_dev(&self) -> f64 {
        self.std_dev.iter().copied().fold(0.0, f64::max)
    }

    /// Mean of the three channel means.
    pub fn combined_mean(&self) -> f64 {
        self.mean.iter().sum::<f64>() / 3.0
    }
}
