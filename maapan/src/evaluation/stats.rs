//! Error statistics and per-pass reports.
//!
//! Sums are accumulated sequentially in `f64` over samples in point order.
//! Parallel passes concatenate their per-block samples in block order before
//! calling [`ErrorStatistics::from_samples`], so results are bit-identical
//! regardless of thread count.

use serde::{Deserialize, Serialize};

/// Aggregate of a multiset of non-negative error values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStatistics {
    /// Number of samples
    pub count: usize,

    /// Mean error
    pub mean: f32,

    /// Sample standard deviation; zero below three samples
    pub stddev: f32,

    /// Root mean square error
    pub rmse: f32,

    /// Minimum error
    pub min: f32,

    /// Maximum error
    pub max: f32,
}

impl ErrorStatistics {
    /// Compute statistics from a list of errors.
    pub fn from_samples(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let n = count as f64;

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &s in samples {
            let v = s as f64;
            sum += v;
            sum_sq += v * v;
            min = min.min(s);
            max = max.max(s);
        }
        let mean = sum / n;
        let rmse = (sum_sq / n).sqrt();

        let stddev = if count > 2 {
            let dev: f64 = samples.iter().map(|&s| (s as f64 - mean).powi(2)).sum();
            (dev / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Self {
            count,
            mean: mean as f32,
            stddev: stddev as f32,
            rmse: rmse as f32,
            min,
            max,
        }
    }

    /// Format as a single-line summary.
    pub fn summary(&self) -> String {
        format!(
            "mean: {:.4}, std: {:.4}, rmse: {:.4}, n: {}",
            self.mean, self.stddev, self.rmse, self.count
        )
    }
}

/// Result of driving the ground-truth cloud through the distance field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionReport {
    /// Statistics over the error samples
    pub stats: ErrorStatistics,

    /// Points visited
    pub total_points: u64,

    /// Points outside observed space
    pub unknown_points: u64,

    /// Observed points beyond the maximum distance
    pub truncated_points: u64,

    /// Observed points within the inlier distance
    pub inliers: u64,

    /// False when cancellation stopped the pass early
    pub complete: bool,
}

impl ReconstructionReport {
    /// Points that contributed an error sample.
    #[inline]
    pub fn scored_points(&self) -> u64 {
        self.stats.count as u64
    }

    /// Format as a single-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} | total: {}, unknown: {}, truncated: {}, inliers: {}",
            self.stats.summary(),
            self.total_points,
            self.unknown_points,
            self.truncated_points,
            self.inliers
        )
    }
}

/// Result of driving surface vertices through the spatial index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshReport {
    /// Statistics over vertex-to-ground-truth distances
    pub stats: ErrorStatistics,

    /// Vertices within the inlier distance
    pub inliers: u64,

    /// Vertices beyond the inlier distance
    pub outliers: u64,

    /// False when cancellation stopped the pass early
    pub complete: bool,
}

impl MeshReport {
    /// Format as a single-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} | inliers: {}, outliers: {}",
            self.stats.summary(),
            self.inliers,
            self.outliers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_samples() {
        let stats = ErrorStatistics::from_samples(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.rmse, 0.0);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn test_known_values() {
        let stats = ErrorStatistics::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean, 2.5, epsilon = 1e-6);
        assert_relative_eq!(stats.rmse, 7.5f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(stats.stddev, (5.0f32 / 3.0).sqrt(), epsilon = 1e-6);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_stddev_needs_three_samples() {
        let stats = ErrorStatistics::from_samples(&[0.1, 0.3]);
        assert_eq!(stats.stddev, 0.0);
        assert_relative_eq!(stats.mean, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_rmse_not_below_mean() {
        let samples = [0.0, 0.01, 0.5, 0.2, 0.2, 0.07, 0.13];
        let stats = ErrorStatistics::from_samples(&samples);
        assert!(stats.rmse >= stats.mean - 1e-6);

        let zeros = ErrorStatistics::from_samples(&[0.0; 5]);
        assert_eq!(zeros.rmse, 0.0);
    }
}
