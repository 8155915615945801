//! Otsu's global threshold

const NUM_BUCKETS: usize = 256;

/// Result of Otsu's threshold computation
#[derive(Debug, Clone, Copy)]
pub struct OtsuResult {
    /// Optimal threshold value (0.0-1.0)
    pub threshold: f32,
    /// Histogram bucket of the threshold; buckets above it form the upper class
    pub bucket: usize,
    /// Inter-class variance at the threshold
    pub variance: f32,
    /// Ratio of samples at or below the threshold
    pub below_ratio: f32,
}

impl OtsuResult {
    /// Whether `value` falls in the upper class.
    #[inline]
    pub fn is_above(&self, value: f32) -> bool {
        bucket_of(value) > self.bucket
    }
}

#[inline]
fn bucket_of(value: f32) -> usize {
    let v = if value.is_finite() { value } else { 0.0 };
    ((v.clamp(0.0, 1.0) * (NUM_BUCKETS - 1) as f32) as usize).min(NUM_BUCKETS - 1)
}

/// Otsu's method on samples in 0.0-1.0
///
/// Builds a 256-bucket histogram and picks the bucket that maximizes the
/// inter-class variance. When several buckets tie, the middle one wins.
pub fn otsu_threshold(data: &[f32]) -> OtsuResult {
    let mut histogram = [0u32; NUM_BUCKETS];
    for &value in data {
        histogram[bucket_of(value)] += 1;
    }

    let total = data.len() as f64;
    if total < 2.0 {
        return OtsuResult {
            threshold: 0.5,
            bucket: NUM_BUCKETS / 2,
            variance: 0.0,
            below_ratio: 0.5,
        };
    }

    let mut cum_sum = [0.0f64; NUM_BUCKETS];
    let mut cum_mean = [0.0f64; NUM_BUCKETS];
    let mut running_sum = 0.0;
    let mut running_mean = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        let p = count as f64 / total;
        running_sum += p;
        running_mean += i as f64 * p;
        cum_sum[i] = running_sum;
        cum_mean[i] = running_mean;
    }
    let global_mean = cum_mean[NUM_BUCKETS - 1];

    // Empty buckets between the classes tie; take the middle of the tied run
    let mut max_variance = 0.0f64;
    let mut first = 0usize;
    let mut last = 0usize;
    for t in 0..NUM_BUCKETS - 1 {
        let w0 = cum_sum[t];
        let w1 = 1.0 - w0;
        if w0 < 1e-10 || w1 < 1e-10 {
            continue;
        }
        let mu0 = cum_mean[t] / w0;
        let mu1 = (global_mean - cum_mean[t]) / w1;
        let variance = w0 * w1 * (mu0 - mu1) * (mu0 - mu1);
        let tolerance = max_variance * 1e-9;
        if variance > max_variance + tolerance {
            max_variance = variance;
            first = t;
            last = t;
        } else if variance >= max_variance - tolerance && max_variance > 0.0 {
            last = t;
        }
    }
    let optimal = (first + last) / 2;

    OtsuResult {
        threshold: optimal as f32 / (NUM_BUCKETS - 1) as f32,
        bucket: optimal,
        variance: max_variance as f32,
        below_ratio: cum_sum[optimal] as f32,
    }
}
