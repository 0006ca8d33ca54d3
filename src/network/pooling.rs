/// Number of pooled statistics per channel.
pub const STATS_PER_CHANNEL: usize = 4;

/// Order-invariant summary of one flattened cloud: per-channel mean, max,
/// min and standard deviation, laid out channel by channel.
pub fn pool_cloud(cloud: &[f64], num_channel: usize) -> Vec<f64> {
    let n = (cloud.len() / num_channel.max(1)).max(1) as f64;
    let mut features = Vec::with_capacity(num_channel * STATS_PER_CHANNEL);

    for c in 0..num_channel {
        let values = cloud.iter().skip(c).step_by(num_channel);
        let (mut sum, mut sum_sq) = (0.0, 0.0);
        let (mut max, mut min) = (f64::NEG_INFINITY, f64::INFINITY);
        for &v in values {
            sum += v;
            sum_sq += v * v;
            max = max.max(v);
            min = min.min(v);
        }
        let mean = sum / n;
        let var = (sum_sq / n - mean * mean).max(0.0);
        features.extend([mean, max, min, var.sqrt()]);
    }

    features
}
