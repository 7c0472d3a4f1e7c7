use crate::histogram::min_max;

/// Global threshold by Otsu's method.
///
/// Values are binned into `bins` equal-width bins over their observed range
/// and the returned threshold is the centre of the bin that maximises the
/// between-class variance. When at least two distinct values are present the
/// result lies strictly between the minimum and the maximum. A constant input
/// returns that constant; an empty input returns `None`.
pub fn otsu_threshold(values: &[f64], bins: usize) -> Option<f64> {
    let (min, max) = min_max(values)?;
    if min == max || bins < 2 {
        return Some(min);
    }

    let width = (max - min) / bins as f64;
    let mut histogram = vec![0u64; bins];
    for &value in values {
        let idx = ((value - min) / width) as usize;
        histogram[idx.min(bins - 1)] += 1;
    }

    let center = |idx: usize| min + (idx as f64 + 0.5) * width;

    let total = values.len() as f64;
    let mut sum_total = 0f64;
    for (idx, &count) in histogram.iter().enumerate() {
        sum_total += center(idx) * count as f64;
    }

    let mut sum_background = 0f64;
    let mut weight_background = 0f64;
    let mut max_variance = f64::MIN;
    let mut best = 0usize;

    for (idx, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }

        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += center(idx) * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;
        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);

        if variance > max_variance {
            max_variance = variance;
            best = idx;
        }
    }

    Some(center(best))
}

#[cfg(test)]
mod tests {
    use super::otsu_threshold;

    #[test]
    fn empty_has_no_threshold() {
        assert_eq!(otsu_threshold(&[], 256), None);
    }

    #[test]
    fn constant_returns_value() {
        assert_eq!(otsu_threshold(&[0.4; 10], 256), Some(0.4));
    }

    #[test]
    fn two_levels_split_between_them() {
        let mut values = vec![0.1; 50];
        values.extend(std::iter::repeat_n(0.9, 50));
        let t = otsu_threshold(&values, 256).expect("threshold");
        assert!(t > 0.1 && t < 0.9, "threshold {t}");
    }

    #[test]
    fn threshold_strictly_inside_range() {
        // Deterministic pseudo-random sample with an uneven spread.
        let mut state = 12345u64;
        let values: Vec<f64> = (0..2000)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let u = (state >> 11) as f64 / (1u64 << 53) as f64;
                if u < 0.3 { u * 0.5 } else { 0.4 + u * 0.6 }
            })
            .collect();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let t = otsu_threshold(&values, 256).expect("threshold");
        assert!(lo < t && t < hi, "{lo} < {t} < {hi}");
    }

    #[test]
    fn separates_bimodal_clusters() {
        let mut values: Vec<f64> = (0..100).map(|i| 0.05 + i as f64 * 0.001).collect();
        values.extend((0..100).map(|i| 0.8 + i as f64 * 0.001));
        let t = otsu_threshold(&values, 256).expect("threshold");
        assert!(t > 0.1 && t < 0.8, "threshold {t}");
    }
}
