//! Equal-width histogram bins used for the rendered charts.

/// Counts of values falling into equal-width bins over `[lower, upper]`.
///
/// The last bin is closed on the right so the maximum value is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<u64>,
}

impl HistogramBins {
    /// One bin per 8-bit intensity, spanning `[0, 256)`.
    pub fn from_u8(pixels: &[u8]) -> Self {
        let mut counts = vec![0u64; 256];
        for &value in pixels {
            counts[value as usize] += 1;
        }
        Self {
            lower: 0.0,
            upper: 256.0,
            counts,
        }
    }

    /// Bins `values` over their observed range.
    ///
    /// A constant sample is centred in a unit-wide range and an empty one
    /// produces empty bins over `[0, 1]`, so the range is never degenerate.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0u64; bins];

        let Some((min, max)) = min_max(values) else {
            return Self {
                lower: 0.0,
                upper: 1.0,
                counts,
            };
        };
        let (lower, upper) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let width = (upper - lower) / bins as f64;
        for &value in values {
            let idx = ((value - lower) / width) as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Self {
            lower,
            upper,
            counts,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len().max(1) as f64
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Iterates `(bin_start, bin_end, count)` triples.
    pub fn iter_bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        let width = self.bin_width();
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let start = self.lower + i as f64 * width;
            (start, start + width, count)
        })
    }
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}
