use serde::Serialize;

/// Arithmetic mean, ignoring NaN. None when nothing is left.
pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// Sample standard deviation (ddof=1)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin finite values into `bins` equal-width bins spanning [min, max].
///
/// Every bin is half-open except the last, which also holds the maximum.
/// A single distinct value is centered in a range of width 1.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

/// Scott's rule bandwidth: sample std times n^(-1/5)
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std = sample_std(values)?;
    if std <= 0.0 || !std.is_finite() {
        return None;
    }
    Some(std * (values.len() as f64).powf(-0.2))
}

/// Gaussian kernel density estimate evaluated at `points` evenly spaced positions over the
/// data range. Returns None with fewer than two distinct finite values.
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if points < 2 {
        return None;
    }
    let bandwidth = scott_bandwidth(&finite)?;

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n = finite.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;

    let curve = (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = finite
                .iter()
                .map(|xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[f64::NAN]), None);
        assert_eq!(mean(&[6.0, f64::NAN, 8.0]), Some(7.0));
    }

    #[test]
    fn histogram_last_bin_is_closed() {
        let h = histogram(&[0.0, 1.0, 2.0, 10.0], 10);
        assert_eq!(h.edges.len(), 11);
        assert_eq!(h.counts.len(), 10);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[2], 1);
        assert_eq!(h.counts[9], 1);
        assert_eq!(h.total(), 4);
        assert!((h.bin_width() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_single_value_is_widened() {
        let h = histogram(&[7.0, 7.0], 10);
        assert!((h.edges[0] - 6.5).abs() < 1e-12);
        assert!((h.edges[10] - 7.5).abs() < 1e-12);
        assert_eq!(h.total(), 2);
        assert_eq!(h.counts[5], 2);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        let h = histogram(&[f64::NAN], 10);
        assert!(h.is_empty());
        assert_eq!(h.total(), 0);
    }

    #[test]
    fn kde_needs_spread() {
        assert!(gaussian_kde(&[5.0], 50).is_none());
        assert!(gaussian_kde(&[5.0, 5.0, 5.0], 50).is_none());
        let curve = gaussian_kde(&[1.0, 2.0, 3.0, 4.0], 50).unwrap();
        assert_eq!(curve.len(), 50);
        assert_eq!(curve[0].0, 1.0);
        assert!((curve[49].0 - 4.0).abs() < 1e-12);
        assert!(curve.iter().all(|(_, y)| *y > 0.0));
    }

    #[test]
    fn kde_is_symmetric_for_symmetric_data() {
        let curve = gaussian_kde(&[1.0, 2.0, 3.0], 3).unwrap();
        assert!((curve[0].1 - curve[2].1).abs() < 1e-12);
        assert!(curve[1].1 > curve[0].1);
    }
}
