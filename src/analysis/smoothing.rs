//! Savitzky–Golay smoothing
//!
//! Least-squares polynomial smoothing over a sliding, centered window. The
//! interior of the trace uses the fixed center weights; the first and last
//! `window / 2` outputs are evaluated from the polynomial fitted to the
//! first (respectively last) full window, so no padding is invented at the
//! edges.

use crate::config::AnalysisConfig;

/// A Savitzky–Golay filter with a fixed odd window and polynomial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavitzkyGolay {
    window: usize,
    order: usize,
}

impl SavitzkyGolay {
    /// Create a filter. Returns `None` unless `window` is odd and
    /// `order < window`.
    pub fn new(window: usize, order: usize) -> Option<Self> {
        (window % 2 == 1 && order < window).then_some(Self { window, order })
    }

    /// Pick the filter for a trace of `n` samples.
    ///
    /// Window length is `min(max_window, (n / 2) * 2 + 1)`, stepped down to
    /// the largest odd value not exceeding `n`; order is
    /// `min(max_order, window - 1)`.
    pub fn for_len(n: usize, config: &AnalysisConfig) -> Self {
        let mut window = config.max_window_length.min((n / 2) * 2 + 1);
        if window > n {
            window = window.saturating_sub(2).max(1);
        }
        let order = config.max_poly_order.min(window - 1);
        Self { window, order }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Weights that evaluate the fitted polynomial at offset `at` from the
    /// window center (`at = 0.0` gives the classic convolution weights).
    pub fn weights(&self, at: f64) -> Vec<f64> {
        let half = (self.window / 2) as f64;
        let positions: Vec<f64> = (0..self.window).map(|i| i as f64 - half).collect();
        let terms = self.order + 1;

        // Normal equations (AᵀA) x = e(at), with A[i][j] = t_i^j.
        let mut normal = vec![vec![0.0; terms]; terms];
        for (j, row) in normal.iter_mut().enumerate() {
            for (k, cell) in row.iter_mut().enumerate() {
                *cell = positions.iter().map(|t| t.powi((j + k) as i32)).sum::<f64>();
            }
        }
        let rhs: Vec<f64> = (0..terms).map(|j| at.powi(j as i32)).collect();
        let x = solve(normal, rhs);

        positions
            .iter()
            .map(|t| {
                x.iter()
                    .enumerate()
                    .map(|(j, xj)| xj * t.powi(j as i32))
                    .sum::<f64>()
            })
            .collect()
    }

    /// Smooth `y`. Traces shorter than the window are returned unchanged.
    pub fn apply(&self, y: &[f64]) -> Vec<f64> {
        let n = y.len();
        if n < self.window {
            return y.to_vec();
        }
        let half = self.window / 2;
        let mut out = vec![0.0; n];

        let center = self.weights(0.0);
        for i in half..n - half {
            out[i] = dot(&center, &y[i - half..=i + half]);
        }

        let head = &y[..self.window];
        let tail = &y[n - self.window..];
        for k in 0..half {
            let offset = k as f64 - half as f64;
            out[k] = dot(&self.weights(offset), head);
            out[n - 1 - k] = dot(&self.weights(-offset), tail);
        }
        out
    }
}

/// Smooth an amplitude trace with the window/order chosen for its length.
pub fn smooth(amplitudes: &[f64], config: &AnalysisConfig) -> Vec<f64> {
    if amplitudes.is_empty() {
        return Vec::new();
    }
    SavitzkyGolay::for_len(amplitudes.len(), config).apply(amplitudes)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Gaussian elimination with partial pivoting on a small dense system.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < tol, "index {i}: {a} vs {e}");
        }
    }

    #[test]
    fn center_weights_match_published_tables() {
        let five = SavitzkyGolay::new(5, 2).unwrap().weights(0.0);
        let expected: Vec<f64> = [-3.0, 12.0, 17.0, 12.0, -3.0].iter().map(|v| v / 35.0).collect();
        assert_close(&five, &expected, 1e-12);

        let seven = SavitzkyGolay::new(7, 2).unwrap().weights(0.0);
        let expected: Vec<f64> = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0]
            .iter()
            .map(|v| v / 21.0)
            .collect();
        assert_close(&seven, &expected, 1e-12);
    }

    #[test]
    fn window_follows_sample_count() {
        let config = AnalysisConfig::default();
        let pick = |n| {
            let sg = SavitzkyGolay::for_len(n, &config);
            (sg.window(), sg.order())
        };
        assert_eq!(pick(3), (3, 2));
        assert_eq!(pick(4), (3, 2));
        assert_eq!(pick(5), (5, 2));
        assert_eq!(pick(10), (9, 2));
        assert_eq!(pick(11), (11, 2));
        assert_eq!(pick(500), (11, 2));
    }

    #[test]
    fn rejects_even_window_and_excess_order() {
        assert!(SavitzkyGolay::new(4, 2).is_none());
        assert!(SavitzkyGolay::new(3, 3).is_none());
        assert!(SavitzkyGolay::new(3, 2).is_some());
    }

    #[test]
    fn quadratic_trace_is_reproduced_including_edges() {
        let y: Vec<f64> = (0..30)
            .map(|i| {
                let t = i as f64;
                -0.05 * t * t + 1.5 * t - 20.0
            })
            .collect();
        let smoothed = smooth(&y, &AnalysisConfig::default());
        assert_close(&smoothed, &y, 1e-9);
    }

    #[test]
    fn three_samples_are_interpolated_exactly() {
        let y = [-7.0, 2.0, -3.0];
        assert_close(&smooth(&y, &AnalysisConfig::default()), &y, 1e-12);
    }

    #[test]
    fn five_point_peak_matches_reference_fit() {
        // Quadratic least-squares fit over the whole window: a + c·t² with
        // a = 12/7 and c = -90/7.
        let smoothed = smooth(&[-50.0, -10.0, 0.0, -10.0, -50.0], &AnalysisConfig::default());
        let a = 12.0 / 7.0;
        let c = -90.0 / 7.0;
        let expected = [a + 4.0 * c, a + c, a, a + c, a + 4.0 * c];
        assert_close(&smoothed, &expected, 1e-9);
    }

    #[test]
    fn smoothing_preserves_length_and_is_deterministic() {
        let y: Vec<f64> = (0..57).map(|i| ((i * 37) % 11) as f64 - 60.0).collect();
        let config = AnalysisConfig::default();
        let first = smooth(&y, &config);
        let second = smooth(&y, &config);
        assert_eq!(first.len(), y.len());
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn constant_trace_stays_constant() {
        let y = vec![-42.0; 16];
        assert_close(&smooth(&y, &AnalysisConfig::default()), &y, 1e-9);
    }

    #[test]
    fn empty_trace_stays_empty() {
        assert!(smooth(&[], &AnalysisConfig::default()).is_empty());
    }
}
