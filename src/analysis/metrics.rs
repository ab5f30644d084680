//! Sweep characterization
//!
//! Derives the summary metrics of one smoothed sweep: center frequency,
//! bandwidth, peak amplitude, noise level, SNR and crest factor.

use crate::config::AnalysisConfig;
use crate::data::model::Characterization;

/// Compute the metrics of a smoothed sweep.
///
/// `frequencies` and `smoothed` must be parallel and non-empty. Metrics that
/// would be non-finite are reported as `None`.
pub fn characterize(
    timestamp: &str,
    frequencies: &[f64],
    smoothed: &[f64],
    config: &AnalysisConfig,
) -> Characterization {
    debug_assert_eq!(frequencies.len(), smoothed.len());

    let peak_index = argmax(smoothed);
    let peak_amplitude = smoothed[peak_index];
    let center_frequency = frequencies[peak_index];

    let bandwidth = bandwidth(frequencies, smoothed, peak_amplitude - config.bandwidth_drop_db);
    let noise_level = noise_level(smoothed, config.noise_percentile);
    let snr = noise_level.and_then(|noise| finite(10.0 * (peak_amplitude / noise).log10()));

    let mean_square = smoothed.iter().map(|a| a * a).sum::<f64>() / smoothed.len() as f64;
    let crest_factor = finite(peak_amplitude / mean_square.sqrt());

    Characterization {
        timestamp: timestamp.to_string(),
        center_frequency,
        bandwidth,
        peak_amplitude,
        noise_level,
        snr,
        crest_factor,
        sample_count: smoothed.len(),
    }
}

/// Index of the maximum value, first occurrence on ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Frequency span between the first and last sample strictly above
/// `threshold`, or 0 when none qualifies.
///
/// The qualifying samples need not be contiguous: two separate lobes above
/// the threshold count as one span from the first to the last.
pub fn bandwidth(frequencies: &[f64], amplitudes: &[f64], threshold: f64) -> f64 {
    let first = amplitudes.iter().position(|&a| a > threshold);
    let last = amplitudes.iter().rposition(|&a| a > threshold);
    match (first, last) {
        (Some(first), Some(last)) => frequencies[last] - frequencies[first],
        _ => 0.0,
    }
}

/// Mean of the samples strictly below the given percentile.
///
/// `None` when no sample lies below it (e.g. a flat trace).
pub fn noise_level(amplitudes: &[f64], percentile_rank: f64) -> Option<f64> {
    let threshold = percentile(amplitudes, percentile_rank)?;
    let below: Vec<f64> = amplitudes.iter().copied().filter(|&a| a < threshold).collect();
    if below.is_empty() {
        return None;
    }
    finite(below.iter().sum::<f64>() / below.len() as f64)
}

/// Percentile with linear interpolation between the closest ranks.
pub fn percentile(values: &[f64], rank: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = rank / 100.0 * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let t = position - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);

    // Interpolate from whichever neighbour is closer.
    let diff = b - a;
    Some(if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t })
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
