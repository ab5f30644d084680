use serde::Serialize;

// ---------------------------------------------------------------------------
// Sweep – one timestamp column of a table
// ---------------------------------------------------------------------------

/// A single sweep: amplitudes captured at one timestamp, parallel to the
/// table's frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    /// Column header, kept verbatim (not necessarily a parseable date).
    pub label: String,
    /// Amplitude axis in dB – same length as the frequency axis.
    pub amplitudes: Vec<f64>,
}

// ---------------------------------------------------------------------------
// SweepTable – one loaded source file
// ---------------------------------------------------------------------------

/// A wide sweep table: rows are frequency bins, columns are timestamps.
///
/// Frequencies are stored in source row order and never re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    /// Frequency axis in Hz (column 0 of the source).
    pub frequencies: Vec<f64>,
    /// Timestamp columns in source order.
    pub sweeps: Vec<Sweep>,
}

impl SweepTable {
    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the table has no frequency bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Timestamp labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sweeps.iter().map(|s| s.label.as_str())
    }
}

/// Every frequency present in any of the tables, ascending and without
/// duplicates.
pub fn distinct_frequencies<'a>(tables: impl IntoIterator<Item = &'a SweepTable>) -> Vec<f64> {
    let mut frequencies: Vec<f64> = tables
        .into_iter()
        .flat_map(|t| t.frequencies.iter().copied())
        .collect();
    frequencies.sort_by(f64::total_cmp);
    frequencies.dedup();
    frequencies
}

// ---------------------------------------------------------------------------
// Characterization – derived metrics for one sweep
// ---------------------------------------------------------------------------

/// Metrics derived from one smoothed sweep.
///
/// `noise_level`, `snr` and `crest_factor` are `None` when the value would
/// not be finite (empty noise set, zero noise, negative power ratio, zero
/// RMS). The record itself is still emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Characterization {
    pub timestamp: String,
    pub center_frequency: f64,
    pub bandwidth: f64,
    pub peak_amplitude: f64,
    pub noise_level: Option<f64>,
    pub snr: Option<f64>,
    pub crest_factor: Option<f64>,
    /// Samples retained after frequency filtering.
    pub sample_count: usize,
}

impl Characterization {
    /// Whether any metric came out undefined.
    pub fn is_degenerate(&self) -> bool {
        self.noise_level.is_none() || self.snr.is_none() || self.crest_factor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(frequencies: &[f64], labels: &[&str]) -> SweepTable {
        SweepTable {
            frequencies: frequencies.to_vec(),
            sweeps: labels
                .iter()
                .map(|l| Sweep {
                    label: l.to_string(),
                    amplitudes: vec![0.0; frequencies.len()],
                })
                .collect(),
        }
    }

    #[test]
    fn distinct_frequencies_merge_sort_and_dedup() {
        let a = table(&[300.0, 100.0, 200.0], &["t1"]);
        let b = table(&[200.0, 400.0, 100.0, 400.0], &["t2"]);
        assert_eq!(
            distinct_frequencies([&a, &b]),
            vec![100.0, 200.0, 300.0, 400.0]
        );
    }

    #[test]
    fn distinct_frequencies_of_nothing_is_empty() {
        assert!(distinct_frequencies(std::iter::empty()).is_empty());
        assert!(distinct_frequencies([&table(&[], &["t1"])]).is_empty());
    }

    #[test]
    fn labels_follow_column_order() {
        let t = table(&[100.0], &["2024-01-15T06:00", "2024-01-15T00:00"]);
        assert_eq!(
            t.labels().collect::<Vec<_>>(),
            vec!["2024-01-15T06:00", "2024-01-15T00:00"]
        );
        assert_eq!(t.len(), 1);
        assert!(!t.is_empty());
    }
}
