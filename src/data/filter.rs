use crate::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Frequency filter: which bins of a sweep are retained
// ---------------------------------------------------------------------------

/// Restriction on the frequency axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FrequencyFilter {
    /// Keep every bin.
    #[default]
    None,
    /// Keep bins whose frequency equals the value exactly.
    Exact(f64),
    /// Keep bins within `center ± tolerance` (inclusive).
    Window { center: f64, tolerance: f64 },
}

impl FrequencyFilter {
    /// Build a filter from raw user input.
    ///
    /// An empty, unparseable or non-finite value means "no frequency
    /// filter"; the bad value is logged and otherwise ignored.
    pub fn parse(raw: Option<&str>, windowed: bool, config: &AnalysisConfig) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return FrequencyFilter::None;
        };
        match raw.parse::<f64>() {
            Ok(value) if !value.is_finite() => {
                log::warn!("Ignoring frequency filter '{raw}': not a finite number");
                FrequencyFilter::None
            }
            Ok(value) if windowed => FrequencyFilter::Window {
                center: value,
                tolerance: config.tolerance_hz,
            },
            Ok(value) => FrequencyFilter::Exact(value),
            Err(_) => {
                log::warn!("Ignoring frequency filter '{raw}': not a number");
                FrequencyFilter::None
            }
        }
    }

    /// Whether a single frequency passes the filter.
    pub fn accepts(&self, frequency: f64) -> bool {
        match *self {
            FrequencyFilter::None => true,
            FrequencyFilter::Exact(value) => frequency == value,
            FrequencyFilter::Window { center, tolerance } => {
                center - tolerance <= frequency && frequency <= center + tolerance
            }
        }
    }
}

/// Complete filter selection for a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub frequency: FrequencyFilter,
    /// Substring a timestamp label must contain. `None` or empty keeps all.
    pub date: Option<String>,
}

/// Apply a frequency filter to parallel frequency/amplitude slices.
///
/// The same index set is applied to both outputs. With
/// [`FrequencyFilter::None`] the input is returned unchanged.
pub fn filter_by_frequency(
    frequencies: &[f64],
    amplitudes: &[f64],
    filter: &FrequencyFilter,
) -> (Vec<f64>, Vec<f64>) {
    if matches!(filter, FrequencyFilter::None) {
        return (frequencies.to_vec(), amplitudes.to_vec());
    }
    frequencies
        .iter()
        .zip(amplitudes)
        .filter(|(f, _)| filter.accepts(**f))
        .map(|(&f, &a)| (f, a))
        .unzip()
}

/// Whether a timestamp column is kept under the date filter.
///
/// Plain, case-sensitive substring containment: `"2024-01-1"` also keeps
/// `"2024-01-15T00:00"`.
pub fn filter_by_date(label: &str, date: Option<&str>) -> bool {
    match date {
        None => true,
        Some(d) => d.is_empty() || label.contains(d),
    }
}
