//! Request → result pipeline
//!
//! Each file is loaded and every timestamp column pushed through
//! filter → filter → smooth → characterize. A failing file is recorded
//! next to its path and never stops the remaining files.

use std::path::{Path, PathBuf};
use std::thread;

use crate::config::{AnalysisConfig, MIN_SAMPLES};
use crate::data::filter::{FilterSpec, filter_by_date, filter_by_frequency};
use crate::data::loader;
use crate::data::model::{Characterization, Sweep, SweepTable};
use crate::error::{SweepError, SweepResult};
use crate::report;

use super::metrics::characterize;
use super::smoothing::smooth;

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// Everything one analysis run needs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub files: Vec<PathBuf>,
    pub filter: FilterSpec,
    pub config: AnalysisConfig,
}

/// Successful outcome for one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAnalysis {
    /// One entry per characterized sweep, in column order.
    pub characterizations: Vec<Characterization>,
    /// Sweeps dropped for having fewer than three samples after filtering.
    pub skipped: usize,
    /// Sweeps whose timestamp label did not match the date filter.
    pub excluded_by_date: usize,
}

/// Outcome for one input file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<FileAnalysis, SweepError>,
}

/// Outcome of a whole run, files in request order.
#[derive(Debug)]
pub struct AnalysisResult {
    pub files: Vec<FileReport>,
    /// Rendered report lines for every characterization, in order.
    pub lines: Vec<String>,
}

impl AnalysisResult {
    fn from_reports(files: Vec<FileReport>) -> Self {
        let lines = report::report_lines(
            files
                .iter()
                .filter_map(|f| f.outcome.as_ref().ok())
                .flat_map(|a| a.characterizations.iter()),
        );
        Self { files, lines }
    }

    /// All characterizations across successful files, in report order.
    pub fn characterizations(&self) -> impl Iterator<Item = &Characterization> {
        self.files
            .iter()
            .filter_map(|f| f.outcome.as_ref().ok())
            .flat_map(|a| a.characterizations.iter())
    }

    /// Files that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &SweepError)> {
        self.files
            .iter()
            .filter_map(|f| f.outcome.as_ref().err().map(|e| (f.path.as_path(), e)))
    }
}

// ---------------------------------------------------------------------------
// Per-sweep and per-table analysis
// ---------------------------------------------------------------------------

/// Filter, smooth and characterize one sweep.
///
/// Returns `None` when fewer than three samples survive the frequency
/// filter.
pub fn analyze_sweep(
    frequencies: &[f64],
    sweep: &Sweep,
    filter: &FilterSpec,
    config: &AnalysisConfig,
) -> Option<Characterization> {
    let (freqs, amps) = filter_by_frequency(frequencies, &sweep.amplitudes, &filter.frequency);
    if amps.len() < MIN_SAMPLES {
        log::debug!(
            "Skipping sweep '{}': {} samples after filtering",
            sweep.label,
            amps.len()
        );
        return None;
    }

    let smoothed = smooth(&amps, config);
    let ch = characterize(&sweep.label, &freqs, &smoothed, config);
    if ch.is_degenerate() {
        log::warn!("Sweep '{}' has undefined metrics", sweep.label);
    }
    Some(ch)
}

/// Analyze every timestamp column of a loaded table.
pub fn analyze_table(table: &SweepTable, filter: &FilterSpec, config: &AnalysisConfig) -> FileAnalysis {
    let mut analysis = FileAnalysis::default();
    for sweep in &table.sweeps {
        if !filter_by_date(&sweep.label, filter.date.as_deref()) {
            analysis.excluded_by_date += 1;
            continue;
        }
        match analyze_sweep(&table.frequencies, sweep, filter, config) {
            Some(ch) => analysis.characterizations.push(ch),
            None => analysis.skipped += 1,
        }
    }
    analysis
}

/// Load and analyze one file, capturing any load failure.
pub fn analyze_file(path: &Path, filter: &FilterSpec, config: &AnalysisConfig) -> FileReport {
    let outcome = loader::load_file(path)
        .map(|table| analyze_table(&table, filter, config))
        .map_err(|e| SweepError::source_read(path, &e));

    match &outcome {
        Ok(a) => log::info!(
            "Analyzed {}: {} characterized, {} skipped, {} excluded by date",
            path.display(),
            a.characterizations.len(),
            a.skipped,
            a.excluded_by_date
        ),
        Err(e) => log::error!("{e}"),
    }

    FileReport {
        path: path.to_path_buf(),
        outcome,
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Analyze all files sequentially.
pub fn analyze(request: &AnalysisRequest) -> SweepResult<AnalysisResult> {
    if request.files.is_empty() {
        return Err(SweepError::NoInputFiles);
    }
    let reports = request
        .files
        .iter()
        .map(|p| analyze_file(p, &request.filter, &request.config))
        .collect();
    Ok(AnalysisResult::from_reports(reports))
}

/// Analyze files on a pool of `jobs` worker threads.
///
/// The result is identical to [`analyze`]: files stay in request order and
/// sweeps in column order.
pub fn analyze_parallel(request: &AnalysisRequest, jobs: usize) -> SweepResult<AnalysisResult> {
    if request.files.is_empty() {
        return Err(SweepError::NoInputFiles);
    }
    let workers = jobs.min(request.files.len());
    if workers <= 1 {
        return analyze(request);
    }

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &Path)>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, FileReport)>();

    for (index, path) in request.files.iter().enumerate() {
        if job_tx.send((index, path.as_path())).is_err() {
            break;
        }
    }
    drop(job_tx);

    let filter = &request.filter;
    let config = &request.config;
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, path) in job_rx.iter() {
                    let report = analyze_file(path, filter, config);
                    if result_tx.send((index, report)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<FileReport>> = request.files.iter().map(|_| None).collect();
    for (index, report) in result_rx.iter() {
        slots[index] = Some(report);
    }
    log::debug!("Worker pool of {workers} finished {} files", slots.len());

    Ok(AnalysisResult::from_reports(slots.into_iter().flatten().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FrequencyFilter;

    fn table() -> SweepTable {
        SweepTable {
            frequencies: vec![100.0, 200.0, 300.0, 400.0, 500.0],
            sweeps: vec![
                Sweep {
                    label: "2024-01-15T00:00".to_string(),
                    amplitudes: vec![-50.0, -10.0, 0.0, -10.0, -50.0],
                },
                Sweep {
                    label: "2024-02-01T00:00".to_string(),
                    amplitudes: vec![-60.0, -20.0, -5.0, -20.0, -60.0],
                },
            ],
        }
    }

    #[test]
    fn every_column_is_characterized_without_filters() {
        let analysis = analyze_table(&table(), &FilterSpec::default(), &AnalysisConfig::default());
        assert_eq!(analysis.characterizations.len(), 2);
        assert_eq!(analysis.characterizations[0].timestamp, "2024-01-15T00:00");
        assert_eq!(analysis.characterizations[1].timestamp, "2024-02-01T00:00");
        assert_eq!(analysis.skipped, 0);
    }

    #[test]
    fn date_filter_excludes_columns() {
        let filter = FilterSpec {
            date: Some("2024-01-1".to_string()),
            ..FilterSpec::default()
        };
        let analysis = analyze_table(&table(), &filter, &AnalysisConfig::default());
        assert_eq!(analysis.characterizations.len(), 1);
        assert_eq!(analysis.excluded_by_date, 1);
    }

    #[test]
    fn two_retained_samples_are_skipped() {
        let filter = FilterSpec {
            frequency: FrequencyFilter::Window {
                center: 450.0,
                tolerance: 50.0,
            },
            date: None,
        };
        let analysis = analyze_table(&table(), &filter, &AnalysisConfig::default());
        assert!(analysis.characterizations.is_empty());
        assert_eq!(analysis.skipped, 2);
    }

    #[test]
    fn exact_frequency_filter_leaves_too_few_samples() {
        let filter = FilterSpec {
            frequency: FrequencyFilter::Exact(300.0),
            date: None,
        };
        let analysis = analyze_table(&table(), &filter, &AnalysisConfig::default());
        assert!(analysis.characterizations.is_empty());
        assert_eq!(analysis.skipped, 2);
    }

    #[test]
    fn window_filter_narrows_the_sweep() {
        let filter = FilterSpec {
            frequency: FrequencyFilter::Window {
                center: 300.0,
                tolerance: 100.0,
            },
            date: None,
        };
        let analysis = analyze_table(&table(), &filter, &AnalysisConfig::default());
        let first = &analysis.characterizations[0];
        assert_eq!(first.sample_count, 3);
        assert_eq!(first.center_frequency, 300.0);
    }

    #[test]
    fn empty_request_is_rejected() {
        let request = AnalysisRequest::default();
        assert!(matches!(analyze(&request), Err(SweepError::NoInputFiles)));
        assert!(matches!(
            analyze_parallel(&request, 4),
            Err(SweepError::NoInputFiles)
        ));
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let request = AnalysisRequest {
            files: vec![PathBuf::from("/nonexistent/scan.csv")],
            ..AnalysisRequest::default()
        };
        let result = analyze(&request).unwrap();
        assert_eq!(result.failures().count(), 1);
        assert!(result.lines.is_empty());
    }
}
