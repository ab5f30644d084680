use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::pipeline::AnalysisResult;
use crate::data::model::Characterization;

/// Title line at the top of exported text reports.
pub const REPORT_TITLE: &str = "RF Signal Analysis Report";

/// Rendered in place of a metric that has no finite value.
pub const UNDEFINED: &str = "undefined";

// ---------------------------------------------------------------------------
// Report lines
// ---------------------------------------------------------------------------

/// The eight lines describing one characterization, the last one blank.
pub fn characterization_lines(ch: &Characterization) -> [String; 8] {
    [
        format!(
            "Frequency: {:.2} Hz, Date: {}",
            ch.center_frequency, ch.timestamp
        ),
        format!("Center Frequency: {:.2} Hz", ch.center_frequency),
        format!("Bandwidth (BW): {:.2} Hz", ch.bandwidth),
        format!("Amplitude/Power: {:.2} dB", ch.peak_amplitude),
        format!("Noise Level: {}", metric(ch.noise_level, " dB")),
        format!("SNR: {}", metric(ch.snr, " dB")),
        format!("Crest Factor: {}", metric(ch.crest_factor, "")),
        String::new(),
    ]
}

/// Flatten characterizations into the ordered line list.
pub fn report_lines<'a, I>(characterizations: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Characterization>,
{
    characterizations
        .into_iter()
        .flat_map(characterization_lines)
        .collect()
}

fn metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => UNDEFINED.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Write the title and the report lines to `writer`, one per line.
pub fn write_text<W: Write>(writer: &mut W, lines: &[String]) -> Result<()> {
    writeln!(writer, "{REPORT_TITLE}")?;
    writeln!(writer)?;
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Export the text report to a file.
pub fn export_text(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating report {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_text(&mut writer, lines)?;
    writer.flush().context("flushing report")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    characterizations: &'a [Characterization],
    skipped: usize,
    excluded_by_date: usize,
}

/// Serialize a result as pretty-printed JSON.
pub fn to_json(result: &AnalysisResult) -> Result<String> {
    let files = result
        .files
        .iter()
        .map(|f| match &f.outcome {
            Ok(a) => JsonFile {
                path: f.path.display().to_string(),
                error: None,
                characterizations: &a.characterizations,
                skipped: a.skipped,
                excluded_by_date: a.excluded_by_date,
            },
            Err(e) => JsonFile {
                path: f.path.display().to_string(),
                error: Some(e.to_string()),
                characterizations: &[],
                skipped: 0,
                excluded_by_date: 0,
            },
        })
        .collect();
    serde_json::to_string_pretty(&JsonReport { files }).context("serializing report")
}

/// Export the JSON report to a file.
pub fn export_json(path: &Path, result: &AnalysisResult) -> Result<()> {
    let json = to_json(result)?;
    std::fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
}
