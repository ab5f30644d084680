use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Sweep, SweepTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sweep table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; column 0 is the frequency axis, every other
///   column is one timestamped sweep
/// * `.parquet` – the same wide layout, one numeric column per sweep
pub fn load_file(path: &Path) -> Result<SweepTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:
///
/// ```text
/// frequency,2024-01-15T00:00,2024-01-15T00:05
/// 100,-50.2,-49.8
/// 200,-10.1,-11.0
/// ```
///
/// Every cell must parse as a finite number; a ragged row fails the whole
/// file. Header labels are kept exactly as written.
fn load_csv(path: &Path) -> Result<SweepTable> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse a wide sweep table from any CSV byte source.
pub fn read_csv<R: Read>(source: R) -> Result<SweepTable> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        bail!("CSV has no header row");
    }

    let mut frequencies = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len() - 1];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        for (col_idx, cell) in record.iter().enumerate() {
            let value = parse_cell(cell).with_context(|| {
                format!("CSV row {row_no}, column '{}': '{cell}' is not a number", headers[col_idx])
            })?;
            if col_idx == 0 {
                frequencies.push(value);
            } else {
                columns[col_idx - 1].push(value);
            }
        }
    }

    let sweeps = headers
        .into_iter()
        .skip(1)
        .zip(columns)
        .map(|(label, amplitudes)| Sweep { label, amplitudes })
        .collect();

    Ok(SweepTable {
        frequencies,
        sweeps,
    })
}

fn parse_cell(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>()?;
    anyhow::ensure!(value.is_finite(), "non-finite value");
    Ok(value)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a wide sweep table.
///
/// Expected schema:
/// - first column: numeric frequency axis (Float64/Float32/Int64/Int32)
/// - every further column: numeric amplitudes, named by timestamp label
///
/// A null or non-finite cell fails the file.  Record batches are
/// concatenated in file order.
fn load_parquet(path: &Path) -> Result<SweepTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    if schema.fields().is_empty() {
        bail!("Parquet file has no columns");
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut frequencies = Vec::new();
    let mut sweeps: Vec<Sweep> = schema
        .fields()
        .iter()
        .skip(1)
        .map(|f| Sweep {
            label: f.name().clone(),
            amplitudes: Vec::new(),
        })
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let freq_col = batch.column(0);
        frequencies.extend(
            extract_f64_column(freq_col)
                .with_context(|| format!("column '{}'", schema.field(0).name()))?,
        );

        for (i, sweep) in sweeps.iter_mut().enumerate() {
            let values = extract_f64_column(batch.column(i + 1))
                .with_context(|| format!("column '{}'", sweep.label))?;
            sweep.amplitudes.extend(values);
        }
    }

    Ok(SweepTable {
        frequencies,
        sweeps,
    })
}

// -- Parquet / Arrow helpers --

/// Read a numeric Arrow column as `f64`.  Nulls and non-finite values are
/// rejected.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let values: Vec<Option<f64>> = match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.iter().collect()
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.iter().map(|v| v.map(f64::from)).collect()
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.iter().map(|v| v.map(|i| i as f64)).collect()
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.iter().map(|v| v.map(f64::from)).collect()
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => bail!("row {row}: non-finite value {v}"),
            None => bail!("row {row}: null value"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_wide_table_in_column_order() {
        let csv = "frequency,t1,t2\n100,-50,-40\n200,-10,-12\n300,0,1.5\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.frequencies, vec![100.0, 200.0, 300.0]);
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["t1", "t2"]);
        assert_eq!(table.sweeps[0].amplitudes, vec![-50.0, -10.0, 0.0]);
        assert_eq!(table.sweeps[1].amplitudes, vec![-40.0, -12.0, 1.5]);
    }

    #[test]
    fn keeps_source_row_order() {
        let csv = "f,t1\n300,1\n100,2\n200,3\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.frequencies, vec![300.0, 100.0, 200.0]);
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = read_csv("frequency,2024-01-15\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.sweeps.len(), 1);
        assert!(table.sweeps[0].amplitudes.is_empty());
    }

    #[test]
    fn ragged_row_is_an_error() {
        let csv = "frequency\n100,-50\n200,-10\n";
        assert!(read_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn non_numeric_cell_names_the_column() {
        let csv = "frequency,t1\n100,-50\n200,loud\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("'t1'"), "{text}");
        assert!(text.contains("loud"), "{text}");
    }

    #[test]
    fn non_finite_cells_are_rejected() {
        for cell in ["NaN", "inf", "-inf"] {
            let csv = format!("frequency,t1\n100,-50\n200,{cell}\n300,0\n");
            let err = read_csv(csv.as_bytes()).unwrap_err();
            let text = format!("{err:#}");
            assert!(text.contains("'t1'"), "{text}");
            assert!(text.contains("non-finite"), "{text}");
        }
    }

    #[test]
    fn header_labels_keep_surrounding_whitespace() {
        let csv = "frequency, 2024-01-15T00:00\n100,-50\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.labels().collect::<Vec<_>>(), vec![" 2024-01-15T00:00"]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(read_csv("".as_bytes()).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("scan.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
