use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Gaussian carrier on a dB scale: `floor_db` far from the carrier, rising
/// to `floor_db + rise_db` at `center`.
fn carrier_db(f: f64, center: f64, sigma: f64, floor_db: f64, rise_db: f64) -> f64 {
    floor_db + rise_db * (-(f - center).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_sweep(
    frequencies: &[f64],
    carriers: &[(f64, f64, f64)],
    floor_db: f64,
    noise_db: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    frequencies
        .iter()
        .map(|&f| {
            let level = carriers
                .iter()
                .map(|&(center, sigma, rise)| carrier_db(f, center, sigma, floor_db, rise))
                .fold(floor_db, f64::max);
            level + rng.gauss(0.0, noise_db)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_csv(path: &str, frequencies: &[f64], columns: &[(String, Vec<f64>)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let mut header = vec!["frequency".to_string()];
    header.extend(columns.iter().map(|(label, _)| label.clone()));
    writer.write_record(&header)?;

    for (row, f) in frequencies.iter().enumerate() {
        let mut record = vec![f.to_string()];
        record.extend(columns.iter().map(|(_, values)| format!("{:.3}", values[row])));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, frequencies: &[f64], columns: &[(String, Vec<f64>)]) -> Result<()> {
    let mut fields = vec![Field::new("frequency", DataType::Float64, false)];
    fields.extend(
        columns
            .iter()
            .map(|(label, _)| Field::new(label, DataType::Float64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(frequencies.to_vec()))];
    arrays.extend(
        columns
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values.clone())) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // 433.05 – 434.79 MHz ISM band, 10 kHz bins
    let frequencies: Vec<f64> = (0..175).map(|i| 433_050_000.0 + i as f64 * 10_000.0).collect();

    let timestamps = [
        "2024-01-15T00:00",
        "2024-01-15T06:00",
        "2024-01-15T12:00",
        "2024-01-16T00:00",
        "2024-02-01T00:00",
    ];

    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let drift = i as f64 * 5_000.0;
        let carriers = [
            (433_920_000.0 + drift, 40_000.0, 55.0),
            (434_420_000.0, 15_000.0, 30.0 + i as f64 * 2.0),
        ];
        let sweep = generate_sweep(&frequencies, &carriers, -95.0, 1.5, &mut rng);
        columns.push((ts.to_string(), sweep));
    }

    write_csv("sample_sweeps.csv", &frequencies, &columns)?;
    write_parquet("sample_sweeps.parquet", &frequencies, &columns)?;

    log::info!("Wrote sample_sweeps.csv and sample_sweeps.parquet");
    println!(
        "Wrote {} sweeps ({} frequency bins each) to sample_sweeps.csv and sample_sweeps.parquet",
        columns.len(),
        frequencies.len()
    );
    Ok(())
}
