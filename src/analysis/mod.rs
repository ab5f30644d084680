/// Analysis layer: per-sweep smoothing and metrics, and the run pipeline.
///
/// ```text
///   Sweep ──filter──▶ retained bins ──smoothing──▶ smoothed trace
///                                                        │
///                                                        ▼
///                                             metrics → Characterization
/// ```

pub mod metrics;
pub mod pipeline;
pub mod smoothing;
