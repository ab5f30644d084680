//! Offline RF spectrum-sweep characterization.
//!
//! Loads wide sweep tables (frequency rows × timestamp columns), smooths
//! each sweep and derives center frequency, bandwidth, peak power, noise
//! floor, SNR and crest factor, rendered as an ordered list of report lines.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod report;

pub use analysis::pipeline::{AnalysisRequest, AnalysisResult, FileAnalysis, FileReport};
pub use config::AnalysisConfig;
pub use data::filter::{FilterSpec, FrequencyFilter};
pub use data::model::{Characterization, Sweep, SweepTable};
pub use error::{SweepError, SweepResult};
