//! Analysis configuration
//!
//! The tolerance, smoothing and threshold constants used by the analyzer.
//! Defaults reproduce the values the tool has always used; a JSON file can
//! override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

/// Sweeps with fewer retained samples than this are skipped.
pub const MIN_SAMPLES: usize = 3;

/// Tunable constants for filtering, smoothing and metric extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Half-width of the frequency window filter in Hz.
    pub tolerance_hz: f64,
    /// Upper bound on the Savitzky–Golay window length (odd).
    pub max_window_length: usize,
    /// Upper bound on the Savitzky–Golay polynomial order.
    pub max_poly_order: usize,
    /// Drop below the peak that still counts towards the bandwidth, in dB.
    pub bandwidth_drop_db: f64,
    /// Percentile under which smoothed samples are treated as noise.
    pub noise_percentile: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance_hz: 100.0,
            max_window_length: 11,
            max_poly_order: 2,
            bandwidth_drop_db: 3.0,
            noise_percentile: 20.0,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> SweepResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SweepError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(text: &str) -> SweepResult<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(text).map_err(|e| SweepError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SweepResult<()> {
        if self.max_window_length < MIN_SAMPLES || self.max_window_length % 2 == 0 {
            return Err(SweepError::Config(format!(
                "max_window_length must be an odd number >= {MIN_SAMPLES}, got {}",
                self.max_window_length
            )));
        }
        if self.max_poly_order >= self.max_window_length {
            return Err(SweepError::Config(format!(
                "max_poly_order must be below max_window_length ({}), got {}",
                self.max_window_length, self.max_poly_order
            )));
        }
        if !(0.0..=100.0).contains(&self.noise_percentile) {
            return Err(SweepError::Config(format!(
                "noise_percentile must lie in [0, 100], got {}",
                self.noise_percentile
            )));
        }
        if !self.tolerance_hz.is_finite() || self.tolerance_hz < 0.0 {
            return Err(SweepError::Config(format!(
                "tolerance_hz must be a non-negative number, got {}",
                self.tolerance_hz
            )));
        }
        if !self.bandwidth_drop_db.is_finite() {
            return Err(SweepError::Config(
                "bandwidth_drop_db must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_keeps_historic_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.tolerance_hz, 100.0);
        assert_eq!(config.max_window_length, 11);
        assert_eq!(config.max_poly_order, 2);
        assert_eq!(config.bandwidth_drop_db, 3.0);
        assert_eq!(config.noise_percentile, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "tolerance_hz": 250.0 }"#).unwrap();
        assert_eq!(config.tolerance_hz, 250.0);
        assert_eq!(config.max_window_length, 11);
    }

    #[test]
    fn configuration_round_trips_through_json() {
        let config = AnalysisConfig {
            max_window_length: 7,
            ..AnalysisConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"max_window_length\":7"));
        assert_eq!(AnalysisConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn even_window_is_rejected() {
        let err = AnalysisConfig::from_json(r#"{ "max_window_length": 10 }"#).unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }

    #[test]
    fn poly_order_must_stay_below_window() {
        let err = AnalysisConfig::from_json(r#"{ "max_window_length": 5, "max_poly_order": 5 }"#)
            .unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
        assert!(AnalysisConfig::from_json(r#"{ "max_window_length": 5, "max_poly_order": 4 }"#).is_ok());
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        assert!(AnalysisConfig::from_json(r#"{ "noise_percentile": 120.0 }"#).is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = AnalysisConfig::from_json("{ tolerance_hz: }").unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }
}
