use thiserror::Error;

/// Reciprocal-rank-fusion dampening constant used when none is configured.
///
/// Empirically chosen upstream; treat as product-owned, not derivable.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Fuzzy-match acceptance threshold used when none is configured.
///
/// Same provenance as [`DEFAULT_RRF_K`]: an empirical constant, not a derived one.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Tunable constants shared by the fusion engine and the brand catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// `k` in the RRF term `1 / (k + rank)`.
    pub rrf_k: f64,
    /// Minimum similarity ratio a catalog key must strictly exceed to claim
    /// an unmatched brand name.
    pub fuzzy_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rrf_k: DEFAULT_RRF_K,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Check that the configured constants are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `rrf_k` is not finite and positive
    /// or `fuzzy_threshold` falls outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rrf_k.is_finite() || self.rrf_k <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "rrf_k must be finite and positive, got {}",
                self.rrf_k
            )));
        }
        if !self.fuzzy_threshold.is_finite()
            || self.fuzzy_threshold <= 0.0
            || self.fuzzy_threshold > 1.0
        {
            return Err(ConfigError::Validation(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid analysis config: {0}")]
    Validation(String),
}

/// Load analysis configuration from environment variables already in the process.
///
/// Missing variables fall back to the defaults; this function does not load
/// `.env` files (the CLI does that once at startup).
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but unparseable, or the
/// resulting values fail validation.
pub fn load_analysis_config() -> Result<AnalysisConfig, ConfigError> {
    build_analysis_config(|key| std::env::var(key))
}

/// Build analysis configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup, avoiding `set_var` and
/// `remove_var` in tests.
fn build_analysis_config<F>(lookup: F) -> Result<AnalysisConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let config = AnalysisConfig {
        rrf_k: parse_f64("SOVRANK_RRF_K", DEFAULT_RRF_K)?,
        fuzzy_threshold: parse_f64("SOVRANK_FUZZY_THRESHOLD", DEFAULT_FUZZY_THRESHOLD)?,
    };
    config.validate()?;

    tracing::debug!(
        rrf_k = config.rrf_k,
        fuzzy_threshold = config.fuzzy_threshold,
        "analysis config loaded"
    );
    Ok(config)
}
