//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check selection filters compile
//! - Validate value ranges (settle passes, bench time, iteration counts)
//! - Check the query string and log filter are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BenchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use regex::Regex;
use tracing_subscriber::EnvFilter;

use crate::config::schema::BenchConfig;

/// Largest accepted `memory.settle_passes`.
pub const MAX_SETTLE_PASSES: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("selection.{field}: invalid regex: {reason}")]
    InvalidRegex { field: &'static str, reason: String },

    #[error("memory.settle_passes must be between 1 and {max}, got {0}", max = MAX_SETTLE_PASSES)]
    SettlePassesOutOfRange(u32),

    #[error("simulator.bench_time_ms must be greater than zero")]
    ZeroBenchTime,

    #[error("simulator.{0} must be greater than zero")]
    ZeroIterations(&'static str),

    #[error("simulator.query must not contain '?' or '#': {0:?}")]
    InvalidQuery(String),

    #[error("observability.log_level is not a valid filter: {0}")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &BenchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let filters = [
        ("routers", &config.selection.routers),
        ("scenarios", &config.selection.scenarios),
    ];
    for (field, filter) in filters {
        if let Some(pattern) = filter {
            if let Err(err) = Regex::new(pattern) {
                errors.push(ValidationError::InvalidRegex {
                    field,
                    reason: err.to_string(),
                });
            }
        }
    }

    if !(1..=MAX_SETTLE_PASSES).contains(&config.memory.settle_passes) {
        errors.push(ValidationError::SettlePassesOutOfRange(config.memory.settle_passes));
    }

    if config.simulator.bench_time_ms == 0 {
        errors.push(ValidationError::ZeroBenchTime);
    }
    if config.simulator.max_iterations == 0 {
        errors.push(ValidationError::ZeroIterations("max_iterations"));
    }
    if config.simulator.fixed_iterations == Some(0) {
        errors.push(ValidationError::ZeroIterations("fixed_iterations"));
    }

    if let Some(query) = &config.simulator.query {
        if query.contains(['?', '#']) {
            errors.push(ValidationError::InvalidQuery(query.clone()));
        }
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&BenchConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BenchConfig::default();
        config.selection.routers = Some("(".into());
        config.memory.settle_passes = 0;
        config.simulator.bench_time_ms = 0;
        config.simulator.fixed_iterations = Some(0);
        config.simulator.query = Some("a=1?b".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ValidationError::InvalidRegex { field: "routers", .. }));
        assert_eq!(errors[1], ValidationError::SettlePassesOutOfRange(0));
        assert_eq!(errors[2], ValidationError::ZeroBenchTime);
        assert_eq!(errors[3], ValidationError::ZeroIterations("fixed_iterations"));
        assert_eq!(errors[4], ValidationError::InvalidQuery("a=1?b".into()));
    }

    #[test]
    fn test_settle_passes_upper_bound() {
        let mut config = BenchConfig::default();
        config.memory.settle_passes = MAX_SETTLE_PASSES + 1;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::SettlePassesOutOfRange(MAX_SETTLE_PASSES + 1)])
        );
    }
}
