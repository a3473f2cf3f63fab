//! Configuration types for search, tournament and benchmark runs.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a single search loop invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of candidates evolved side by side.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Rounds a parent may stall before a worse child is considered for
    /// acceptance. `None` keeps the search strictly elitist.
    #[serde(default)]
    pub max_age: Option<usize>,
    /// Wall-clock budget in seconds. `None` runs until the optimum is found.
    #[serde(default)]
    pub max_seconds: Option<f64>,
    /// Random seed for reproducibility. `None` draws fresh entropy per run.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            max_age: None,
            max_seconds: None,
            random_seed: None,
        }
    }
}

fn default_pool_size() -> usize {
    1
}

impl SearchConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Wall-clock budget as a duration. `None` also for budgets that
    /// `validate` rejects.
    pub fn time_limit(&self) -> Option<Duration> {
        self.max_seconds
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// Validate search settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::PoolTooSmall);
        }
        if let Some(seconds) = self.max_seconds
            && Duration::try_from_secs_f64(seconds).is_err()
        {
            return Err(ConfigError::InvalidTimeLimit(seconds));
        }
        Ok(())
    }
}

/// Settings for a round-robin tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Top contestants kept as parents each generation. The population holds
    /// `1 + num_parents²` contestants.
    #[serde(default = "default_num_parents")]
    pub num_parents: usize,
    /// Generations to play.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Random seed for reproducibility. `None` draws fresh entropy per run.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            num_parents: default_num_parents(),
            max_generations: default_max_generations(),
            random_seed: None,
        }
    }
}

fn default_num_parents() -> usize {
    10
}
fn default_max_generations() -> usize {
    100
}

impl TournamentConfig {
    /// Population size implied by `num_parents`.
    pub fn population_size(&self) -> usize {
        1 + self.num_parents * self.num_parents
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_parents == 0 {
            return Err(ConfigError::NoParents);
        }
        Ok(())
    }
}

/// Settings for the timing harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of timed runs.
    #[serde(default = "default_runs")]
    pub runs: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
        }
    }
}

fn default_runs() -> usize {
    100
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::NoRuns);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Pool size must be at least 1")]
    PoolTooSmall,
    #[error("Time limit must be a finite, non-negative number of seconds (got {0})")]
    InvalidTimeLimit(f64),
    #[error("Gene set must not be empty")]
    EmptyGeneSet,
    #[error("Default mutation needs at least two genes to choose from (got {0})")]
    GeneSetTooSmall(usize),
    #[error("Target length must be non-zero")]
    ZeroLength,
    #[error("No generator: supply a gene set or a custom create function")]
    MissingGenerator,
    #[error("No mutator: supply a gene set or a custom mutate function")]
    MissingMutator,
    #[error("Tournament needs at least one parent")]
    NoParents,
    #[error("Benchmark needs at least one run")]
    NoRuns,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(TournamentConfig::default().validate().is_ok());
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.pool_size, 1);
        assert!(config.max_age.is_none());
        assert!(config.time_limit().is_none());

        let tournament = TournamentConfig::default();
        assert_eq!(tournament.num_parents, 10);
        assert_eq!(tournament.max_generations, 100);
        assert_eq!(tournament.population_size(), 101);
    }

    #[test]
    fn test_invalid_pool_size() {
        let config = SearchConfig {
            pool_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::PoolTooSmall)));
    }

    #[test]
    fn test_invalid_time_limit() {
        for seconds in [-1.0, f64::NAN, f64::INFINITY, 1e20] {
            let config = SearchConfig {
                max_seconds: Some(seconds),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTimeLimit(_))
            ));
            assert!(config.time_limit().is_none());
        }

        let config = SearchConfig {
            max_seconds: Some(1e9),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.time_limit(), Some(Duration::from_secs(1_000_000_000)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"max_age": 50}"#).unwrap();
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.max_age, Some(50));
        assert!(config.max_seconds.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pool_size": 3, "max_seconds": 2.5}}"#).unwrap();

        let config = SearchConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.time_limit(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pool_size": 0}}"#).unwrap();
        assert!(matches!(
            SearchConfig::from_json_file(file.path()),
            Err(ConfigError::PoolTooSmall)
        ));

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "not json").unwrap();
        assert!(matches!(
            SearchConfig::from_json_file(garbage.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
