use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "nudge.yaml";
/// Optional local overrides, not meant to be committed.
pub const LOCAL_CONFIG_FILE: &str = "nudge.local.yaml";

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid capacity: {0}. Must be at least 1")]
    InvalidCapacity(usize),

    #[error("Invalid cooldown_secs: {0}. Must be positive")]
    InvalidCooldown(i64),

    #[error("Invalid tick_interval_secs: {0}. Must be positive")]
    InvalidTickInterval(u64),

    #[error("Invalid utc_offset_minutes: {0}. Must be within ±1080")]
    InvalidUtcOffset(i32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("State file path cannot be empty")]
    EmptyStateFile,

    #[error("Subscriber id cannot be empty")]
    EmptySubscriberId,

    #[error("Duplicate goal id: {0}")]
    DuplicateGoalId(String),

    #[error("Invalid goal '{id}': {reason}")]
    InvalidGoal { id: String, reason: String },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `nudge.yaml` in the working directory
    /// 3. `nudge.local.yaml` in the working directory
    /// 4. The explicit `--config` file, if given
    /// 5. Environment variables (`NUDGE_*` prefix, `__` for nesting)
    /// 6. `TELEGRAM_TOKEN` and `PORT`, as set by hosting platforms
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        Self::load_in(Path::new("."), explicit)
    }

    /// Same as [`ConfigLoader::load`], resolving the project files in `base_dir`.
    pub fn load_in(base_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
        }

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_dir.join(CONFIG_FILE)))
            .merge(Yaml::file(base_dir.join(LOCAL_CONFIG_FILE)));
        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed("NUDGE_").split("__"))
            .merge(Env::raw().only(&["TELEGRAM_TOKEN"]).map(|_| "telegram.token".into()))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file only (plus defaults)
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.subscriber_id.trim().is_empty() {
            return Err(ConfigError::EmptySubscriberId);
        }

        let engine = &config.engine;
        if engine.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(engine.capacity));
        }
        if engine.cooldown_secs <= 0 {
            return Err(ConfigError::InvalidCooldown(engine.cooldown_secs));
        }
        if engine.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidTickInterval(engine.tick_interval_secs));
        }

        if config.clock.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidUtcOffset(config.clock.utc_offset_minutes));
        }

        if config.storage.database_path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.storage.state_file.trim().is_empty() {
            return Err(ConfigError::EmptyStateFile);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        let mut seen = HashSet::new();
        for goal in &config.goals {
            let invalid = |reason: &str| ConfigError::InvalidGoal {
                id: goal.id.clone(),
                reason: reason.to_string(),
            };

            if goal.id.trim().is_empty() {
                return Err(invalid("id cannot be empty"));
            }
            if !seen.insert(goal.id.as_str()) {
                return Err(ConfigError::DuplicateGoalId(goal.id.clone()));
            }
            if goal.weekdays.is_empty() || goal.weekdays.iter().any(|d| *d > 6) {
                return Err(invalid("weekdays must be a non-empty list of 0 (Monday) to 6 (Sunday)"));
            }
            if goal.window_start_hour >= goal.window_end_hour || goal.window_end_hour > 24 {
                return Err(invalid("window must satisfy start < end <= 24"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::StorageBackend;
    use crate::domain::models::RecurringGoal;
    use tempfile::TempDir;

    fn load_isolated(dir: &TempDir, explicit: Option<&Path>) -> Result<Config> {
        // Clear anything the host environment might inject.
        temp_env::with_vars_unset(["TELEGRAM_TOKEN", "PORT"], || ConfigLoader::load_in(dir.path(), explicit))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.capacity, 15);
        assert_eq!(config.engine.cooldown_secs, 3600);
        assert_eq!(config.clock.utc_offset_minutes, 330);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.goals.len(), 6);
        assert_eq!(config.quotes.pools.len(), 5);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
subscriber_id: me
engine:
  capacity: 5
  cooldown_secs: 1800
clock:
  utc_offset_minutes: -300
storage:
  backend: file
  state_file: /tmp/state.json
goals:
  - id: gym
    text: Go to the gym
    days: [0, 2, 4]
    hour_start: 17
    hour_end: 20
    persona: stoic_resilience
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.subscriber_id, "me");
        assert_eq!(config.engine.capacity, 5);
        assert_eq!(config.engine.tick_interval_secs, 60);
        assert_eq!(config.clock.utc_offset_minutes, -300);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.goals.len(), 1);
        assert_eq!(config.goals[0].weekdays, vec![0, 2, 4]);
        assert_eq!(config.goals[0].window_start_hour, 17);
        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.engine.capacity = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidCapacity(0))));
    }

    #[test]
    fn test_validate_cooldown_and_tick() {
        let mut config = Config::default();
        config.engine.cooldown_secs = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidCooldown(0))));

        let mut config = Config::default();
        config.engine.tick_interval_secs = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidTickInterval(0))));
    }

    #[test]
    fn test_validate_offset_range() {
        let mut config = Config::default();
        config.clock.utc_offset_minutes = 18 * 60;
        assert!(ConfigLoader::validate(&config).is_ok());
        config.clock.utc_offset_minutes = -(18 * 60 + 1);
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidUtcOffset(_))));
    }

    #[test]
    fn test_validate_empty_paths_and_subscriber() {
        let mut config = Config::default();
        config.storage.database_path = String::new();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptyDatabasePath)));

        let mut config = Config::default();
        config.subscriber_id = "  ".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptySubscriberId)));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogLevel(_))));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogFormat(_))));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogRotation(_))));
    }

    #[test]
    fn test_validate_goals() {
        let mut config = Config::default();
        config.goals.push(config.goals[0].clone());
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::DuplicateGoalId(_))));

        let mut config = Config::default();
        config.goals = vec![RecurringGoal::new("bad", "x", vec![7], (9, 10), "stoic_resilience")];
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidGoal { .. })));

        config.goals = vec![RecurringGoal::new("bad", "x", vec![0], (12, 12), "stoic_resilience")];
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidGoal { .. })));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "engine:\n  capacity: 7\nserver:\n  port: 9000\n").unwrap();
        std::fs::write(dir.path().join(LOCAL_CONFIG_FILE), "engine:\n  capacity: 9\n").unwrap();

        let config = load_isolated(&dir, None).unwrap();
        assert_eq!(config.engine.capacity, 9);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.engine.cooldown_secs, 3600);
    }

    #[test]
    fn test_explicit_file_overrides_project_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "engine:\n  capacity: 7\n").unwrap();
        let explicit = dir.path().join("custom.yaml");
        std::fs::write(&explicit, "engine:\n  capacity: 3\n").unwrap();

        let config = load_isolated(&dir, Some(&explicit)).unwrap();
        assert_eq!(config.engine.capacity, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_isolated(&dir, Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "engine:\n  capacity: 7\n").unwrap();

        let config = temp_env::with_vars(
            [
                ("NUDGE_ENGINE__CAPACITY", Some("4")),
                ("NUDGE_LOGGING__LEVEL", Some("debug")),
                ("TELEGRAM_TOKEN", Some("123:abc")),
                ("PORT", Some("10000")),
            ],
            || ConfigLoader::load_in(dir.path(), None),
        )
        .unwrap();

        assert_eq!(config.engine.capacity, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.telegram.token.as_deref(), Some("123:abc"));
        assert_eq!(config.server.port, 10000);
    }

    #[test]
    fn test_invalid_env_value_fails_validation() {
        let dir = TempDir::new().unwrap();
        let result = temp_env::with_vars(
            [("NUDGE_ENGINE__CAPACITY", Some("0")), ("TELEGRAM_TOKEN", None), ("PORT", None)],
            || ConfigLoader::load_in(dir.path(), None),
        );
        assert!(result.is_err());
    }
}
