//! Studio configuration.
//!
//! Loaded from TOML so operating hours, studio days and ranking weights can
//! change without a rebuild. Every field has a default, so an empty file (or
//! no file at all) yields a usable configuration.
//!
//! ```
//! use studio_scheduler::config::StudioConfig;
//! use studio_scheduler::timegrid::Day;
//!
//! let config = StudioConfig::from_toml_str(r#"
//!     days = ["Monday", "Wednesday", "Saturday"]
//!     operating_hours = "09:00-22:00"
//!
//!     [ranking]
//!     preference_factor = 2.0
//! "#).unwrap();
//!
//! assert_eq!(config.days, vec![Day::Monday, Day::Wednesday, Day::Saturday]);
//! assert_eq!(config.ranking.preference_factor, 2.0);
//! assert_eq!(config.ranking.teacher_factor, 100.0);
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timegrid::{Day, SLOTS_PER_DAY, SlotRange};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StudioConfig {
    /// Days the studio runs classes on.
    pub days: Vec<Day>,

    /// Daily opening hours; nothing is placed outside them.
    pub operating_hours: SlotRange,

    pub ranking: RankingConfig,

    pub server: ServerConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            days: Day::ALL.to_vec(),
            operating_hours: SlotRange::new(0, SLOTS_PER_DAY),
            ranking: RankingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Like [`StudioConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::Invalid("no studio days configured".into()));
        }
        if self.operating_hours.is_empty() || self.operating_hours.end > SLOTS_PER_DAY {
            return Err(ConfigError::Invalid(format!(
                "operating hours {} are empty",
                self.operating_hours
            )));
        }
        self.ranking.validate()
    }
}

/// Weights of the three difficulty terms used to order classes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RankingConfig {
    /// Scales `1 / number of (day, room, start) placements that fit`.
    pub room_time_factor: f64,
    /// Scales `1 / number of qualified teachers`.
    pub teacher_factor: f64,
    /// Scales the total preference weight of the class.
    pub preference_factor: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            room_time_factor: 100.0,
            teacher_factor: 100.0,
            preference_factor: 1.0,
        }
    }
}

impl RankingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("room_time_factor", self.room_time_factor),
            ("teacher_factor", self.teacher_factor),
            ("preference_factor", self.preference_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "ranking.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = StudioConfig::from_toml_str("").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.days.len(), 7);
        assert_eq!(config.operating_hours.to_string(), "00:00-24:00");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_full_toml() {
        let config = StudioConfig::from_toml_str(
            r#"
            days = ["Tuesday", "Thursday"]
            operating_hours = "15:00-21:30"

            [ranking]
            room_time_factor = 50.0
            teacher_factor = 20.0
            preference_factor = 0.5

            [server]
            bind = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.days, vec![Day::Tuesday, Day::Thursday]);
        assert_eq!(config.operating_hours, SlotRange::new(60, 86));
        assert_eq!(config.ranking.room_time_factor, 50.0);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            StudioConfig::from_toml_str("days = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml_str(r#"operating_hours = "18:00-09:00""#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml_str("[ranking]\nteacher_factor = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml_str(r#"operating_hours = "9am-5pm""#),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            StudioConfig::from_toml_str(r#"days = ["Funday"]"#),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = StudioConfig::load_or_default("does/not/exist/studio.toml").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert!(matches!(
            StudioConfig::load("does/not/exist/studio.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
