//! Engine configuration
//!
//! All thresholds and category policies are data. Configuration can be loaded
//! from TOML; every field falls back to the standard policy when omitted.
//!
//! ```toml
//! [moving_average]
//! policy = "fixed"
//! days = 3
//!
//! [mood_stability]
//! stable_below = 1.5
//! moderate_below = 3.0
//!
//! [[categories]]
//! name = "positive"
//! comparator = ">="
//! rating_threshold = 6.0
//! tag_category = "positive"
//! min_tag_category_share = 50.0
//! ```

use crate::error::{AnalyticsError, Result};
use crate::trend::MovingAverageWindow;
use crate::types::{MoodCategory, RatingScale};
use crate::variability::StabilityThresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub moving_average: MovingAverageWindow,

    #[serde(default = "StabilityThresholds::mood")]
    pub mood_stability: StabilityThresholds,

    #[serde(default = "StabilityThresholds::sleep")]
    pub sleep_stability: StabilityThresholds,

    #[serde(default)]
    pub rating_scale: RatingScale,

    #[serde(default = "MoodCategory::standard")]
    pub categories: Vec<MoodCategory>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            moving_average: MovingAverageWindow::default(),
            mood_stability: StabilityThresholds::mood(),
            sleep_stability: StabilityThresholds::sleep(),
            rating_scale: RatingScale::default(),
            categories: MoodCategory::standard(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| AnalyticsError::ConfigError(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::ConfigError(format!("failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AnalyticsError::EncodingError(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if let MovingAverageWindow::Fixed { days: 0 } = self.moving_average {
            return Err(config_error("moving_average.days must be at least 1"));
        }

        for (name, thresholds) in [
            ("mood_stability", &self.mood_stability),
            ("sleep_stability", &self.sleep_stability),
        ] {
            if thresholds.stable_below > thresholds.moderate_below {
                return Err(config_error(&format!(
                    "{name}.stable_below ({}) exceeds moderate_below ({})",
                    thresholds.stable_below, thresholds.moderate_below
                )));
            }
        }

        if self.rating_scale.min > self.rating_scale.max {
            return Err(config_error("rating_scale.min exceeds rating_scale.max"));
        }

        if self.categories.is_empty() {
            return Err(config_error("at least one mood category is required"));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(config_error("mood category names must not be empty"));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(config_error(&format!(
                    "duplicate mood category {:?}",
                    category.name
                )));
            }
            if !(0.0..=100.0).contains(&category.min_tag_category_share) {
                return Err(config_error(&format!(
                    "category {:?} has min_tag_category_share outside 0..=100",
                    category.name
                )));
            }
        }

        Ok(())
    }
}

fn config_error(message: &str) -> AnalyticsError {
    AnalyticsError::ConfigError(message.to_string())
}
