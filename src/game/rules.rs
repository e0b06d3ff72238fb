//! Rule sets: every tunable of a play-through, plus the named presets the page
//! can pick from. A rule set is validated once when a session is built so the
//! per-frame code can rely on sane values (non-empty spawn range, probabilities
//! in [0, 1], positive periods).

use thiserror::Error;

use super::{BASKET_BOTTOM_OFFSET, BASKET_WIDTH};

/// Names accepted by [`RuleSet::preset`].
pub const PRESET_NAMES: &[&str] = &["classic", "hazard", "capped", "endless"];

/// Horizontal margin kept free on both sides when spawning items.
pub const SPAWN_MARGIN: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleSet {
    pub name: String,
    pub field_width: f64,
    pub field_height: f64,
    /// Seconds on the clock; `None` plays until the hit limit ends the session.
    pub time_limit: Option<u32>,
    pub dangers: bool,
    pub danger_chance: f64,
    pub max_hits: u32,
    /// Star fall speed in pixels per reference frame.
    pub initial_fall_speed: f64,
    /// Dangers fall this much faster than stars.
    pub danger_speed_bonus: f64,
    pub speed_step: f64,
    pub max_speed_ups: Option<u32>,
    pub spawn_interval_ms: f64,
    pub speed_up_interval_ms: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::hazard()
    }
}

impl RuleSet {
    /// Stars only against a 60 second clock.
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            dangers: false,
            ..Self::hazard()
        }
    }

    /// Stars and dangers; five danger hits or the clock end the run.
    pub fn hazard() -> Self {
        Self {
            name: "hazard".to_string(),
            field_width: 800.0,
            field_height: 600.0,
            time_limit: Some(60),
            dangers: true,
            danger_chance: 0.25,
            max_hits: 5,
            initial_fall_speed: 2.0,
            danger_speed_bonus: 1.0,
            speed_step: 1.0,
            max_speed_ups: None,
            spawn_interval_ms: 500.0,
            speed_up_interval_ms: 15_000.0,
        }
    }

    /// Hazard rules with the difficulty ramp stopping after five steps.
    pub fn capped() -> Self {
        Self {
            name: "capped".to_string(),
            max_speed_ups: Some(5),
            ..Self::hazard()
        }
    }

    /// No clock: the run lasts until the hit limit is reached.
    pub fn endless() -> Self {
        Self {
            name: "endless".to_string(),
            time_limit: None,
            ..Self::hazard()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "hazard" => Some(Self::hazard()),
            "capped" => Some(Self::capped()),
            "endless" => Some(Self::endless()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if !(self.field_width >= BASKET_WIDTH.max(2.0 * SPAWN_MARGIN + 1.0))
            || !(self.field_height > BASKET_BOTTOM_OFFSET)
            || !self.field_width.is_finite()
            || !self.field_height.is_finite()
        {
            return Err(RuleError::FieldTooSmall {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if !(0.0..=1.0).contains(&self.danger_chance) {
            return Err(RuleError::ChanceOutOfRange(self.danger_chance));
        }
        if self.max_hits == 0 {
            return Err(RuleError::ZeroMaxHits);
        }
        if self.time_limit == Some(0) {
            return Err(RuleError::ZeroTimeLimit);
        }
        for (field, value) in [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("speed_up_interval_ms", self.speed_up_interval_ms),
            ("initial_fall_speed", self.initial_fall_speed),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(RuleError::NotPositive { field, value });
            }
        }
        if !(self.speed_step >= 0.0) || !(self.danger_speed_bonus >= 0.0) {
            return Err(RuleError::NegativeSpeed);
        }
        Ok(())
    }

    /// Parse a (possibly partial) rule set; missing fields fall back to the
    /// hazard preset.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("play field {width}x{height} is too small for the basket")]
    FieldTooSmall { width: f64, height: f64 },
    #[error("danger chance {0} is not a probability")]
    ChanceOutOfRange(f64),
    #[error("max_hits must be at least 1")]
    ZeroMaxHits,
    #[error("time_limit must be at least 1 second (use null for unlimited)")]
    ZeroTimeLimit,
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("speed step and danger bonus must not be negative")]
    NegativeSpeed,
}

#[cfg(feature = "serde_json")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed rules JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Rules(#[from] RuleError),
}
