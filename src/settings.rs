//! Game settings and tuning
//!
//! Everything tunable lives here, defaulted from `consts`. Settings files are
//! JSON; any section or field left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{CatcherGeometry, ClockTuning, RoundRules, SpawnTuning};

/// Rule presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RulesPreset {
    /// A handful of lives, one lost per miss
    #[default]
    Classic,
    /// A health bar drained in steps, over a longer round
    Health,
}

impl RulesPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulesPreset::Classic => "Classic",
            RulesPreset::Health => "Health",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "lives" => Some(RulesPreset::Classic),
            "health" | "hp" => Some(RulesPreset::Health),
            _ => None,
        }
    }

    pub fn rules(&self) -> RoundRules {
        match self {
            RulesPreset::Classic => RoundRules::default(),
            RulesPreset::Health => RoundRules {
                starting_lives: 100,
                round_duration_secs: 60,
                life_cost_per_miss: 10,
                ..RoundRules::default()
            },
        }
    }
}

/// Settings loading/validation failure
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Full tuning for a game session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub round: RoundRules,
    pub spawn: SpawnTuning,
    pub catcher: CatcherGeometry,
    pub clock: ClockTuning,
}

impl Settings {
    /// Default tuning with a rules preset applied
    pub fn from_preset(preset: RulesPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    pub fn apply_preset(&mut self, preset: RulesPreset) {
        self.round = preset.rules();
    }

    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tuning the simulation can't run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let round = &self.round;
        if round.starting_lives == 0 {
            return Err(invalid("round.starting_lives", "must be at least 1"));
        }
        if round.life_cost_per_miss == 0 {
            return Err(invalid("round.life_cost_per_miss", "must be at least 1"));
        }

        let spawn = &self.spawn;
        if !spawn.chance.is_finite() || !(0.0..=1.0).contains(&spawn.chance) {
            return Err(invalid("spawn.chance", format!("{} is not in [0, 1]", spawn.chance)));
        }
        let in_field = |v: f32| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_field(spawn.min_x) || !in_field(spawn.max_x) || spawn.min_x > spawn.max_x {
            return Err(invalid(
                "spawn.min_x",
                format!("range {}..{} is not inside [0, 100]", spawn.min_x, spawn.max_x),
            ));
        }
        if !(spawn.base_fall_speed.is_finite() && spawn.base_fall_speed > 0.0) {
            return Err(invalid("spawn.base_fall_speed", "must be positive"));
        }
        if !(spawn.jitter_min.is_finite() && spawn.jitter_min > 0.0) {
            return Err(invalid("spawn.jitter_min", "must be positive"));
        }
        if !(spawn.jitter_span.is_finite() && spawn.jitter_span >= 0.0) {
            return Err(invalid("spawn.jitter_span", "must not be negative"));
        }

        let catcher = &self.catcher;
        let fraction = |v: f32| v.is_finite() && v > 0.0 && v <= 1.0;
        if !fraction(catcher.width_fraction) {
            return Err(invalid("catcher.width_fraction", "must be in (0, 1]"));
        }
        if !fraction(catcher.height_fraction) {
            return Err(invalid("catcher.height_fraction", "must be in (0, 1]"));
        }
        if !(catcher.half_width.is_finite() && catcher.half_width > 0.0) {
            return Err(invalid("catcher.half_width", "must be positive"));
        }
        if !(catcher.height.is_finite() && catcher.height > 0.0) {
            return Err(invalid("catcher.height", "must be positive"));
        }
        if !(catcher.bottom_offset.is_finite()
            && catcher.bottom_offset >= 0.0
            && catcher.bottom_offset + catcher.height <= 100.0)
        {
            return Err(invalid("catcher.bottom_offset", "catcher must sit inside the playfield"));
        }

        let clock = &self.clock;
        if clock.sim_hz == 0 {
            return Err(invalid("clock.sim_hz", "must be at least 1"));
        }
        if !(clock.countdown_interval.is_finite() && clock.countdown_interval > 0.0) {
            return Err(invalid("clock.countdown_interval", "must be positive"));
        }
        if !(clock.max_frame_dt.is_finite() && clock.max_frame_dt > 0.0) {
            return Err(invalid("clock.max_frame_dt", "must be positive"));
        }
        if clock.max_substeps == 0 {
            return Err(invalid("clock.max_substeps", "must be at least 1"));
        }
        Ok(())
    }
}
