//! Runtime tunables for recognition and game flow.
//!
//! Every field has a `DEFAULT_*` constant and the structs deserialize with
//! `#[serde(default)]`, so an embedder can override a single knob with a
//! partial JSON object.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// |dx| must exceed |dy| by this factor (or vice versa) to be axis-aligned.
pub const DEFAULT_DIRECTION_DOMINANCE: f64 = 2.0;
/// Minimum turn (radians) between resampled segments to count as a bend.
pub const DEFAULT_CURVE_TURN_THRESHOLD: f64 = PI / 6.0;
pub const DEFAULT_CURVE_MIN_TURNS: usize = 2;
/// Arc-length segments used when analysing curvature.
pub const DEFAULT_CURVE_SEGMENTS: usize = 4;
pub const DEFAULT_HOOK_TURN_THRESHOLD: f64 = PI / 2.0;
pub const DEFAULT_SHORT_LENGTH: f64 = 0.2;
pub const DEFAULT_MEDIUM_LENGTH: f64 = 0.5;
/// Path length (fraction of the canvas diagonal) below which a stroke is a dot.
pub const DEFAULT_MIN_STROKE_LENGTH: f64 = 0.03;
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.025;
pub const DEFAULT_FALLBACK_PROBABILITY: f64 = 0.75;
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.7;

pub const DEFAULT_DECK_SIZE: usize = 15;
pub const DEFAULT_STARTING_CHANCES: u32 = 5;
pub const DEFAULT_LEADERBOARD_CAPACITY: usize = 20;

/// What stroke lengths are normalised against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LengthBase {
    #[default]
    Diagonal,
    LongestSide,
}

/// Which scoring policy the recognizer runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    CountDirection,
    WeightedFeature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub direction_dominance: f64,
    pub curve_turn_threshold: f64,
    pub curve_min_turns: usize,
    pub curve_segments: usize,
    pub hook_turn_threshold: f64,
    pub length_base: LengthBase,
    pub short_length: f64,
    pub medium_length: f64,
    pub min_stroke_length: f64,
    pub jitter_amplitude: f64,
    pub fallback_probability: f64,
    pub pass_threshold: f64,
    pub policy: PolicyKind,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            direction_dominance: DEFAULT_DIRECTION_DOMINANCE,
            curve_turn_threshold: DEFAULT_CURVE_TURN_THRESHOLD,
            curve_min_turns: DEFAULT_CURVE_MIN_TURNS,
            curve_segments: DEFAULT_CURVE_SEGMENTS,
            hook_turn_threshold: DEFAULT_HOOK_TURN_THRESHOLD,
            length_base: LengthBase::default(),
            short_length: DEFAULT_SHORT_LENGTH,
            medium_length: DEFAULT_MEDIUM_LENGTH,
            min_stroke_length: DEFAULT_MIN_STROKE_LENGTH,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            fallback_probability: DEFAULT_FALLBACK_PROBABILITY,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            policy: PolicyKind::default(),
        }
    }
}

impl RecognizerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("direction_dominance", self.direction_dominance, 1.0, f64::MAX)?;
        check("curve_turn_threshold", self.curve_turn_threshold, 0.0, PI / 2.0)?;
        check("curve_segments", self.curve_segments as f64, 2.0, 64.0)?;
        // A resample of n segments has n - 1 interior turns.
        let max_turns = self.curve_segments.saturating_sub(1) as f64;
        check("curve_min_turns", self.curve_min_turns as f64, 1.0, max_turns)?;
        check("hook_turn_threshold", self.hook_turn_threshold, 0.0, PI)?;
        check("short_length", self.short_length, 0.0, self.medium_length)?;
        check("medium_length", self.medium_length, self.short_length, f64::MAX)?;
        check("min_stroke_length", self.min_stroke_length, 0.0, 1.0)?;
        check("jitter_amplitude", self.jitter_amplitude, 0.0, 0.5)?;
        check("fallback_probability", self.fallback_probability, 0.0, 1.0)?;
        check("pass_threshold", self.pass_threshold, 0.0, 1.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub deck_size: usize,
    pub starting_chances: u32,
    pub leaderboard_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: DEFAULT_DECK_SIZE,
            starting_chances: DEFAULT_STARTING_CHANCES,
            leaderboard_capacity: DEFAULT_LEADERBOARD_CAPACITY,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("deck_size", self.deck_size as f64, 1.0, f64::MAX)?;
        check("starting_chances", self.starting_chances as f64, 1.0, f64::MAX)?;
        check("leaderboard_capacity", self.leaderboard_capacity as f64, 1.0, f64::MAX)?;
        Ok(())
    }
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}
