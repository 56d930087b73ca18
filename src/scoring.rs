//! Scoring policies: compare drawn stroke features against a pattern.
//!
//! A policy never fails. Missing patterns, empty sessions and wildly wrong
//! stroke counts all produce a defined probability.
//!
//! Two policies are available and selected through `RecognizerConfig::policy`:
//!
//! * `CountDirectionPolicy` (`count-direction/v1`, default) rewards a close
//!   stroke count and matching directions, adds bounded jitter and floors
//!   near-miss stroke counts so learners are not punished for sloppy ink.
//! * `WeightedFeaturePolicy` (`weighted-feature/v1`) is stricter and fully
//!   deterministic: direction, position and length per stroke.
//!
//! Randomness only enters through the `Jitter` trait so tests can pass
//! `NoJitter` or a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{PolicyKind, RecognizerConfig};
use crate::features::StrokeFeatures;
use crate::patterns::{CharacterPattern, pattern_for};

/// Lowest probability the count-direction policy reports.
pub const MIN_PROBABILITY: f64 = 0.3;
/// Highest probability the count-direction policy reports.
pub const MAX_PROBABILITY: f64 = 0.98;
/// Floor applied when the drawn stroke count is within one of the pattern.
pub const NEAR_COUNT_FLOOR: f64 = 0.65;

// Stroke-count term by absolute count difference 0, 1 and 2.
const COUNT_TERMS: [f64; 3] = [0.4, 0.3, 0.15];
const DIRECTION_WEIGHT: f64 = 0.4;
const ATTEMPT_WEIGHT: f64 = 0.2;

/// Source of the small symmetric perturbation added to scores.
pub trait Jitter {
    /// A value in `[-amplitude, amplitude]`.
    fn sample(&mut self, amplitude: f64) -> f64;
}

/// Always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&mut self, _amplitude: f64) -> f64 {
        0.0
    }
}

/// Uniform jitter from a seedable generator.
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    #[cfg(feature = "rng")]
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl Jitter for SeededJitter {
    fn sample(&mut self, amplitude: f64) -> f64 {
        if amplitude.is_nan() || amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..=amplitude)
    }
}

/// A named, versioned way of turning features into a probability.
pub trait ScoringPolicy {
    /// Stable identifier including a version suffix.
    fn id(&self) -> &'static str;

    fn score(
        &self,
        pattern: Option<&CharacterPattern>,
        drawn: &[StrokeFeatures],
        jitter: &mut dyn Jitter,
    ) -> f64;
}

/// Build the policy selected in `config`.
pub fn policy_for(config: &RecognizerConfig) -> Box<dyn ScoringPolicy> {
    match config.policy {
        PolicyKind::CountDirection => Box::new(CountDirectionPolicy::from_config(config)),
        PolicyKind::WeightedFeature => Box::new(WeightedFeaturePolicy::from_config(config)),
    }
}

/// Terms of the count-direction score before jitter, floor and clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub count: f64,
    pub direction: f64,
    pub attempted: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.count + self.direction + self.attempted
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountDirectionPolicy {
    pub jitter_amplitude: f64,
    pub fallback_probability: f64,
}

impl Default for CountDirectionPolicy {
    fn default() -> Self {
        Self::from_config(&RecognizerConfig::default())
    }
}

impl CountDirectionPolicy {
    pub const ID: &'static str = "count-direction/v1";

    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self {
            jitter_amplitude: config.jitter_amplitude,
            fallback_probability: config.fallback_probability,
        }
    }

    pub fn breakdown(pattern: &CharacterPattern, drawn: &[StrokeFeatures]) -> ScoreBreakdown {
        let expected = pattern.stroke_count;
        let count = COUNT_TERMS
            .get(expected.abs_diff(drawn.len()))
            .copied()
            .unwrap_or(0.0);

        let matched: f64 = pattern
            .strokes
            .iter()
            .zip(drawn)
            .map(|(spec, got)| {
                if spec.direction == got.direction {
                    1.0
                } else if spec.direction.is_related(got.direction) {
                    0.5
                } else {
                    0.0
                }
            })
            .sum();
        let direction = if expected == 0 {
            0.0
        } else {
            matched / expected as f64 * DIRECTION_WEIGHT
        };

        let attempted = if drawn.is_empty() { 0.0 } else { ATTEMPT_WEIGHT };
        ScoreBreakdown { count, direction, attempted }
    }
}

impl ScoringPolicy for CountDirectionPolicy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn score(
        &self,
        pattern: Option<&CharacterPattern>,
        drawn: &[StrokeFeatures],
        jitter: &mut dyn Jitter,
    ) -> f64 {
        let Some(pattern) = pattern else {
            return self.fallback_probability;
        };
        if drawn.is_empty() {
            return MIN_PROBABILITY;
        }

        let terms = Self::breakdown(pattern, drawn);
        let mut probability = terms.total() + jitter.sample(self.jitter_amplitude);
        if pattern.stroke_count.abs_diff(drawn.len()) <= 1 {
            probability = probability.max(NEAR_COUNT_FLOOR);
        }
        let probability = probability.clamp(MIN_PROBABILITY, MAX_PROBABILITY);

        tracing::debug!(
            policy = Self::ID,
            count = terms.count,
            direction = terms.direction,
            attempted = terms.attempted,
            probability,
            "scored attempt"
        );
        probability
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedFeaturePolicy {
    pub fallback_probability: f64,
}

impl Default for WeightedFeaturePolicy {
    fn default() -> Self {
        Self::from_config(&RecognizerConfig::default())
    }
}

impl WeightedFeaturePolicy {
    pub const ID: &'static str = "weighted-feature/v1";

    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self { fallback_probability: config.fallback_probability }
    }
}

impl ScoringPolicy for WeightedFeaturePolicy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn score(
        &self,
        pattern: Option<&CharacterPattern>,
        drawn: &[StrokeFeatures],
        _jitter: &mut dyn Jitter,
    ) -> f64 {
        let Some(pattern) = pattern else {
            return self.fallback_probability;
        };
        if drawn.is_empty() {
            return 0.0;
        }

        let mut score = if pattern.stroke_count == drawn.len() { 0.3 } else { 0.0 };
        let per_stroke = 0.7 / pattern.stroke_count.max(drawn.len()) as f64;
        for (spec, got) in pattern.strokes.iter().zip(drawn) {
            let mut s = 0.0;
            if spec.direction == got.direction {
                s += 0.5;
            }
            if spec.position.is_close(got.position) {
                s += 0.3;
            }
            if spec.length == got.length {
                s += 0.2;
            }
            score += s * per_stroke;
        }

        let probability = score.clamp(0.0, 1.0);
        tracing::debug!(policy = Self::ID, probability, "scored attempt");
        probability
    }
}

/// Score `drawn` against every candidate glyph and return the best one.
///
/// Ties keep the earliest candidate.
pub fn best_match<'c>(
    policy: &dyn ScoringPolicy,
    drawn: &[StrokeFeatures],
    candidates: &[&'c str],
    jitter: &mut dyn Jitter,
) -> Option<(&'c str, f64)> {
    let mut best: Option<(&'c str, f64)> = None;
    for &glyph in candidates {
        let probability = policy.score(pattern_for(glyph), drawn, jitter);
        match best {
            Some((_, top)) if probability <= top => {}
            _ => best = Some((glyph, probability)),
        }
    }
    best
}
