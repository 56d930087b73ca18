//! Recognition entry point.
//!
//! `RecognitionEngine` is what a quiz turn talks to: it owns the canvas
//! size, the stroke capture state and the recognizer that scores a session
//! against an expected glyph. One engine per quiz instance; there is no
//! global recognizer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RecognizerConfig;
use crate::features::{CanvasSize, Direction, FeatureExtractor, LengthClass, Position, StrokeFeatures};
use crate::patterns::pattern_for;
use crate::scoring::{self, Jitter, NoJitter, ScoringPolicy};
use crate::stroke::{CaptureError, Point, Stroke, StrokeCapture, StrokeSession};

/// Replay payload: the strokes as drawn plus their derived labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    pub strokes: Vec<Stroke>,
    pub directions: Vec<Direction>,
    pub positions: Vec<Position>,
    pub lengths: Vec<LengthClass>,
}

impl AnimationData {
    fn new(session: &StrokeSession, features: &[StrokeFeatures]) -> Self {
        Self {
            strokes: session.strokes().to_vec(),
            directions: features.iter().map(|f| f.direction).collect(),
            positions: features.iter().map(|f| f.position).collect(),
            lengths: features.iter().map(|f| f.length).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub character: String,
    pub probability: f64,
    pub animation_data: AnimationData,
}

/// Anything that can score a stroke session against an expected glyph.
pub trait Recognizer {
    fn name(&self) -> &str;

    /// Whether the recognizer can answer right now.
    fn is_ready(&self) -> bool {
        true
    }

    fn recognize(
        &mut self,
        expected: &str,
        session: &StrokeSession,
        canvas: CanvasSize,
    ) -> RecognitionResult;
}

/// Geometry features plus a `ScoringPolicy`.
pub struct HeuristicRecognizer {
    config: RecognizerConfig,
    policy: Box<dyn ScoringPolicy>,
    jitter: Box<dyn Jitter>,
}

impl fmt::Debug for HeuristicRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeuristicRecognizer")
            .field("policy", &self.policy.id())
            .finish_non_exhaustive()
    }
}

impl Default for HeuristicRecognizer {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl HeuristicRecognizer {
    /// Uses the configured policy. Jitter is entropy seeded when the `rng`
    /// feature is enabled and disabled otherwise.
    pub fn new(config: RecognizerConfig) -> Self {
        let policy = scoring::policy_for(&config);
        Self { config, policy, jitter: default_jitter() }
    }

    pub fn with_policy(mut self, policy: Box<dyn ScoringPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_jitter(mut self, jitter: Box<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy_id(&self) -> &'static str {
        self.policy.id()
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn features(&self, session: &StrokeSession, canvas: CanvasSize) -> Vec<StrokeFeatures> {
        let extractor = FeatureExtractor::new(canvas, &self.config);
        session.strokes().iter().map(|s| extractor.extract(s)).collect()
    }

    /// Highest scoring glyph among `candidates`; ties keep the first.
    pub fn best_match<'c>(
        &mut self,
        session: &StrokeSession,
        canvas: CanvasSize,
        candidates: &[&'c str],
    ) -> Option<(&'c str, f64)> {
        let features = self.features(session, canvas);
        scoring::best_match(self.policy.as_ref(), &features, candidates, self.jitter.as_mut())
    }
}

impl Recognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn recognize(
        &mut self,
        expected: &str,
        session: &StrokeSession,
        canvas: CanvasSize,
    ) -> RecognitionResult {
        let features = self.features(session, canvas);
        let pattern = pattern_for(expected);
        if pattern.is_none() {
            tracing::debug!(character = expected, "no pattern, using fallback probability");
        }
        let probability = self.policy.score(pattern, &features, self.jitter.as_mut());
        RecognitionResult {
            character: expected.to_string(),
            probability,
            animation_data: AnimationData::new(session, &features),
        }
    }
}

#[cfg(feature = "rng")]
fn default_jitter() -> Box<dyn Jitter> {
    Box::new(scoring::SeededJitter::from_entropy())
}

#[cfg(not(feature = "rng"))]
fn default_jitter() -> Box<dyn Jitter> {
    Box::new(NoJitter)
}

/// Per-quiz recognition state.
pub struct RecognitionEngine {
    canvas: CanvasSize,
    capture: StrokeCapture,
    heuristic: HeuristicRecognizer,
    backend: Option<Box<dyn Recognizer>>,
}

impl Default for RecognitionEngine {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl RecognitionEngine {
    pub fn new(config: RecognizerConfig) -> Self {
        Self::with_heuristic(HeuristicRecognizer::new(config))
    }

    pub fn with_heuristic(heuristic: HeuristicRecognizer) -> Self {
        Self {
            canvas: CanvasSize::default(),
            capture: StrokeCapture::new(),
            heuristic,
            backend: None,
        }
    }

    /// Deterministic engine for tests and replays.
    pub fn deterministic(config: RecognizerConfig) -> Self {
        Self::with_heuristic(HeuristicRecognizer::new(config).with_jitter(Box::new(NoJitter)))
    }

    /// Install an alternate recognizer. It answers only while it reports
    /// ready; the heuristic covers every other call.
    pub fn with_backend(mut self, backend: Box<dyn Recognizer>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Drop the alternate recognizer for the rest of the session.
    pub fn backend_failed(&mut self, reason: &str) {
        if let Some(backend) = self.backend.take() {
            tracing::warn!(
                backend = backend.name(),
                reason,
                "recognizer backend failed, falling back to heuristic"
            );
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas = CanvasSize::new(width, height);
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    pub fn config(&self) -> &RecognizerConfig {
        self.heuristic.config()
    }

    pub fn start_stroke(&mut self, point: Point) -> Result<(), CaptureError> {
        self.capture.start_stroke(point)
    }

    pub fn extend_stroke(&mut self, point: Point) -> Result<(), CaptureError> {
        self.capture.extend_stroke(point)
    }

    pub fn end_stroke(&mut self) -> Result<usize, CaptureError> {
        self.capture.end_stroke()
    }

    pub fn cancel_stroke(&mut self) {
        self.capture.cancel_stroke();
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.capture.active_stroke()
    }

    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.capture.add_stroke(stroke);
    }

    pub fn clear_strokes(&mut self) {
        self.capture.clear_session();
    }

    pub fn stroke_count(&self) -> usize {
        self.capture.session().len()
    }

    pub fn session(&self) -> &StrokeSession {
        self.capture.session()
    }

    pub fn recognize_character(&mut self, expected: &str) -> RecognitionResult {
        let session = self.capture.session();
        let result = match self.backend.as_mut() {
            Some(backend) if backend.is_ready() => backend.recognize(expected, session, self.canvas),
            _ => self.heuristic.recognize(expected, session, self.canvas),
        };
        tracing::debug!(
            character = expected,
            strokes = session.len(),
            probability = result.probability,
            "recognized"
        );
        result
    }

    pub fn best_match<'c>(&mut self, candidates: &[&'c str]) -> Option<(&'c str, f64)> {
        self.heuristic
            .best_match(self.capture.session(), self.canvas, candidates)
    }

    /// Whether `result` clears the configured pass threshold.
    pub fn passes(&self, result: &RecognitionResult) -> bool {
        result.probability >= self.config().pass_threshold
    }
}
