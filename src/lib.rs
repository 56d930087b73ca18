//! Kana Sketch core crate.
//!
//! Flashcard quiz for hiragana and katakana. Learners type romaji, translate
//! words, or draw the kana freehand; drawings are scored by a small
//! geometric recognizer (stroke direction, position, length and curvature
//! compared against hand-authored patterns).
//!
//! Everything except `web` is plain Rust and runs natively; `web` binds the
//! recognizer, the quiz session and the leaderboard to a browser page.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod features;
pub mod game;
pub mod kana;
pub mod leaderboard;
pub mod patterns;
pub mod recognizer;
pub mod scoring;
pub mod stroke;
pub mod web;

pub use config::{ConfigError, GameConfig, RecognizerConfig};
pub use features::{CanvasSize, Direction, FeatureExtractor, LengthClass, Position, StrokeFeatures};
pub use game::{AnswerOutcome, GameMode, GameSession};
pub use kana::{HIRAGANA, KATAKANA, QuizItem};
pub use leaderboard::{KeyValueStore, Leaderboard, LeaderboardEntry, LeaderboardError, MemoryStore};
pub use patterns::{CharacterPattern, Script, StrokeSpec, pattern_for};
pub use recognizer::{AnimationData, RecognitionEngine, RecognitionResult, Recognizer};
pub use scoring::{CountDirectionPolicy, Jitter, NoJitter, ScoringPolicy, SeededJitter, WeightedFeaturePolicy};
pub use stroke::{CaptureError, Point, Stroke, StrokeCapture, StrokeSession};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Stroke count of the authored pattern for `glyph`, if there is one.
#[wasm_bindgen]
pub fn expected_stroke_count(glyph: &str) -> Option<u32> {
    pattern_for(glyph).map(|p| p.stroke_count as u32)
}

/// The built-in quiz items for `script` as a JSON array.
#[wasm_bindgen]
pub fn dataset_json(script: &str) -> Result<String, JsValue> {
    let script: Script = script
        .parse()
        .map_err(|e: game::ParseNameError| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(kana::dataset(script)).map_err(|e| JsValue::from_str(&e.to_string()))
}
