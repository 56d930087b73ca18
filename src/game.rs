//! Quiz flow: deck, score, chances, timer.
//!
//! The session never reads a clock itself; every call that can start or
//! stop the timer takes the caller's millisecond timestamp.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PASS_THRESHOLD, GameConfig};
use crate::kana::{QuizItem, dataset};
use crate::leaderboard::LeaderboardEntry;
use crate::patterns::Script;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Type the romaji for the shown kana.
    #[default]
    Recognition,
    /// Draw the kana for the shown romaji.
    Drawing,
    /// Type the English meaning of a word.
    Translation,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Recognition => "recognition",
            GameMode::Drawing => "drawing",
            GameMode::Translation => "translation",
        }
    }
}

/// A script or mode name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} `{value}`")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
}

impl FromStr for GameMode {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recognition" => Ok(GameMode::Recognition),
            "drawing" => Ok(GameMode::Drawing),
            "translation" => Ok(GameMode::Translation),
            _ => Err(ParseNameError { kind: "game mode", value: s.to_string() }),
        }
    }
}

impl FromStr for Script {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hiragana" => Ok(Script::Hiragana),
            "katakana" => Ok(Script::Katakana),
            _ => Err(ParseNameError { kind: "script", value: s.to_string() }),
        }
    }
}

/// What an answer did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// Last card answered correctly. `perfect` when no answer in the
    /// session was wrong.
    DeckComplete { perfect: bool },
    /// Wrong answer that used the last chance.
    OutOfChances,
    /// The game is already over.
    Ignored,
}

/// Shuffle the script's dataset and keep the first `size` cards.
///
/// Translation decks only contain words with a `Means` tip.
pub fn deal_deck<R: Rng + ?Sized>(
    script: Script,
    mode: GameMode,
    size: usize,
    rng: &mut R,
) -> Vec<QuizItem> {
    let mut deck: Vec<QuizItem> = dataset(script)
        .iter()
        .filter(|item| mode != GameMode::Translation || item.is_translatable())
        .copied()
        .collect();
    deck.shuffle(rng);
    deck.truncate(size);
    deck
}

pub fn rank_message(score: u32, total: usize) -> &'static str {
    if total == 0 {
        return "Beginner! Every step counts!";
    }
    // Compare score/total against each tier without going through floats.
    let scaled = u64::from(score) * 100;
    let at_least = |percent: u64| scaled >= percent * total as u64;
    if at_least(100) {
        "Perfect Master! Exceptional work!"
    } else if at_least(90) {
        "Expert Level! Outstanding performance!"
    } else if at_least(75) {
        "Advanced! Excellent progress!"
    } else if at_least(60) {
        "Intermediate! Keep up the great work!"
    } else if at_least(40) {
        "Developing! You're improving steadily!"
    } else {
        "Beginner! Every step counts!"
    }
}

#[derive(Debug, Clone)]
pub struct GameSession {
    script: Script,
    mode: GameMode,
    config: GameConfig,
    pass_threshold: f64,
    deck: Vec<QuizItem>,
    index: usize,
    score: u32,
    chances: u32,
    wrong_answers: u32,
    started_at: Option<f64>,
    finished_at: Option<f64>,
    finished: bool,
    perfect: bool,
    rng: StdRng,
}

impl GameSession {
    /// New session with a deck dealt from `rng`.
    pub fn new(script: Script, mode: GameMode, config: GameConfig, rng: StdRng) -> Self {
        let mut session = Self {
            script,
            mode,
            chances: config.starting_chances,
            config,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            deck: Vec::new(),
            index: 0,
            score: 0,
            wrong_answers: 0,
            started_at: None,
            finished_at: None,
            finished: false,
            perfect: false,
            rng,
        };
        session.reset();
        session
    }

    pub fn with_seed(script: Script, mode: GameMode, seed: u64) -> Self {
        Self::new(script, mode, GameConfig::default(), StdRng::seed_from_u64(seed))
    }

    #[cfg(feature = "rng")]
    pub fn from_entropy(script: Script, mode: GameMode) -> Self {
        Self::new(script, mode, GameConfig::default(), StdRng::from_entropy())
    }

    /// Threshold `answer_drawing` compares recognition probabilities against.
    pub fn set_pass_threshold(&mut self, threshold: f64) {
        self.pass_threshold = threshold;
    }

    /// Deal a fresh deck and restore the starting counters.
    pub fn reset(&mut self) {
        self.deck = deal_deck(self.script, self.mode, self.config.deck_size, &mut self.rng);
        self.index = 0;
        self.score = 0;
        self.chances = self.config.starting_chances;
        self.wrong_answers = 0;
        self.started_at = None;
        self.finished_at = None;
        self.finished = self.deck.is_empty();
        self.perfect = false;
        tracing::info!(
            script = self.script.as_str(),
            mode = self.mode.as_str(),
            cards = self.deck.len(),
            "deck dealt"
        );
    }

    pub fn set_script(&mut self, script: Script) {
        self.script = script;
        self.reset();
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn deck(&self) -> &[QuizItem] {
        &self.deck
    }

    pub fn total(&self) -> usize {
        self.deck.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&QuizItem> {
        if self.finished {
            return None;
        }
        self.deck.get(self.index)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn chances(&self) -> u32 {
        self.chances
    }

    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    /// Hints unlock after the first wrong answer and stay until reset.
    pub fn hint_available(&self) -> bool {
        self.wrong_answers > 0
    }

    /// Whole seconds on the clock, frozen once the deck is complete.
    pub fn elapsed_seconds(&self, now_ms: f64) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.finished_at.unwrap_or(now_ms);
        ((end - start).max(0.0) / 1000.0).floor() as u64
    }

    pub fn rank_message(&self) -> &'static str {
        rank_message(self.score, self.total())
    }

    pub fn answer_romaji(&mut self, answer: &str, now_ms: f64) -> AnswerOutcome {
        let Some(item) = self.current() else {
            return AnswerOutcome::Ignored;
        };
        let correct = answer.trim().eq_ignore_ascii_case(item.romaji);
        self.record(correct, now_ms)
    }

    /// Accepts the quoted meaning from the tip or the romaji.
    pub fn answer_translation(&mut self, answer: &str, now_ms: f64) -> AnswerOutcome {
        let Some(item) = self.current() else {
            return AnswerOutcome::Ignored;
        };
        let answer = answer.trim().to_lowercase();
        let correct = item.meaning().is_some_and(|m| m == answer)
            || answer.eq_ignore_ascii_case(item.romaji);
        self.record(correct, now_ms)
    }

    pub fn answer_drawing(&mut self, probability: f64, now_ms: f64) -> AnswerOutcome {
        if self.current().is_none() {
            return AnswerOutcome::Ignored;
        }
        self.record(probability >= self.pass_threshold, now_ms)
    }

    fn record(&mut self, correct: bool, now_ms: f64) -> AnswerOutcome {
        if correct {
            self.started_at.get_or_insert(now_ms);
            self.score += 1;
            if self.index + 1 >= self.deck.len() {
                self.finished = true;
                self.finished_at = Some(now_ms);
                self.perfect = self.wrong_answers == 0;
                tracing::info!(score = self.score, perfect = self.perfect, "deck complete");
                return AnswerOutcome::DeckComplete { perfect: self.perfect };
            }
            self.index += 1;
            AnswerOutcome::Correct
        } else {
            self.wrong_answers += 1;
            self.chances = self.chances.saturating_sub(1);
            if self.chances == 0 {
                self.finished = true;
                tracing::info!(score = self.score, "out of chances");
                return AnswerOutcome::OutOfChances;
            }
            AnswerOutcome::Incorrect
        }
    }

    /// Leaderboard row for the finished session.
    pub fn leaderboard_entry(&self, username: &str, timestamp_ms: f64) -> LeaderboardEntry {
        let seconds = self.elapsed_seconds(timestamp_ms);
        LeaderboardEntry {
            username: username.trim().to_string(),
            score: self.score,
            timestamp: timestamp_ms,
            mode: self.mode.as_str().to_string(),
            time_taken: (self.started_at.is_some() && self.finished_at.is_some()).then_some(seconds),
        }
    }
}
