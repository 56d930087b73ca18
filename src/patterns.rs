//! Hand-authored stroke patterns, one table per script.
//!
//! Each entry lists the expected strokes in canonical stroke order. The
//! tables are coarse on purpose: they describe what a learner's freehand
//! stroke should roughly look like, not calligraphic detail. Directions are
//! the class `FeatureExtractor` assigns to a natural drawing, which is not
//! always the textbook one: a `フ` shaped stroke (across, then down to the
//! left) ends almost below where it starts and reads as vertical, and `く`
//! and `へ` read as vertical and horizontal from their end points.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::features::{Direction, LengthClass, Position, StrokeFeatures};

/// The two syllabaries the quiz covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    #[default]
    Hiragana,
    Katakana,
}

impl Script {
    /// Script of the first character of `glyph`, if it is kana at all.
    pub fn of(glyph: &str) -> Option<Script> {
        match glyph.chars().next()? {
            '\u{3040}'..='\u{309F}' => Some(Script::Hiragana),
            '\u{30A0}'..='\u{30FF}' => Some(Script::Katakana),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Script::Hiragana => "hiragana",
            Script::Katakana => "katakana",
        }
    }
}

/// Expected features of one stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeSpec {
    pub direction: Direction,
    pub position: Position,
    pub length: LengthClass,
    pub curved: bool,
}

impl StrokeSpec {
    /// The features a perfectly drawn stroke would produce.
    pub fn features(&self) -> StrokeFeatures {
        StrokeFeatures {
            direction: self.direction,
            position: self.position,
            length: self.length,
            curved: self.curved,
        }
    }
}

/// Expected stroke sequence of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterPattern {
    pub stroke_count: usize,
    pub strokes: &'static [StrokeSpec],
}

const fn s(direction: Direction, position: Position, length: LengthClass) -> StrokeSpec {
    StrokeSpec {
        direction,
        position,
        length,
        curved: matches!(direction, Direction::Curve),
    }
}

const fn p(strokes: &'static [StrokeSpec]) -> CharacterPattern {
    CharacterPattern { stroke_count: strokes.len(), strokes }
}

use Direction::{Curve as Cv, DiagonalLeft as Dl, DiagonalRight as Dr, Hook as Hk, Horizontal as H, Vertical as V};
use LengthClass::{Long as L, Medium as M, Short as S};
use Position::{
    Bottom as B, BottomLeft as BL, BottomRight as BR, Center as C, Left as Lf, Right as R,
    Top as T, TopLeft as TL, TopRight as TR,
};

pub static HIRAGANA_PATTERNS: &[(&str, CharacterPattern)] = &[
    ("あ", p(&[s(H, T, M), s(V, C, L), s(Cv, C, L)])),
    ("い", p(&[s(Hk, Lf, M), s(V, R, M)])),
    ("う", p(&[s(H, T, S), s(Cv, C, L)])),
    ("え", p(&[s(H, T, M), s(V, C, L)])),
    ("お", p(&[s(H, T, M), s(V, Lf, M), s(Cv, R, L)])),
    ("か", p(&[s(H, T, M), s(V, Lf, L), s(Dr, R, M)])),
    ("き", p(&[s(H, T, S), s(V, Lf, L), s(H, C, S), s(Dr, R, M)])),
    ("く", p(&[s(V, C, L)])),
    ("け", p(&[s(H, T, M), s(V, Lf, L), s(Dr, C, M)])),
    ("こ", p(&[s(H, T, M), s(H, B, L)])),
    ("さ", p(&[s(H, T, M), s(V, Lf, M), s(Cv, R, L)])),
    ("し", p(&[s(Cv, C, L)])),
    ("す", p(&[s(H, T, M), s(Cv, B, L)])),
    ("せ", p(&[s(H, T, M), s(V, Lf, M), s(H, B, M)])),
    ("そ", p(&[s(Cv, C, L)])),
    ("た", p(&[s(H, T, M), s(V, Lf, M), s(H, C, L), s(V, C, S)])),
    ("ち", p(&[s(H, T, M), s(Cv, B, L)])),
    ("つ", p(&[s(Cv, C, M)])),
    ("て", p(&[s(Cv, C, L)])),
    ("と", p(&[s(V, Lf, L), s(Cv, R, M)])),
    ("な", p(&[s(H, T, M), s(V, Lf, L), s(Dr, C, M), s(H, B, M)])),
    ("に", p(&[s(V, Lf, L), s(H, TR, S), s(H, BR, M)])),
    ("ぬ", p(&[s(Dr, Lf, M), s(Cv, R, L)])),
    ("ね", p(&[s(H, T, M), s(Cv, B, L)])),
    ("の", p(&[s(Cv, C, L)])),
    ("は", p(&[s(V, Lf, L), s(Cv, C, M), s(Cv, R, M)])),
    ("ひ", p(&[s(Cv, C, L)])),
    ("ふ", p(&[s(H, T, S), s(V, Lf, S), s(H, C, S), s(Cv, B, L)])),
    ("へ", p(&[s(H, C, M)])),
    ("ほ", p(&[s(V, Lf, L), s(H, T, S), s(V, C, S), s(Cv, R, M)])),
    ("ま", p(&[s(H, T, M), s(H, C, M), s(Cv, C, L)])),
    ("み", p(&[s(Cv, Lf, L), s(Dl, R, M)])),
    ("む", p(&[s(H, T, M), s(Cv, C, L), s(Dr, TR, S)])),
    ("め", p(&[s(Dr, Lf, M), s(Cv, C, L)])),
    ("も", p(&[s(Cv, C, L), s(H, T, S), s(H, C, S)])),
    ("や", p(&[s(Cv, C, L), s(Dr, T, S), s(Dl, C, L)])),
    ("ゆ", p(&[s(Cv, C, L), s(V, C, L)])),
    ("よ", p(&[s(H, TR, S), s(Cv, C, L)])),
    ("ら", p(&[s(Dr, T, S), s(Cv, C, L)])),
    ("り", p(&[s(Hk, Lf, M), s(Cv, R, L)])),
    ("る", p(&[s(Cv, C, L)])),
    ("れ", p(&[s(V, Lf, L), s(Cv, R, L)])),
    ("ろ", p(&[s(Cv, C, L)])),
    ("わ", p(&[s(V, Lf, L), s(Cv, R, L)])),
    ("を", p(&[s(H, T, M), s(Cv, C, M), s(Cv, B, M)])),
    ("ん", p(&[s(Cv, C, L)])),
];

pub static KATAKANA_PATTERNS: &[(&str, CharacterPattern)] = &[
    ("ア", p(&[s(H, T, L), s(Dl, C, L)])),
    ("イ", p(&[s(V, Lf, L), s(Dr, R, L)])),
    ("ウ", p(&[s(H, T, S), s(V, Lf, M), s(H, B, M)])),
    ("エ", p(&[s(H, T, M), s(H, C, S), s(H, B, L)])),
    ("オ", p(&[s(H, T, M), s(V, Lf, L), s(H, B, M)])),
    ("カ", p(&[s(Cv, C, L), s(Dl, Lf, L)])),
    ("キ", p(&[s(H, T, M), s(H, C, S), s(V, R, L)])),
    ("ク", p(&[s(Dl, TL, S), s(V, C, L)])),
    ("ケ", p(&[s(H, T, M), s(V, Lf, L), s(Dr, C, M)])),
    ("コ", p(&[s(H, T, M), s(H, B, M)])),
    ("サ", p(&[s(H, C, L), s(V, Lf, M), s(Dl, R, L)])),
    ("シ", p(&[s(Dr, TL, S), s(Dr, Lf, S), s(Dl, B, M)])),
    ("ス", p(&[s(V, C, L), s(Dr, BR, S)])),
    ("セ", p(&[s(H, C, L), s(Cv, C, L)])),
    ("ソ", p(&[s(Dr, TL, S), s(Dl, R, L)])),
    ("タ", p(&[s(Dl, Lf, M), s(Dl, C, L), s(Dr, C, S)])),
    ("チ", p(&[s(Dl, T, S), s(H, C, L), s(Dl, B, M)])),
    ("ツ", p(&[s(Dr, TL, S), s(Dr, T, S), s(Dl, R, L)])),
    ("テ", p(&[s(H, T, M), s(H, C, L), s(Dl, B, M)])),
    ("ト", p(&[s(V, Lf, L), s(Dr, R, S)])),
    ("ナ", p(&[s(H, C, L), s(Dl, C, L)])),
    ("ニ", p(&[s(H, T, M), s(H, B, L)])),
    ("ヌ", p(&[s(V, C, L), s(Dr, C, M)])),
    ("ネ", p(&[s(Dr, T, S), s(Dl, C, L), s(V, B, M), s(Dr, R, S)])),
    ("ノ", p(&[s(Dl, C, L)])),
    ("ハ", p(&[s(Dl, Lf, M), s(Dr, R, M)])),
    ("ヒ", p(&[s(H, T, M), s(Cv, Lf, L)])),
    ("フ", p(&[s(V, C, L)])),
    ("ヘ", p(&[s(H, C, M)])),
    ("ホ", p(&[s(H, T, L), s(V, C, L), s(Dl, BL, S), s(Dr, BR, S)])),
    ("マ", p(&[s(Dl, T, L), s(Dr, C, S)])),
    ("ミ", p(&[s(Dr, T, S), s(Dr, C, S), s(Dr, B, M)])),
    ("ム", p(&[s(Cv, C, L), s(Dr, BR, S)])),
    ("メ", p(&[s(Dl, C, L), s(Dr, C, S)])),
    ("モ", p(&[s(H, T, M), s(H, C, L), s(Cv, C, L)])),
    ("ヤ", p(&[s(H, T, L), s(V, C, L)])),
    ("ユ", p(&[s(H, C, M), s(H, B, L)])),
    ("ヨ", p(&[s(H, T, M), s(H, C, M), s(H, B, M)])),
    ("ラ", p(&[s(H, T, S), s(V, C, L)])),
    ("リ", p(&[s(V, Lf, M), s(V, R, L)])),
    ("ル", p(&[s(V, Lf, L), s(Hk, R, L)])),
    ("レ", p(&[s(Cv, C, L)])),
    ("ロ", p(&[s(V, Lf, M), s(H, T, M), s(H, B, M)])),
    ("ワ", p(&[s(V, Lf, S), s(V, C, L)])),
    ("ヲ", p(&[s(H, T, M), s(H, C, M), s(Dl, C, L)])),
    ("ン", p(&[s(Dr, TL, S), s(Dl, R, L)])),
];

fn index(table: &'static [(&'static str, CharacterPattern)]) -> HashMap<&'static str, &'static CharacterPattern> {
    table.iter().map(|(glyph, pattern)| (*glyph, pattern)).collect()
}

fn hiragana_index() -> &'static HashMap<&'static str, &'static CharacterPattern> {
    static IDX: OnceLock<HashMap<&'static str, &'static CharacterPattern>> = OnceLock::new();
    IDX.get_or_init(|| index(HIRAGANA_PATTERNS))
}

fn katakana_index() -> &'static HashMap<&'static str, &'static CharacterPattern> {
    static IDX: OnceLock<HashMap<&'static str, &'static CharacterPattern>> = OnceLock::new();
    IDX.get_or_init(|| index(KATAKANA_PATTERNS))
}

/// Look a glyph up in one script's table.
pub fn pattern_in(script: Script, glyph: &str) -> Option<&'static CharacterPattern> {
    match script {
        Script::Hiragana => hiragana_index().get(glyph).copied(),
        Script::Katakana => katakana_index().get(glyph).copied(),
    }
}

/// Look a glyph up in the table of the script it belongs to.
///
/// Absence is a normal outcome: the quiz datasets include words and
/// characters nobody authored a pattern for.
pub fn pattern_for(glyph: &str) -> Option<&'static CharacterPattern> {
    pattern_in(Script::of(glyph)?, glyph)
}
