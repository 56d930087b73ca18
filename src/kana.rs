//! Built-in quiz content.
//!
//! Single kana carry a pronunciation tip; words carry a `Means '...'` tip
//! which the translation mode reads the expected answer from.

use serde::Serialize;

use crate::patterns::Script;

/// One flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuizItem {
    pub character: &'static str,
    pub romaji: &'static str,
    pub tip: &'static str,
}

const fn q(character: &'static str, romaji: &'static str, tip: &'static str) -> QuizItem {
    QuizItem { character, romaji, tip }
}

impl QuizItem {
    /// More than one glyph: a vocabulary word rather than a single kana.
    pub fn is_word(&self) -> bool {
        self.character.chars().count() > 1
    }

    /// The meaning quoted in a `Means 'x'` tip, lowercased.
    pub fn meaning(&self) -> Option<String> {
        let lower = self.tip.to_lowercase();
        let rest = &lower[lower.find("means ")? + "means ".len()..];
        let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let body = &rest[quote.len_utf8()..];
        let end = body.find(['\'', '"'])?;
        let meaning = body[..end].trim();
        (!meaning.is_empty()).then(|| meaning.to_string())
    }

    /// Eligible for the translation round.
    pub fn is_translatable(&self) -> bool {
        self.is_word() && self.tip.contains("Means")
    }
}

pub const HIRAGANA: &[QuizItem] = &[
    q("あ", "a", "Like 'a' in father"),
    q("い", "i", "Like 'ee' in feet"),
    q("う", "u", "Like 'oo' in food, lips relaxed"),
    q("え", "e", "Like 'e' in bed"),
    q("お", "o", "Like 'o' in go, but shorter"),
    q("か", "ka", "A blade cutting: ka!"),
    q("き", "ki", "Looks like a key"),
    q("く", "ku", "A beak going 'ku ku'"),
    q("け", "ke", "A keg on its side"),
    q("こ", "ko", "Two worms cuddling: ko"),
    q("さ", "sa", "Mirror of ち, say 'sa'"),
    q("し", "shi", "A fishing hook: she fishes"),
    q("す", "su", "A swing with a loop"),
    q("せ", "se", "Someone saying 'se' with a big mouth"),
    q("そ", "so", "Zig and zag: sew it"),
    q("た", "ta", "Looks like 'ta' written together"),
    q("ち", "chi", "A cheerleader's number 5"),
    q("つ", "tsu", "A tsunami wave"),
    q("て", "te", "A hand reaching out: te"),
    q("と", "to", "A toe with a splinter"),
    q("な", "na", "A nun praying at a cross"),
    q("に", "ni", "A knee next to two lines"),
    q("ぬ", "nu", "Noodles with chopsticks"),
    q("ね", "ne", "A cat curled up: neko"),
    q("の", "no", "A 'no entry' sign"),
    q("は", "ha", "Laughing: ha!"),
    q("ひ", "hi", "A big grin: hee hee"),
    q("ふ", "fu", "Mount Fuji at the top"),
    q("へ", "he", "A small hill: hey!"),
    q("ほ", "ho", "A christmas ho ho ho"),
    q("ま", "ma", "A mama with two arms"),
    q("み", "mi", "The number 21"),
    q("む", "mu", "A cow saying moo"),
    q("め", "me", "An eye: me"),
    q("も", "mo", "A fishing hook catching more fish"),
    q("や", "ya", "A yak with horns"),
    q("ゆ", "yu", "A unique fish"),
    q("よ", "yo", "A yo-yo on a string"),
    q("ら", "ra", "A rabbit sitting"),
    q("り", "ri", "Reeds swaying"),
    q("る", "ru", "A loop at the end of a route"),
    q("れ", "re", "A ray of light"),
    q("ろ", "ro", "A road without a loop"),
    q("わ", "wa", "A swan: wa"),
    q("を", "wo", "A man with a stick: whoa"),
    q("ん", "n", "Looks like a lowercase n"),
    q("ねこ", "neko", "Means 'cat'"),
    q("いぬ", "inu", "Means 'dog'"),
    q("さかな", "sakana", "Means 'fish'"),
    q("みず", "mizu", "Means 'water'"),
    q("やま", "yama", "Means 'mountain'"),
    q("かわ", "kawa", "Means 'river'"),
    q("はな", "hana", "Means 'flower'"),
    q("そら", "sora", "Means 'sky'"),
    q("あめ", "ame", "Means 'rain'"),
    q("ゆき", "yuki", "Means 'snow'"),
    q("ほし", "hoshi", "Means 'star'"),
    q("つき", "tsuki", "Means 'moon'"),
    q("くも", "kumo", "Means 'cloud'"),
    q("ひと", "hito", "Means 'person'"),
    q("あし", "ashi", "Means 'foot'"),
    q("くち", "kuchi", "Means 'mouth'"),
    q("みみ", "mimi", "Means 'ear'"),
    q("もり", "mori", "Means 'forest'"),
    q("うみ", "umi", "Means 'sea'"),
    q("いえ", "ie", "Means 'house'"),
];

pub const KATAKANA: &[QuizItem] = &[
    q("ア", "a", "An axe chopping: a!"),
    q("イ", "i", "An easel leaning"),
    q("ウ", "u", "う with a roof"),
    q("エ", "e", "An elevator shaft"),
    q("オ", "o", "An opera singer with arms out"),
    q("カ", "ka", "Same shape as か without the dash"),
    q("キ", "ki", "A key with two teeth"),
    q("ク", "ku", "A cook's hat"),
    q("ケ", "ke", "The letter K tilted"),
    q("コ", "ko", "A corner: ko"),
    q("サ", "sa", "A signpost"),
    q("シ", "shi", "She looks up: strokes rise"),
    q("ス", "su", "A person doing the splits"),
    q("セ", "se", "Like せ, one less stroke"),
    q("ソ", "so", "A needle sewing down"),
    q("タ", "ta", "A tall kite"),
    q("チ", "chi", "A cheerleader's pompom"),
    q("ツ", "tsu", "Tsunami: strokes fall"),
    q("テ", "te", "A telephone pole"),
    q("ト", "to", "A totem pole"),
    q("ナ", "na", "A knife"),
    q("ニ", "ni", "Two lines: ni is two"),
    q("ヌ", "nu", "Chopsticks crossing"),
    q("ネ", "ne", "A necklace"),
    q("ノ", "no", "A single slash: no"),
    q("ハ", "ha", "A roof: ha"),
    q("ヒ", "hi", "A heel"),
    q("フ", "fu", "A bent fuse"),
    q("ヘ", "he", "Same as へ"),
    q("ホ", "ho", "A holy cross"),
    q("マ", "ma", "A mama's hat"),
    q("ミ", "mi", "Three lines: me, me, me"),
    q("ム", "mu", "A moo-ving cow"),
    q("メ", "me", "A mark on a map"),
    q("モ", "mo", "Two bars and a hook: more"),
    q("ヤ", "ya", "A yak's horn"),
    q("ユ", "yu", "A U-turn"),
    q("ヨ", "yo", "A yoga mat folded"),
    q("ラ", "ra", "A rabbit's ear"),
    q("リ", "ri", "Like り, straighter"),
    q("ル", "ru", "Roots of a tree"),
    q("レ", "re", "A ray bouncing"),
    q("ロ", "ro", "A robot's mouth"),
    q("ワ", "wa", "A wine glass"),
    q("ヲ", "wo", "A wobbly ladder"),
    q("ン", "n", "Like ソ but flatter"),
    q("コーヒー", "koohii", "Means 'coffee'"),
    q("テレビ", "terebi", "Means 'television'"),
    q("パン", "pan", "Means 'bread'"),
    q("カメラ", "kamera", "Means 'camera'"),
    q("ホテル", "hoteru", "Means 'hotel'"),
    q("タクシー", "takushii", "Means 'taxi'"),
    q("バス", "basu", "Means 'bus'"),
    q("ペン", "pen", "Means 'pen'"),
    q("ノート", "nooto", "Means 'notebook'"),
    q("ケーキ", "keeki", "Means 'cake'"),
    q("ミルク", "miruku", "Means 'milk'"),
    q("ピアノ", "piano", "Means 'piano'"),
    q("トマト", "tomato", "Means 'tomato'"),
    q("ラジオ", "rajio", "Means 'radio'"),
    q("ゲーム", "geemu", "Means 'game'"),
    q("アイス", "aisu", "Means 'ice cream'"),
    q("レモン", "remon", "Means 'lemon'"),
];

/// Full dataset for one script.
pub fn dataset(script: Script) -> &'static [QuizItem] {
    match script {
        Script::Hiragana => HIRAGANA,
        Script::Katakana => KATAKANA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meaning_extraction() {
        assert_eq!(q("ねこ", "neko", "Means 'cat'").meaning().as_deref(), Some("cat"));
        assert_eq!(
            q("x", "x", "It means \"Ice Cream\" here").meaning().as_deref(),
            Some("ice cream")
        );
        assert_eq!(q("あ", "a", "Like 'a' in father").meaning(), None);
        assert_eq!(q("x", "x", "Means nothing").meaning(), None);
        assert_eq!(q("x", "x", "Means ''").meaning(), None);
    }

    #[test]
    fn test_word_detection() {
        assert!(q("ねこ", "neko", "Means 'cat'").is_translatable());
        // Single glyph words stay out of translation rounds.
        assert!(!q("あ", "a", "Like 'a' in father").is_word());
    }
}
