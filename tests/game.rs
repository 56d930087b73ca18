// Quiz session flow driven through the public API only.

use kana_sketch::game::rank_message;
use kana_sketch::{AnswerOutcome, GameMode, GameSession, Script};

fn answer_current(game: &mut GameSession, now_ms: f64) -> AnswerOutcome {
    let romaji = game.current().expect("game still running").romaji;
    game.answer_romaji(romaji, now_ms)
}

#[test]
fn perfect_run_completes_the_deck() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Recognition, 3);
    assert_eq!(game.total(), 15);

    let mut now = 0.0;
    for _ in 0..14 {
        now += 2_000.0;
        assert_eq!(answer_current(&mut game, now), AnswerOutcome::Correct);
    }
    now += 2_000.0;
    assert_eq!(answer_current(&mut game, now), AnswerOutcome::DeckComplete { perfect: true });

    assert!(game.is_finished());
    assert!(game.is_perfect());
    assert_eq!(game.score(), 15);
    assert_eq!(game.chances(), 5);
    assert!(game.current().is_none());
    assert_eq!(game.rank_message(), "Perfect Master! Exceptional work!");
    // Timer runs from the first correct answer and then stops.
    assert_eq!(game.elapsed_seconds(now + 60_000.0), 28);
    assert_eq!(game.answer_romaji("a", now), AnswerOutcome::Ignored);
}

#[test]
fn running_out_of_chances_ends_the_game() {
    let mut game = GameSession::with_seed(Script::Katakana, GameMode::Recognition, 8);
    for expected_chances in (1..5).rev() {
        assert_eq!(game.answer_romaji("not romaji", 0.0), AnswerOutcome::Incorrect);
        assert_eq!(game.chances(), expected_chances);
    }
    assert_eq!(game.answer_romaji("still wrong", 0.0), AnswerOutcome::OutOfChances);
    assert!(game.is_finished());
    assert!(!game.is_perfect());
    assert_eq!(game.wrong_answers(), 5);
    assert_eq!(game.score(), 0);
    assert_eq!(game.answer_drawing(1.0, 0.0), AnswerOutcome::Ignored);
}

#[test]
fn romaji_answers_ignore_case_and_whitespace() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Recognition, 21);
    let romaji = game.current().unwrap().romaji.to_uppercase();
    assert_eq!(game.answer_romaji(&format!("  {romaji} "), 0.0), AnswerOutcome::Correct);
}

#[test]
fn hint_stays_available_once_a_miss_happened() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Recognition, 4);
    assert!(!game.hint_available());
    game.answer_romaji("xyz", 0.0);
    assert!(game.hint_available());
    assert_eq!(game.index(), 0);
    answer_current(&mut game, 1_000.0);
    assert_eq!(game.index(), 1);
    assert_eq!(game.wrong_answers(), 1);
    assert!(game.hint_available());

    game.reset();
    assert!(!game.hint_available());
    game.answer_romaji("xyz", 0.0);
    game.set_mode(GameMode::Drawing);
    assert!(!game.hint_available());
}

#[test]
fn completing_the_deck_after_a_miss_is_not_perfect() {
    let mut game = GameSession::with_seed(Script::Katakana, GameMode::Recognition, 17);
    assert_eq!(game.answer_romaji("wrong", 0.0), AnswerOutcome::Incorrect);
    for _ in 0..14 {
        assert_eq!(answer_current(&mut game, 1_000.0), AnswerOutcome::Correct);
    }
    assert_eq!(
        answer_current(&mut game, 2_000.0),
        AnswerOutcome::DeckComplete { perfect: false }
    );
    assert!(game.is_finished());
    assert!(!game.is_perfect());
    assert_eq!(game.score(), 15);
    assert_eq!(game.chances(), 4);
}

#[test]
fn translation_accepts_meaning_or_romaji() {
    let mut game = GameSession::with_seed(Script::Katakana, GameMode::Translation, 9);
    let item = *game.current().unwrap();
    let meaning = item.meaning().unwrap();
    assert_eq!(
        game.answer_translation(&meaning.to_uppercase(), 0.0),
        AnswerOutcome::Correct
    );

    let item = *game.current().unwrap();
    assert_eq!(game.answer_translation(item.romaji, 0.0), AnswerOutcome::Correct);
    assert_eq!(game.answer_translation("definitely wrong", 0.0), AnswerOutcome::Incorrect);
}

#[test]
fn drawing_answers_use_the_pass_threshold() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Drawing, 6);
    assert_eq!(game.answer_drawing(0.69, 0.0), AnswerOutcome::Incorrect);
    assert_eq!(game.answer_drawing(0.7, 0.0), AnswerOutcome::Correct);

    game.set_pass_threshold(0.9);
    assert_eq!(game.answer_drawing(0.85, 0.0), AnswerOutcome::Incorrect);
    assert_eq!(game.answer_drawing(0.95, 0.0), AnswerOutcome::Correct);
}

#[test]
fn reset_restores_counters_and_redeals() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Recognition, 12);
    answer_current(&mut game, 0.0);
    game.answer_romaji("nope", 500.0);
    game.reset();
    assert_eq!(game.score(), 0);
    assert_eq!(game.chances(), 5);
    assert_eq!(game.wrong_answers(), 0);
    assert_eq!(game.index(), 0);
    assert!(!game.is_finished());
    assert_eq!(game.elapsed_seconds(99_000.0), 0);
}

#[test]
fn switching_script_and_mode_redeals() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Recognition, 13);
    game.set_script(Script::Katakana);
    assert!(game.deck().iter().all(|item| {
        item.character
            .chars()
            .filter(|c| *c != 'ー')
            .all(|c| Script::of(&c.to_string()) == Some(Script::Katakana))
    }));
    game.set_mode(GameMode::Translation);
    assert_eq!(game.mode(), GameMode::Translation);
    assert!(game.deck().iter().all(|item| item.is_translatable()));
}

#[test]
fn leaderboard_entry_carries_time_only_when_finished() {
    let mut game = GameSession::with_seed(Script::Hiragana, GameMode::Drawing, 14);
    game.answer_drawing(0.9, 1_000.0);
    let entry = game.leaderboard_entry("  mika ", 5_000.0);
    assert_eq!(entry.username, "mika");
    assert_eq!(entry.score, 1);
    assert_eq!(entry.mode, "drawing");
    assert_eq!(entry.time_taken, None);

    for i in 0..14 {
        game.answer_drawing(0.9, 2_000.0 + 1_000.0 * i as f64);
    }
    assert!(game.is_finished());
    let entry = game.leaderboard_entry("mika", 90_000.0);
    assert_eq!(entry.time_taken, Some(14));
}

#[test]
fn rank_message_for_partial_scores() {
    assert_eq!(rank_message(12, 15), "Advanced! Excellent progress!");
    assert_eq!(rank_message(5, 15), "Beginner! Every step counts!");
}
