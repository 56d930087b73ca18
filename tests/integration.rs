// Integration tests (native) for the `kana-sketch` crate.
// These tests avoid browser APIs and exercise the exported functions that
// are plain Rust underneath, so they run under `cargo test` on the host.

#[test]
fn expected_stroke_count_matches_patterns() {
    assert_eq!(kana_sketch::expected_stroke_count("あ"), Some(3));
    assert_eq!(kana_sketch::expected_stroke_count("ノ"), Some(1));
    assert_eq!(kana_sketch::expected_stroke_count("ねこ"), None);
}

#[test]
fn dataset_json_lists_every_item() {
    let json = kana_sketch::dataset_json("Hiragana").unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(items.len(), kana_sketch::HIRAGANA.len());
    assert_eq!(items[0]["character"], "あ");
    assert_eq!(items[0]["romaji"], "a");
}

#[test]
fn replay_reveals_strokes_in_order() {
    use kana_sketch::web::{replay_duration, replay_frame};

    let lens = [10, 4];
    assert_eq!(replay_frame(&lens, 0.0), vec![0, 0]);
    assert_eq!(replay_frame(&lens, replay_duration(2)), vec![10, 4]);
    assert!(replay_duration(2) > replay_duration(1));
}
