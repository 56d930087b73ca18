// Browser-only checks for the wasm bindings. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use kana_sketch::web::{
    KanaGame, attach_drawing_canvas, clear_drawing, drawing_stroke_count, format_time,
    recognize_drawing,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, MouseEvent, MouseEventInit};

wasm_bindgen_test_configure!(run_in_browser);

fn fire(canvas: &HtmlCanvasElement, kind: &str, x: i32, y: i32) {
    let init = MouseEventInit::new();
    init.set_client_x(x);
    init.set_client_y(y);
    let evt = MouseEvent::new_with_mouse_event_init_dict(kind, &init).unwrap();
    canvas.dispatch_event(&evt).unwrap();
}

fn mount_canvas(id: &str) -> HtmlCanvasElement {
    let doc = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = doc.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_id(id);
    canvas.set_width(300);
    canvas.set_height(300);
    doc.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn kana_game_plays_a_card() {
    let mut game = KanaGame::new("katakana", "recognition").unwrap();
    assert_eq!(game.total(), 15);
    let romaji = game.romaji().unwrap();
    assert_eq!(game.answer_romaji(&romaji), "correct");
    assert_eq!(game.score(), 1);
    assert_eq!(game.answer_romaji("??"), "incorrect");
    assert!(game.hint_available());
}

#[wasm_bindgen_test]
fn unknown_mode_is_an_error() {
    assert!(KanaGame::new("hiragana", "speedrun").is_err());
}

#[wasm_bindgen_test]
fn reattaching_a_canvas_records_each_point_once() {
    let canvas = mount_canvas("reattach-canvas");
    attach_drawing_canvas("reattach-canvas").unwrap();
    attach_drawing_canvas("reattach-canvas").unwrap();
    clear_drawing();

    fire(&canvas, "mousedown", 20, 20);
    fire(&canvas, "mousemove", 60, 60);
    fire(&canvas, "mousemove", 100, 100);
    fire(&canvas, "mouseup", 100, 100);
    assert_eq!(drawing_stroke_count(), 1);

    let json = recognize_drawing("ノ").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let points = value["animationData"]["strokes"][0].as_array().unwrap();
    assert_eq!(points.len(), 3);
}

#[wasm_bindgen_test]
fn time_formatting() {
    assert_eq!(format_time(Some(75)), "1:15");
    assert_eq!(format_time(None), "--");
}
