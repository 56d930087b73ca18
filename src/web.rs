//! Browser adapter.
//!
//! Binds mouse and touch input on a canvas to a thread-local
//! `RecognitionEngine`, paints ink as it is drawn and replays recognised
//! strokes. Also exposes the quiz session and the localStorage leaderboard
//! to JS.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Storage, window};

use crate::config::RecognizerConfig;
use crate::game::{AnswerOutcome, GameMode, GameSession};
use crate::leaderboard::{self, KeyValueStore, Leaderboard, LeaderboardEntry, LeaderboardError};
use crate::patterns::Script;
use crate::recognizer::{RecognitionEngine, RecognitionResult};
use crate::stroke::{Point, Stroke};

const INK_COLOR: &str = "#6366f1";
const INK_WIDTH: f64 = 5.0;
/// Delay between the start of consecutive strokes during replay.
pub const REPLAY_STAGGER_MS: f64 = 200.0;
/// Time to draw one stroke from first to last point during replay.
pub const REPLAY_STROKE_MS: f64 = 500.0;

type MouseListener = (&'static str, Closure<dyn FnMut(web_sys::MouseEvent)>);
type TouchListener = (&'static str, Closure<dyn FnMut(web_sys::TouchEvent)>);

struct DrawingState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    engine: RecognitionEngine,
    mouse_listeners: Vec<MouseListener>,
    touch_listeners: Vec<TouchListener>,
}

impl DrawingState {
    /// Unhook every listener this state installed on its canvas.
    fn detach(&self) {
        for (event, closure) in &self.mouse_listeners {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        for (event, closure) in &self.touch_listeners {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

/// One replay in progress. Each replay carries its own duration, so a newer
/// replay replacing an older one is never cut short by the older timing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayState {
    strokes: Vec<Stroke>,
    start_ms: Option<f64>,
    total_ms: f64,
}

/// What the frame loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayTick {
    /// Draw this many milliseconds of the replay and keep going.
    Draw(f64),
    /// Draw the final frame and stop.
    Finish(f64),
}

impl ReplayState {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        let total_ms = replay_duration(strokes.len());
        Self { strokes, start_ms: None, total_ms }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Advance to the frame timestamp `ts`. The first tick starts the clock.
    pub fn tick(&mut self, ts: f64) -> ReplayTick {
        let start = *self.start_ms.get_or_insert(ts);
        let elapsed = ts - start;
        if elapsed >= self.total_ms {
            ReplayTick::Finish(elapsed)
        } else {
            ReplayTick::Draw(elapsed)
        }
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

thread_local! {
    static DRAWING: RefCell<Option<DrawingState>> = const { RefCell::new(None) };
    static REPLAY: RefCell<Option<ReplayState>> = const { RefCell::new(None) };
    // Built once and reused by every replay.
    static REPLAY_LOOP: RefCell<Option<FrameCallback>> = const { RefCell::new(None) };
    static REPLAY_RUNNING: Cell<bool> = const { Cell::new(false) };
}

#[cfg(not(feature = "rng"))]
fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(feature = "rng")]
fn browser_engine() -> RecognitionEngine {
    RecognitionEngine::new(RecognizerConfig::default())
}

// Without browser crypto the jitter is seeded from the high resolution clock.
#[cfg(not(feature = "rng"))]
fn browser_engine() -> RecognitionEngine {
    let seed = (performance_now() * 1000.0) as u64;
    let jitter = crate::scoring::SeededJitter::seed_from_u64(seed);
    RecognitionEngine::with_heuristic(
        crate::recognizer::HeuristicRecognizer::new(RecognizerConfig::default()).with_jitter(Box::new(jitter)),
    )
}

fn browser_session(script: Script, mode: GameMode) -> GameSession {
    #[cfg(feature = "rng")]
    {
        GameSession::from_entropy(script, mode)
    }
    #[cfg(not(feature = "rng"))]
    {
        GameSession::with_seed(script, mode, (performance_now() * 1000.0) as u64)
    }
}

fn with_drawing<T>(f: impl FnOnce(&mut DrawingState) -> T) -> Option<T> {
    DRAWING.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Canvas pixel coordinates of a client-space position, accounting for CSS
/// scaling of the element.
fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Point {
    let rect = canvas.get_bounding_client_rect();
    let sx = if rect.width() > 0.0 { canvas.width() as f64 / rect.width() } else { 1.0 };
    let sy = if rect.height() > 0.0 { canvas.height() as f64 / rect.height() } else { 1.0 };
    Point::new((client_x - rect.left()) * sx, (client_y - rect.top()) * sy)
}

fn set_ink(ctx: &CanvasRenderingContext2d) {
    ctx.set_stroke_style_str(INK_COLOR);
    ctx.set_line_width(INK_WIDTH);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
}

fn pointer_down(state: &mut DrawingState, point: Point) {
    if state.engine.start_stroke(point).is_err() {
        return;
    }
    set_ink(&state.ctx);
    state.ctx.begin_path();
    state.ctx.move_to(point.x, point.y);
}

fn pointer_move(state: &mut DrawingState, point: Point) {
    let Some(prev) = state.engine.active_stroke().and_then(Stroke::last) else {
        return;
    };
    if state.engine.extend_stroke(point).is_err() {
        return;
    }
    state.ctx.begin_path();
    state.ctx.move_to(prev.x, prev.y);
    state.ctx.line_to(point.x, point.y);
    state.ctx.stroke();
}

fn pointer_up(state: &mut DrawingState) {
    if state.engine.is_drawing() {
        let _ = state.engine.end_stroke();
    }
}

fn listen_mouse(
    target: &HtmlCanvasElement,
    event: &'static str,
    handler: impl FnMut(web_sys::MouseEvent) + 'static,
) -> Result<MouseListener, JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::MouseEvent)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok((event, closure))
}

fn listen_touch(
    target: &HtmlCanvasElement,
    event: &'static str,
    handler: impl FnMut(web_sys::TouchEvent) + 'static,
) -> Result<TouchListener, JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::TouchEvent)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok((event, closure))
}

fn touch_point(canvas: &HtmlCanvasElement, evt: &web_sys::TouchEvent) -> Option<Point> {
    let touch = evt.touches().get(0)?;
    Some(canvas_point(canvas, touch.client_x() as f64, touch.client_y() as f64))
}

/// Attach stroke capture to the canvas with `canvas_id`. Replaces any
/// previously attached canvas and removes its listeners, so attaching the
/// same canvas twice still records each pointer event once.
#[wasm_bindgen]
pub fn attach_drawing_canvas(canvas_id: &str) -> Result<(), JsValue> {
    if let Some(previous) = DRAWING.with(|cell| cell.borrow_mut().take()) {
        previous.detach();
    }
    REPLAY.with(|cell| cell.borrow_mut().take());

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("drawing canvas not found"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    set_ink(&ctx);

    let mut engine = browser_engine();
    engine.set_canvas_size(canvas.width() as f64, canvas.height() as f64);

    let mut mouse_listeners = Vec::with_capacity(4);
    let mut touch_listeners = Vec::with_capacity(4);
    {
        let c = canvas.clone();
        mouse_listeners.push(listen_mouse(&canvas, "mousedown", move |evt: web_sys::MouseEvent| {
            let p = canvas_point(&c, evt.client_x() as f64, evt.client_y() as f64);
            with_drawing(|st| pointer_down(st, p));
        })?);
    }
    {
        let c = canvas.clone();
        mouse_listeners.push(listen_mouse(&canvas, "mousemove", move |evt: web_sys::MouseEvent| {
            let p = canvas_point(&c, evt.client_x() as f64, evt.client_y() as f64);
            with_drawing(|st| pointer_move(st, p));
        })?);
    }
    for name in ["mouseup", "mouseleave"] {
        mouse_listeners.push(listen_mouse(&canvas, name, move |_evt: web_sys::MouseEvent| {
            with_drawing(pointer_up);
        })?);
    }
    {
        let c = canvas.clone();
        touch_listeners.push(listen_touch(&canvas, "touchstart", move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            if let Some(p) = touch_point(&c, &evt) {
                with_drawing(|st| pointer_down(st, p));
            }
        })?);
    }
    {
        let c = canvas.clone();
        touch_listeners.push(listen_touch(&canvas, "touchmove", move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            if let Some(p) = touch_point(&c, &evt) {
                with_drawing(|st| pointer_move(st, p));
            }
        })?);
    }
    for name in ["touchend", "touchcancel"] {
        touch_listeners.push(listen_touch(&canvas, name, move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            with_drawing(pointer_up);
        })?);
    }

    DRAWING.with(|cell| {
        *cell.borrow_mut() = Some(DrawingState {
            canvas,
            ctx,
            engine,
            mouse_listeners,
            touch_listeners,
        });
    });
    Ok(())
}

/// Erase the canvas and forget every stroke of the current attempt.
#[wasm_bindgen]
pub fn clear_drawing() {
    REPLAY.with(|cell| cell.borrow_mut().take());
    with_drawing(|st| {
        st.engine.clear_strokes();
        st.ctx
            .clear_rect(0.0, 0.0, st.canvas.width() as f64, st.canvas.height() as f64);
    });
}

#[wasm_bindgen]
pub fn drawing_stroke_count() -> usize {
    with_drawing(|st| st.engine.stroke_count()).unwrap_or(0)
}

/// Score the current drawing against `expected`. Returns the result as JSON.
#[wasm_bindgen]
pub fn recognize_drawing(expected: &str) -> Result<String, JsValue> {
    let result = with_drawing(|st| {
        st.engine
            .set_canvas_size(st.canvas.width() as f64, st.canvas.height() as f64);
        st.engine.recognize_character(expected)
    })
    .ok_or_else(|| JsValue::from_str("no drawing canvas attached"))?;
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Number of points of each stroke visible `elapsed_ms` into a replay.
pub fn replay_frame(stroke_lens: &[usize], elapsed_ms: f64) -> Vec<usize> {
    stroke_lens
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            let local = elapsed_ms - i as f64 * REPLAY_STAGGER_MS;
            if local <= 0.0 || len == 0 {
                return 0;
            }
            let fraction = (local / REPLAY_STROKE_MS).min(1.0);
            ((fraction * len as f64).ceil() as usize).clamp(1, len)
        })
        .collect()
}

/// Total replay duration for `count` strokes.
pub fn replay_duration(count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (count - 1) as f64 * REPLAY_STAGGER_MS + REPLAY_STROKE_MS
}

fn draw_replay_frame(state: &DrawingState, strokes: &[Stroke], elapsed_ms: f64) {
    let lens: Vec<usize> = strokes.iter().map(Stroke::len).collect();
    let ctx = &state.ctx;
    ctx.clear_rect(0.0, 0.0, state.canvas.width() as f64, state.canvas.height() as f64);
    set_ink(ctx);
    for (stroke, visible) in strokes.iter().zip(replay_frame(&lens, elapsed_ms)) {
        let points = &stroke.points()[..visible];
        let Some(first) = points.first() else {
            continue;
        };
        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for p in &points[1..] {
            ctx.line_to(p.x, p.y);
        }
        ctx.stroke();
    }
}

fn replay_frame_loop(ts: f64) {
    let running = REPLAY.with(|cell| {
        let mut replay = cell.borrow_mut();
        let Some(rs) = replay.as_mut() else {
            return false;
        };
        let (elapsed, done) = match rs.tick(ts) {
            ReplayTick::Draw(elapsed) => (elapsed, false),
            ReplayTick::Finish(elapsed) => (elapsed, true),
        };
        with_drawing(|st| draw_replay_frame(st, rs.strokes(), elapsed));
        if done {
            *replay = None;
        }
        !done
    });
    if !running || request_replay_frame().is_err() {
        REPLAY_RUNNING.with(|r| r.set(false));
    }
}

fn request_replay_frame() -> Result<i32, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    REPLAY_LOOP.with(|cell| {
        let mut slot = cell.borrow_mut();
        let cb = slot.get_or_insert_with(|| {
            Closure::wrap(Box::new(replay_frame_loop) as Box<dyn FnMut(f64)>)
        });
        win.request_animation_frame(cb.as_ref().unchecked_ref())
    })
}

/// Redraw the strokes of a recognition result (JSON from
/// `recognize_drawing`) one after another. A replay started while another
/// is running takes over the running frame loop.
#[wasm_bindgen]
pub fn replay_strokes(result_json: &str) -> Result<(), JsValue> {
    let result: RecognitionResult =
        serde_json::from_str(result_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    REPLAY.with(|cell| {
        *cell.borrow_mut() = Some(ReplayState::new(result.animation_data.strokes));
    });

    if REPLAY_RUNNING.with(|r| r.replace(true)) {
        return Ok(());
    }
    if let Err(err) = request_replay_frame() {
        REPLAY_RUNNING.with(|r| r.set(false));
        return Err(err);
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Quiz session
// -----------------------------------------------------------------------------

fn outcome_str(outcome: AnswerOutcome) -> &'static str {
    match outcome {
        AnswerOutcome::Correct => "correct",
        AnswerOutcome::Incorrect => "incorrect",
        AnswerOutcome::DeckComplete { perfect: true } => "perfect",
        AnswerOutcome::DeckComplete { perfect: false } => "complete",
        AnswerOutcome::OutOfChances => "game-over",
        AnswerOutcome::Ignored => "ignored",
    }
}

/// JS handle on a `GameSession`. Timestamps come from `Date.now()`.
#[wasm_bindgen]
pub struct KanaGame {
    session: GameSession,
}

#[wasm_bindgen]
impl KanaGame {
    #[wasm_bindgen(constructor)]
    pub fn new(script: &str, mode: &str) -> Result<KanaGame, JsValue> {
        let script: Script = script.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        let mode: GameMode = mode.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(KanaGame { session: browser_session(script, mode) })
    }

    pub fn character(&self) -> Option<String> {
        self.session.current().map(|i| i.character.to_string())
    }

    pub fn romaji(&self) -> Option<String> {
        self.session.current().map(|i| i.romaji.to_string())
    }

    pub fn tip(&self) -> Option<String> {
        self.session.current().map(|i| i.tip.to_string())
    }

    pub fn answer_romaji(&mut self, answer: &str) -> String {
        outcome_str(self.session.answer_romaji(answer, js_sys::Date::now())).to_string()
    }

    pub fn answer_translation(&mut self, answer: &str) -> String {
        outcome_str(self.session.answer_translation(answer, js_sys::Date::now())).to_string()
    }

    pub fn answer_drawing(&mut self, probability: f64) -> String {
        outcome_str(self.session.answer_drawing(probability, js_sys::Date::now())).to_string()
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn total(&self) -> usize {
        self.session.total()
    }

    pub fn chances(&self) -> u32 {
        self.session.chances()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn is_perfect(&self) -> bool {
        self.session.is_perfect()
    }

    pub fn hint_available(&self) -> bool {
        self.session.hint_available()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.session.elapsed_seconds(js_sys::Date::now()) as u32
    }

    pub fn rank_message(&self) -> String {
        self.session.rank_message().to_string()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Submit the finished session to today's leaderboard. Returns the rank
    /// reached, if any.
    pub fn submit_score(&self, username: &str) -> Result<Option<u32>, JsValue> {
        let entry = self.session.leaderboard_entry(username, js_sys::Date::now());
        submit_entry(entry)
    }
}

// -----------------------------------------------------------------------------
// localStorage leaderboard
// -----------------------------------------------------------------------------

/// `KeyValueStore` over `window.localStorage`.
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, LeaderboardError> {
        let storage = window()
            .ok_or_else(|| LeaderboardError::Storage("no window".into()))?
            .local_storage()
            .map_err(js_storage_error)?
            .ok_or_else(|| LeaderboardError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

fn js_storage_error(err: JsValue) -> LeaderboardError {
    LeaderboardError::Storage(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        self.storage.get_item(key).map_err(js_storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        self.storage.set_item(key, value).map_err(js_storage_error)
    }
}

fn to_js(err: LeaderboardError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn today() -> String {
    String::from(js_sys::Date::new_0().to_date_string())
}

fn submit_entry(entry: LeaderboardEntry) -> Result<Option<u32>, JsValue> {
    let store = LocalStorageStore::open().map_err(to_js)?;
    let rank = Leaderboard::new(store).submit(entry, &today()).map_err(to_js)?;
    Ok(rank.map(|r| r as u32))
}

/// Today's leaderboard as a JSON array, best first.
#[wasm_bindgen]
pub fn leaderboard_json() -> Result<String, JsValue> {
    let store = LocalStorageStore::open().map_err(to_js)?;
    let entries = Leaderboard::new(store).entries(&today()).map_err(to_js)?;
    serde_json::to_string(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn welcome_seen() -> bool {
    LocalStorageStore::open()
        .and_then(|store| leaderboard::welcome_seen(&store))
        .unwrap_or(false)
}

#[wasm_bindgen]
pub fn mark_welcome_seen() -> Result<(), JsValue> {
    let mut store = LocalStorageStore::open().map_err(to_js)?;
    leaderboard::mark_welcome_seen(&mut store).map_err(to_js)
}

#[wasm_bindgen]
pub fn format_time(seconds: Option<u32>) -> String {
    leaderboard::format_time(seconds.map(u64::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_frame_staggers_strokes() {
        let lens = [10, 4, 1];
        assert_eq!(replay_frame(&lens, 0.0), vec![0, 0, 0]);
        assert_eq!(replay_frame(&lens, 250.0), vec![5, 1, 0]);
        assert_eq!(replay_frame(&lens, 2_000.0), vec![10, 4, 1]);
        assert!(replay_frame(&[], 100.0).is_empty());
        assert_eq!(replay_frame(&[0], 1_000.0), vec![0]);
    }

    fn strokes(n: usize) -> Vec<Stroke> {
        (0..n)
            .map(|i| Stroke::from(vec![(0.0, i as f64), (10.0, i as f64)]))
            .collect()
    }

    #[test]
    fn test_replacing_replay_keeps_its_own_duration() {
        let mut short = ReplayState::new(strokes(3));
        assert_eq!(short.tick(0.0), ReplayTick::Draw(0.0));
        assert_eq!(short.total_ms(), 900.0);

        // A longer replay takes over the slot mid-way through the short one.
        let mut long = ReplayState::new(strokes(8));
        assert_eq!(long.total_ms(), 1_900.0);
        assert_eq!(long.tick(100.0), ReplayTick::Draw(0.0));
        // Past the short replay's length, the long one keeps drawing.
        assert_eq!(long.tick(1_050.0), ReplayTick::Draw(950.0));
        assert_eq!(long.tick(2_000.0), ReplayTick::Finish(1_900.0));
        assert_eq!(long.strokes().len(), 8);
    }

    #[test]
    fn test_empty_replay_finishes_on_first_tick() {
        let mut empty = ReplayState::new(Vec::new());
        assert_eq!(empty.tick(42.0), ReplayTick::Finish(0.0));
    }

    #[test]
    fn test_replay_duration() {
        assert_eq!(replay_duration(0), 0.0);
        assert_eq!(replay_duration(1), REPLAY_STROKE_MS);
        assert_eq!(replay_duration(3), 2.0 * REPLAY_STAGGER_MS + REPLAY_STROKE_MS);
    }
}
