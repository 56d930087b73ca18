//! Stroke capture: turns pointer-down / move / up into sealed strokes.
//!
//! A `StrokeCapture` owns exactly one in-progress gesture at a time plus the
//! `StrokeSession` of everything sealed so far for the current character
//! attempt. Multi-touch is not modelled: a second `start` while a gesture is
//! active is rejected rather than interleaved.

use serde::{Deserialize, Serialize};

/// Error type for stroke capture misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("No stroke in progress - call start_stroke() first")]
    NotStarted,
    #[error("Stroke already in progress - call end_stroke() first")]
    AlreadyStarted,
}

/// A single sampled coordinate in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One continuous pointer-down-to-pointer-up gesture.
///
/// Serializes as a bare array of points so the replay payload matches what
/// the canvas renderer already draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Sum of the distances between consecutive points.
    pub fn path_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

impl From<Vec<(f64, f64)>> for Stroke {
    fn from(raw: Vec<(f64, f64)>) -> Self {
        Self::from_points(raw.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }
}

/// Ordered strokes of the current character attempt, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeSession {
    strokes: Vec<Stroke>,
}

impl StrokeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Seal a finished stroke into the session.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }
}

impl From<Vec<Stroke>> for StrokeSession {
    fn from(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }
}

/// Gesture state machine feeding a `StrokeSession`.
#[derive(Debug, Default)]
pub struct StrokeCapture {
    active: Option<Stroke>,
    session: StrokeSession,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new stroke seeded with `point`.
    pub fn start_stroke(&mut self, point: Point) -> Result<(), CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let mut stroke = Stroke::new();
        stroke.push(point);
        self.active = Some(stroke);
        Ok(())
    }

    /// Append a sample to the in-progress stroke.
    pub fn extend_stroke(&mut self, point: Point) -> Result<(), CaptureError> {
        let stroke = self.active.as_mut().ok_or(CaptureError::NotStarted)?;
        stroke.push(point);
        Ok(())
    }

    /// Seal the in-progress stroke into the session and return its index.
    ///
    /// One-point strokes are sealed as-is; feature extraction maps them to
    /// the `point` sentinel.
    pub fn end_stroke(&mut self) -> Result<usize, CaptureError> {
        let stroke = self.active.take().ok_or(CaptureError::NotStarted)?;
        tracing::debug!(points = stroke.len(), "stroke sealed");
        self.session.push(stroke);
        Ok(self.session.len() - 1)
    }

    /// Drop any in-progress gesture without sealing it.
    pub fn cancel_stroke(&mut self) {
        self.active = None;
    }

    /// Empty the session and any in-progress gesture. Idempotent.
    pub fn clear_session(&mut self) {
        self.active = None;
        self.session.clear();
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    pub fn session(&self) -> &StrokeSession {
        &self.session
    }

    /// Seal an externally captured stroke directly.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.session.push(stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_lifecycle() {
        let mut cap = StrokeCapture::new();
        assert!(!cap.is_drawing());
        cap.start_stroke(Point::new(1.0, 2.0)).unwrap();
        assert!(cap.is_drawing());
        cap.extend_stroke(Point::new(3.0, 4.0)).unwrap();
        cap.extend_stroke(Point::new(5.0, 6.0)).unwrap();
        assert_eq!(cap.end_stroke().unwrap(), 0);
        assert!(!cap.is_drawing());
        assert_eq!(cap.session().len(), 1);
        assert_eq!(cap.session().strokes()[0].len(), 3);
    }

    #[test]
    fn test_extend_without_start_is_rejected() {
        let mut cap = StrokeCapture::new();
        assert_eq!(
            cap.extend_stroke(Point::new(0.0, 0.0)),
            Err(CaptureError::NotStarted)
        );
        assert_eq!(cap.end_stroke(), Err(CaptureError::NotStarted));
        assert!(cap.session().is_empty());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut cap = StrokeCapture::new();
        cap.start_stroke(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(
            cap.start_stroke(Point::new(1.0, 1.0)),
            Err(CaptureError::AlreadyStarted)
        );
        // The original gesture is untouched.
        assert_eq!(cap.active_stroke().map(Stroke::len), Some(1));
    }

    #[test]
    fn test_single_point_stroke_is_sealed() {
        let mut cap = StrokeCapture::new();
        cap.start_stroke(Point::new(10.0, 10.0)).unwrap();
        cap.end_stroke().unwrap();
        assert_eq!(cap.session().strokes()[0].len(), 1);
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let mut cap = StrokeCapture::new();
        cap.start_stroke(Point::new(0.0, 0.0)).unwrap();
        cap.end_stroke().unwrap();
        cap.start_stroke(Point::new(0.0, 0.0)).unwrap();
        cap.clear_session();
        assert!(cap.session().is_empty());
        assert!(!cap.is_drawing());
        cap.clear_session();
        assert!(cap.session().is_empty());
    }

    #[test]
    fn test_path_length() {
        let s = Stroke::from(vec![(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
        assert!((s.path_length() - 11.0).abs() < 1e-9);
        assert_eq!(Stroke::new().path_length(), 0.0);
    }

    #[test]
    fn test_stroke_serializes_as_point_array() {
        let s = Stroke::from(vec![(1.0, 2.0)]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0}]"#);
    }
}
