//! Per-stroke geometry: direction, 3x3 position bucket, length class, curvature.
//!
//! All extraction is pure given `(stroke, canvas size, config)` and total over
//! degenerate input: empty and one-point strokes map to sentinel values
//! (`Direction::Point`, `Position::Center`, `LengthClass::Short`, not curved).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{LengthBase, RecognizerConfig};
use crate::stroke::{Point, Stroke};

/// Drawing surface dimensions used for normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self { width: 280.0, height: 280.0 }
    }
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    pub fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// Coarse stroke direction class.
///
/// `DiagonalRight` is the `＼` orientation (dx and dy share a sign),
/// `DiagonalLeft` is `／`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalRight,
    DiagonalLeft,
    Curve,
    Hook,
    /// Too short to have a direction.
    Point,
}

/// Three-way view of `Direction` for callers that do not care about the
/// diagonal orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoarseDirection {
    Horizontal,
    Vertical,
    Diagonal,
    Curve,
    Hook,
    Point,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
            Direction::DiagonalRight => "diagonal-right",
            Direction::DiagonalLeft => "diagonal-left",
            Direction::Curve => "curve",
            Direction::Hook => "hook",
            Direction::Point => "point",
        }
    }

    pub fn coarse(self) -> CoarseDirection {
        match self {
            Direction::Horizontal => CoarseDirection::Horizontal,
            Direction::Vertical => CoarseDirection::Vertical,
            Direction::DiagonalRight | Direction::DiagonalLeft => CoarseDirection::Diagonal,
            Direction::Curve => CoarseDirection::Curve,
            Direction::Hook => CoarseDirection::Hook,
            Direction::Point => CoarseDirection::Point,
        }
    }

    /// Mismatches that still earn partial credit: a sloppy curve is easily
    /// drawn as a straight horizontal or diagonal line and vice versa.
    pub fn is_related(self, other: Direction) -> bool {
        use CoarseDirection::*;
        matches!(
            (self.coarse(), other.coarse()),
            (Horizontal, Curve) | (Curve, Horizontal) | (Diagonal, Curve) | (Curve, Diagonal)
        )
    }
}

/// 3x3 canvas region of a stroke's centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Position {
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::Top,
        Position::TopRight,
        Position::Left,
        Position::Center,
        Position::Right,
        Position::BottomLeft,
        Position::Bottom,
        Position::BottomRight,
    ];

    /// Bucket a point already normalised to canvas-relative `[0, 1]`.
    pub fn from_relative(rx: f64, ry: f64) -> Self {
        // 0 = left/top, 1 = center/middle, 2 = right/bottom
        let col = third(rx);
        let row = third(ry);
        match (row, col) {
            (0, 0) => Position::TopLeft,
            (0, 1) => Position::Top,
            (0, _) => Position::TopRight,
            (1, 0) => Position::Left,
            (1, 1) => Position::Center,
            (1, _) => Position::Right,
            (_, 0) => Position::BottomLeft,
            (_, 1) => Position::Bottom,
            _ => Position::BottomRight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::Top => "top",
            Position::TopRight => "top-right",
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
            Position::BottomLeft => "bottom-left",
            Position::Bottom => "bottom",
            Position::BottomRight => "bottom-right",
        }
    }

    /// True when one label is a corner refinement of the other single-axis
    /// label (`top` ~ `top-left`), or both are equal.
    pub fn is_close(self, other: Position) -> bool {
        use Position::*;
        if self == other {
            return true;
        }
        let close = |a: Position, b: Position| {
            matches!(
                (a, b),
                (Top, TopLeft)
                    | (Top, TopRight)
                    | (Bottom, BottomLeft)
                    | (Bottom, BottomRight)
                    | (Left, TopLeft)
                    | (Left, BottomLeft)
                    | (Right, TopRight)
                    | (Right, BottomRight)
            )
        };
        close(self, other) || close(other, self)
    }
}

fn third(v: f64) -> u8 {
    if v.is_nan() {
        1
    } else if v < 1.0 / 3.0 {
        0
    } else if v > 2.0 / 3.0 {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LengthClass {
    Short,
    Medium,
    Long,
}

impl LengthClass {
    pub fn as_str(self) -> &'static str {
        match self {
            LengthClass::Short => "short",
            LengthClass::Medium => "medium",
            LengthClass::Long => "long",
        }
    }
}

/// Feature tuple of one drawn stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeFeatures {
    pub direction: Direction,
    pub position: Position,
    pub length: LengthClass,
    pub curved: bool,
}

/// Derives `StrokeFeatures` for strokes drawn on one canvas.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'a> {
    canvas: CanvasSize,
    config: &'a RecognizerConfig,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(canvas: CanvasSize, config: &'a RecognizerConfig) -> Self {
        Self { canvas, config }
    }

    pub fn extract(&self, stroke: &Stroke) -> StrokeFeatures {
        let features = StrokeFeatures {
            direction: self.direction(stroke),
            position: self.position(stroke),
            length: self.length(stroke),
            curved: self.curved(stroke),
        };
        tracing::debug!(
            points = stroke.len(),
            direction = features.direction.as_str(),
            position = features.position.as_str(),
            length = features.length.as_str(),
            "stroke features"
        );
        features
    }

    pub fn direction(&self, stroke: &Stroke) -> Direction {
        let (Some(start), Some(end)) = (stroke.first(), stroke.last()) else {
            return Direction::Point;
        };
        if stroke.len() < 2 || self.is_dot(stroke) {
            return Direction::Point;
        }
        if self.curved(stroke) {
            return Direction::Curve;
        }
        if self.hooked(stroke) {
            return Direction::Hook;
        }

        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let ratio = self.config.direction_dominance;
        if dx.abs() > dy.abs() * ratio {
            Direction::Horizontal
        } else if dy.abs() > dx.abs() * ratio {
            Direction::Vertical
        } else if dx * dy < 0.0 {
            Direction::DiagonalLeft
        } else {
            Direction::DiagonalRight
        }
    }

    /// Centroid of all samples, bucketed into thirds of the canvas.
    pub fn position(&self, stroke: &Stroke) -> Position {
        if stroke.is_empty() {
            return Position::Center;
        }
        let n = stroke.len() as f64;
        let (sx, sy) = stroke
            .points()
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let rx = relative(sx / n, self.canvas.width);
        let ry = relative(sy / n, self.canvas.height);
        Position::from_relative(rx, ry)
    }

    pub fn length(&self, stroke: &Stroke) -> LengthClass {
        let base = match self.config.length_base {
            LengthBase::Diagonal => self.canvas.diagonal(),
            LengthBase::LongestSide => self.canvas.longest_side(),
        };
        if stroke.len() < 2 || base <= 0.0 {
            return LengthClass::Short;
        }
        let rel = stroke.path_length() / base;
        if rel < self.config.short_length {
            LengthClass::Short
        } else if rel < self.config.medium_length {
            LengthClass::Medium
        } else {
            LengthClass::Long
        }
    }

    /// Counts bends on an arc-length resampled copy of the stroke so that
    /// sampling density and pointer jitter do not decide the outcome.
    pub fn curved(&self, stroke: &Stroke) -> bool {
        if stroke.len() < 3 || self.is_dot(stroke) {
            return false;
        }
        let samples = resample(stroke.points(), self.config.curve_segments);
        let threshold = self.config.curve_turn_threshold;
        let turns = samples
            .windows(3)
            .map(|w| turn_angle(w[0], w[1], w[2]))
            .filter(|&a| a > threshold && a < PI - threshold)
            .count();
        turns >= self.config.curve_min_turns
    }

    /// A final flick that doubles back against the body of the stroke.
    fn hooked(&self, stroke: &Stroke) -> bool {
        if stroke.len() < 3 {
            return false;
        }
        let samples = resample(stroke.points(), 8);
        if samples.len() < 9 {
            return false;
        }
        turn_angle(samples[0], samples[7], samples[8]) > self.config.hook_turn_threshold
    }

    fn is_dot(&self, stroke: &Stroke) -> bool {
        stroke.path_length() < self.canvas.diagonal() * self.config.min_stroke_length
    }
}

fn relative(v: f64, extent: f64) -> f64 {
    if extent > 0.0 { v / extent } else { 0.5 }
}

/// Absolute change of heading at `b` going `a -> b -> c`, in `[0, PI]`.
fn turn_angle(a: Point, b: Point, c: Point) -> f64 {
    let (ux, uy) = (b.x - a.x, b.y - a.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    let cross = ux * vy - uy * vx;
    let dot = ux * vx + uy * vy;
    cross.atan2(dot).abs()
}

/// Resample a polyline into `segments` pieces of equal arc length.
///
/// Returns `segments + 1` points, or an empty vector when the path has no
/// length to distribute.
fn resample(points: &[Point], segments: usize) -> Vec<Point> {
    if points.len() < 2 || segments == 0 {
        return Vec::new();
    }
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total < 1e-9 {
        return Vec::new();
    }

    let interval = total / segments as f64;
    let mut out = Vec::with_capacity(segments + 1);
    out.push(points[0]);
    let mut walked = 0.0;
    let mut j = 1;
    for k in 1..segments {
        let target = interval * k as f64;
        while j < points.len() {
            let seg = points[j - 1].distance(points[j]);
            if walked + seg >= target && seg > 0.0 {
                let t = (target - walked) / seg;
                let (a, b) = (points[j - 1], points[j]);
                out.push(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)));
                break;
            }
            walked += seg;
            j += 1;
        }
    }
    if let Some(&last) = points.last() {
        out.push(last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(from: (f64, f64), to: (f64, f64), n: usize) -> Stroke {
        let pts = (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
            })
            .collect::<Vec<_>>();
        Stroke::from(pts)
    }

    fn arc(cx: f64, cy: f64, r: f64, from: f64, to: f64, n: usize) -> Stroke {
        let pts = (0..=n)
            .map(|i| {
                let a = from + (to - from) * i as f64 / n as f64;
                (cx + r * a.cos(), cy + r * a.sin())
            })
            .collect::<Vec<_>>();
        Stroke::from(pts)
    }

    fn with<R>(f: impl FnOnce(&FeatureExtractor) -> R) -> R {
        let config = RecognizerConfig::default();
        let fx = FeatureExtractor::new(CanvasSize::new(300.0, 300.0), &config);
        f(&fx)
    }

    #[test]
    fn test_degenerate_strokes_have_point_direction() {
        with(|fx| {
            assert_eq!(fx.direction(&Stroke::new()), Direction::Point);
            assert_eq!(fx.direction(&Stroke::from(vec![(5.0, 5.0)])), Direction::Point);
            // Two samples a pixel apart fall under the minimum-length guard.
            assert_eq!(
                fx.direction(&Stroke::from(vec![(5.0, 5.0), (6.0, 5.0)])),
                Direction::Point
            );
            assert_eq!(fx.position(&Stroke::new()), Position::Center);
            assert_eq!(fx.length(&Stroke::new()), LengthClass::Short);
            assert!(!fx.curved(&Stroke::new()));
        });
    }

    #[test]
    fn test_straight_directions() {
        with(|fx| {
            assert_eq!(fx.direction(&line((20.0, 50.0), (200.0, 60.0), 12)), Direction::Horizontal);
            assert_eq!(fx.direction(&line((100.0, 20.0), (110.0, 250.0), 12)), Direction::Vertical);
            assert_eq!(
                fx.direction(&line((20.0, 20.0), (200.0, 200.0), 12)),
                Direction::DiagonalRight
            );
            assert_eq!(
                fx.direction(&line((200.0, 20.0), (20.0, 200.0), 12)),
                Direction::DiagonalLeft
            );
            // Drawn upward-right is still the `／` orientation.
            assert_eq!(
                fx.direction(&line((20.0, 200.0), (200.0, 20.0), 12)),
                Direction::DiagonalLeft
            );
        });
    }

    #[test]
    fn test_jittery_straight_line_is_not_curved() {
        let pts: Vec<(f64, f64)> = (0..60)
            .map(|i| (20.0 + i as f64 * 4.0, 100.0 + if i % 2 == 0 { 1.5 } else { -1.5 }))
            .collect();
        with(|fx| {
            let s = Stroke::from(pts);
            assert!(!fx.curved(&s));
            assert_eq!(fx.direction(&s), Direction::Horizontal);
        });
    }

    #[test]
    fn test_loop_is_curve() {
        with(|fx| {
            let s = arc(150.0, 150.0, 80.0, 0.0, 2.0 * PI * 0.9, 40);
            assert!(fx.curved(&s));
            assert_eq!(fx.direction(&s), Direction::Curve);
        });
    }

    #[test]
    fn test_hook_detected() {
        // Long vertical body with a sharp upward-left flick at the end.
        let s = Stroke::from(vec![
            (150.0, 20.0),
            (150.0, 80.0),
            (150.0, 140.0),
            (150.0, 200.0),
            (150.0, 250.0),
            (130.0, 230.0),
        ]);
        with(|fx| {
            assert!(!fx.curved(&s));
            assert_eq!(fx.direction(&s), Direction::Hook);
        });
    }

    #[test]
    fn test_position_buckets_are_total() {
        with(|fx| {
            let mut seen = std::collections::HashSet::new();
            for x in (0..=300).step_by(10) {
                for y in (0..=300).step_by(10) {
                    let p = fx.position(&Stroke::from(vec![(x as f64, y as f64)]));
                    assert!(Position::ALL.contains(&p));
                    seen.insert(p);
                }
            }
            assert_eq!(seen.len(), 9);
        });
    }

    #[test]
    fn test_position_labels() {
        with(|fx| {
            assert_eq!(fx.position(&line((20.0, 30.0), (280.0, 30.0), 4)), Position::Top);
            assert_eq!(fx.position(&Stroke::from(vec![(20.0, 20.0)])), Position::TopLeft);
            assert_eq!(fx.position(&Stroke::from(vec![(150.0, 150.0)])), Position::Center);
            assert_eq!(fx.position(&Stroke::from(vec![(280.0, 150.0)])), Position::Right);
            assert_eq!(fx.position(&Stroke::from(vec![(280.0, 280.0)])), Position::BottomRight);
        });
    }

    #[test]
    fn test_zero_sized_canvas_does_not_panic() {
        let config = RecognizerConfig::default();
        let fx = FeatureExtractor::new(CanvasSize::new(0.0, 0.0), &config);
        let s = line((0.0, 0.0), (10.0, 0.0), 3);
        assert_eq!(fx.position(&s), Position::Center);
        assert_eq!(fx.length(&s), LengthClass::Short);
    }

    #[test]
    fn test_length_classes() {
        // Diagonal of 300x300 is ~424.
        with(|fx| {
            assert_eq!(fx.length(&line((0.0, 0.0), (60.0, 0.0), 3)), LengthClass::Short);
            assert_eq!(fx.length(&line((0.0, 0.0), (150.0, 0.0), 3)), LengthClass::Medium);
            assert_eq!(fx.length(&line((0.0, 0.0), (250.0, 0.0), 3)), LengthClass::Long);
        });
    }

    #[test]
    fn test_longest_side_base() {
        let config = RecognizerConfig {
            length_base: LengthBase::LongestSide,
            ..RecognizerConfig::default()
        };
        let fx = FeatureExtractor::new(CanvasSize::new(300.0, 300.0), &config);
        // 160 / 300 > 0.5, but 160 / 424 < 0.5.
        assert_eq!(fx.length(&line((0.0, 0.0), (160.0, 0.0), 3)), LengthClass::Long);
    }

    #[test]
    fn test_related_directions() {
        assert!(Direction::Horizontal.is_related(Direction::Curve));
        assert!(Direction::Curve.is_related(Direction::DiagonalLeft));
        assert!(!Direction::Vertical.is_related(Direction::Curve));
        assert!(!Direction::Horizontal.is_related(Direction::DiagonalRight));
    }

    #[test]
    fn test_close_positions() {
        assert!(Position::Top.is_close(Position::TopLeft));
        assert!(Position::BottomRight.is_close(Position::Right));
        assert!(!Position::Top.is_close(Position::Bottom));
        assert!(!Position::Center.is_close(Position::Top));
    }

    #[test]
    fn test_resample_equal_spacing() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let r = resample(&pts, 4);
        assert_eq!(r.len(), 5);
        assert!((r[1].x - 5.0).abs() < 1e-9);
        assert!((r[2].x - 10.0).abs() < 1e-9 && r[2].y.abs() < 1e-9);
        assert!((r[3].y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Direction::DiagonalRight).unwrap(),
            "\"diagonal-right\""
        );
        assert_eq!(serde_json::to_string(&Position::BottomLeft).unwrap(), "\"bottom-left\"");
    }
}
