/// Pan/zoom gesture state machine
///
/// Turns a stream of touch samples for one interaction into a clamped
/// pan/zoom `Transform`, and classifies the release as a tap, a long press,
/// or nothing.
///
/// ```text
/// Idle ──1 finger──▶ TrackingTap ──move, scale > 1──▶ Panning
///   │                    │                              │
///   └──2 fingers──▶ Pinching ◀──── second finger ───────┘
/// any ──release──▶ Idle
/// ```
use cgmath::Vector2;
use iced::{Point, Size};
use std::time::{Duration, Instant};

pub const MIN_SCALE: f32 = 1.0;
pub const MAX_SCALE: f32 = 4.0;

/// A release faster than this may be a tap
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(300);
/// Displacement (per axis, in screen pixels) below which a release may be a tap
pub const TAP_MAX_DISTANCE: f32 = 10.0;
/// A stationary release held at least this long is a long press
pub const LONG_PRESS_MIN_DURATION: Duration = Duration::from_millis(500);

/// Current zoom and pan of the diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Zoom factor in `[MIN_SCALE, MAX_SCALE]`
    pub scale: f32,
    /// Pan offset in screen pixels
    pub translate: Vector2<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate: Vector2 { x: 0.0, y: 0.0 },
    };

    /// Largest allowed `|translate|` per axis for an image of `size`
    pub fn pan_limit(scale: f32, size: Size) -> Vector2<f32> {
        Vector2::new(
            size.width * (scale - 1.0) / 2.0,
            size.height * (scale - 1.0) / 2.0,
        )
    }

    /// Set the pan offset, clamped so the scaled image never exposes margin
    pub fn set_translate(&mut self, translate: Vector2<f32>, size: Size) {
        let limit = Self::pan_limit(self.scale, size);
        self.translate = Vector2::new(
            translate.x.clamp(-limit.x, limit.x),
            translate.y.clamp(-limit.y, limit.y),
        );
    }

    /// Multiply the scale by `ratio`, clamp it, then re-clamp the pan offset
    pub fn zoom_by(&mut self, ratio: f32, size: Size) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        self.scale = (self.scale * ratio).clamp(MIN_SCALE, MAX_SCALE);
        let translate = self.translate;
        self.set_translate(translate, size);
    }
}

/// Where the engine is within the current interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    TrackingTap {
        started_at: Instant,
        origin: Point,
        pan_origin: Vector2<f32>,
    },
    Panning {
        started_at: Instant,
        origin: Point,
        pan_origin: Vector2<f32>,
    },
    Pinching {
        last_distance: Option<f32>,
    },
}

/// Outcome of a release
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Quick, stationary single-finger release at this screen point
    Tap(Point),
    /// Stationary single-finger release held for a long time
    LongPress(Point),
    /// Pan, pinch, or a release that qualified as neither
    None,
}

#[derive(Debug, Clone)]
pub struct GestureEngine {
    transform: Transform,
    phase: Phase,
    /// Unscaled image size used for pan clamping
    image_size: Size,
}

impl GestureEngine {
    pub fn new(image_size: Size) -> Self {
        Self {
            transform: Transform::IDENTITY,
            phase: Phase::Idle,
            image_size,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Back to identity and idle
    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
        self.phase = Phase::Idle;
    }

    /// A finger went down; `touches` are all fingers currently down
    pub fn touch_down(&mut self, touches: &[Point], at: Instant) {
        match (self.phase, touches) {
            (_, [a, b, ..]) => {
                self.phase = Phase::Pinching {
                    last_distance: Some(a.distance(*b)),
                };
            }
            (Phase::Idle, [p]) => {
                self.phase = Phase::TrackingTap {
                    started_at: at,
                    origin: *p,
                    pan_origin: self.transform.translate,
                };
            }
            _ => {}
        }
    }

    /// Fingers moved; `touches` are all fingers currently down
    pub fn touch_move(&mut self, touches: &[Point], at: Instant) {
        match (self.phase, touches) {
            (Phase::Pinching { last_distance }, [a, b, ..]) => {
                let distance = a.distance(*b);
                if let Some(previous) = last_distance {
                    if previous > 0.0 {
                        self.transform.zoom_by(distance / previous, self.image_size);
                    }
                }
                self.phase = Phase::Pinching {
                    last_distance: Some(distance),
                };
            }
            // A finger was lifted mid-pinch: wait for it to come back
            (Phase::Pinching { .. }, _) => {
                self.phase = Phase::Pinching { last_distance: None };
            }
            (_, [_, _, ..]) => self.touch_down(touches, at),
            (
                Phase::TrackingTap { started_at, origin, pan_origin }
                | Phase::Panning { started_at, origin, pan_origin },
                [p],
            ) if self.transform.scale > MIN_SCALE => {
                let delta = Vector2::new(p.x - origin.x, p.y - origin.y);
                self.transform.set_translate(pan_origin + delta, self.image_size);
                self.phase = Phase::Panning {
                    started_at,
                    origin,
                    pan_origin,
                };
            }
            _ => {}
        }
    }

    /// The last finger was lifted at `position`
    pub fn touch_up(&mut self, position: Point, at: Instant) -> Release {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);

        let (started_at, origin) = match phase {
            Phase::TrackingTap { started_at, origin, .. }
            | Phase::Panning { started_at, origin, .. } => (started_at, origin),
            Phase::Pinching { .. } | Phase::Idle => return Release::None,
        };

        let elapsed = at.saturating_duration_since(started_at);
        let (dx, dy) = (position.x - origin.x, position.y - origin.y);

        if qualifies_as_tap(elapsed, dx, dy) {
            Release::Tap(position)
        } else if qualifies_as_tap(Duration::ZERO, dx, dy) && elapsed >= LONG_PRESS_MIN_DURATION {
            Release::LongPress(position)
        } else {
            Release::None
        }
    }

    /// Abandon the interaction without classifying it (finger lost, focus lost)
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Zoom by a ratio outside of a pinch (mouse wheel)
    pub fn wheel(&mut self, ratio: f32) {
        self.transform.zoom_by(ratio, self.image_size);
    }
}

/// Tap qualification on its own, for callers that track time themselves
pub fn qualifies_as_tap(elapsed: Duration, dx: f32, dy: f32) -> bool {
    elapsed < TAP_MAX_DURATION && dx.abs() < TAP_MAX_DISTANCE && dy.abs() < TAP_MAX_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Size = Size {
        width: 340.0,
        height: 440.0,
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn pinch_to(engine: &mut GestureEngine, t0: Instant, from: f32, to: f32) {
        engine.touch_down(&[Point::new(100.0, 100.0), Point::new(100.0 + from, 100.0)], t0);
        engine.touch_move(&[Point::new(100.0, 100.0), Point::new(100.0 + to, 100.0)], t0 + ms(10));
        engine.touch_up(Point::new(100.0, 100.0), t0 + ms(20));
    }

    #[test]
    fn test_tap_thresholds() {
        assert!(qualifies_as_tap(ms(299), 9.0, 9.0));
        assert!(qualifies_as_tap(ms(299), -9.0, -9.0));
        assert!(!qualifies_as_tap(ms(301), 0.0, 0.0));
        assert!(!qualifies_as_tap(ms(100), 11.0, 0.0));
        assert!(!qualifies_as_tap(ms(100), 0.0, 11.0));
    }

    #[test]
    fn test_quick_release_is_tap() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        let start = Point::new(50.0, 50.0);
        let end = Point::new(59.0, 59.0);

        engine.touch_down(&[start], t0);
        engine.touch_move(&[end], t0 + ms(100));

        assert_eq!(engine.touch_up(end, t0 + ms(299)), Release::Tap(end));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_slow_or_moving_release_is_not_tap() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        let start = Point::new(50.0, 50.0);

        engine.touch_down(&[start], t0);
        assert_eq!(engine.touch_up(start, t0 + ms(301)), Release::None);

        let moved = Point::new(61.0, 50.0);
        engine.touch_down(&[start], t0);
        engine.touch_move(&[moved], t0 + ms(50));
        assert_eq!(engine.touch_up(moved, t0 + ms(100)), Release::None);
    }

    #[test]
    fn test_long_press() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        let p = Point::new(80.0, 80.0);

        engine.touch_down(&[p], t0);
        assert_eq!(engine.touch_up(p, t0 + ms(600)), Release::LongPress(p));
    }

    #[test]
    fn test_pan_ignored_at_unit_scale() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();

        engine.touch_down(&[Point::new(0.0, 0.0)], t0);
        engine.touch_move(&[Point::new(50.0, 50.0)], t0 + ms(10));

        assert_eq!(engine.transform().translate, Vector2::new(0.0, 0.0));
        assert!(matches!(engine.phase(), Phase::TrackingTap { .. }));
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        engine.wheel(2.0);

        engine.touch_down(&[Point::new(0.0, 0.0)], t0);
        engine.touch_move(&[Point::new(1000.0, -1000.0)], t0 + ms(10));

        assert!(matches!(engine.phase(), Phase::Panning { .. }));
        let limit = Transform::pan_limit(2.0, IMAGE);
        assert_eq!(engine.transform().translate, Vector2::new(limit.x, -limit.y));
        assert_eq!(limit, Vector2::new(170.0, 220.0));
    }

    #[test]
    fn test_pan_accumulates_from_snapshot() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        engine.wheel(3.0);

        engine.touch_down(&[Point::new(0.0, 0.0)], t0);
        engine.touch_move(&[Point::new(30.0, 20.0)], t0 + ms(10));
        engine.touch_up(Point::new(30.0, 20.0), t0 + ms(400));

        engine.touch_down(&[Point::new(10.0, 10.0)], t0 + ms(500));
        engine.touch_move(&[Point::new(20.0, 0.0)], t0 + ms(510));

        assert_eq!(engine.transform().translate, Vector2::new(40.0, 10.0));
    }

    #[test]
    fn test_pan_bounds_hold_for_any_sequence() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        let deltas = [(400.0, 10.0), (-900.0, 300.0), (20.0, -800.0), (5.0, 5.0)];

        for (i, scale_ratio) in [1.5_f32, 2.0, 0.5, 4.0].iter().enumerate() {
            engine.wheel(*scale_ratio);
            let (dx, dy) = deltas[i];
            engine.touch_down(&[Point::new(0.0, 0.0)], t0);
            engine.touch_move(&[Point::new(dx, dy)], t0 + ms(5));
            engine.touch_up(Point::new(dx, dy), t0 + ms(10));

            let t = engine.transform();
            let limit = Transform::pan_limit(t.scale, IMAGE);
            assert!(t.translate.x.abs() <= limit.x);
            assert!(t.translate.y.abs() <= limit.y);
        }
    }

    #[test]
    fn test_pinch_half_distance_at_scale_two_clamps_to_one() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        engine.wheel(2.0);
        assert_eq!(engine.transform().scale, 2.0);

        pinch_to(&mut engine, t0, 100.0, 50.0);

        assert_eq!(engine.transform().scale, 1.0);
        assert_eq!(engine.transform().translate, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn test_scale_stays_in_range() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();

        for (from, to) in [(50.0, 200.0), (50.0, 200.0), (100.0, 10.0), (10.0, 300.0)] {
            pinch_to(&mut engine, t0, from, to);
            let scale = engine.transform().scale;
            assert!((MIN_SCALE..=MAX_SCALE).contains(&scale), "scale {}", scale);
        }
        assert_eq!(engine.transform().scale, MAX_SCALE);
    }

    #[test]
    fn test_pinch_release_is_never_a_tap() {
        let mut engine = GestureEngine::new(IMAGE);
        let t0 = Instant::now();
        let p = Point::new(10.0, 10.0);

        engine.touch_down(&[p], t0);
        engine.touch_move(&[p, Point::new(60.0, 10.0)], t0 + ms(10));
        assert!(matches!(engine.phase(), Phase::Pinching { .. }));
        // Second finger lifted, first stays put
        engine.touch_move(&[p], t0 + ms(20));

        assert_eq!(engine.touch_up(p, t0 + ms(50)), Release::None);
    }

    #[test]
    fn test_reset() {
        let mut engine = GestureEngine::new(IMAGE);
        engine.wheel(3.0);
        engine.touch_down(&[Point::new(0.0, 0.0)], Instant::now());
        engine.touch_move(&[Point::new(40.0, 0.0)], Instant::now());
        assert_eq!(engine.transform().translate.x, 40.0);

        engine.reset();

        assert_eq!(engine.transform(), Transform::IDENTITY);
        assert_eq!(engine.phase(), Phase::Idle);
    }
}
