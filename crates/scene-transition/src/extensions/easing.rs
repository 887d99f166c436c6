// extensions/easing.rs
//
// Easing curves for transition interpolation.
// No dependencies on targets or scheduling. Just math.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::api::error::TransitionError;

/// A resolved easing curve, `[0, 1] -> [0, 1]` for well-behaved presets.
pub type EasingFn = Rc<dyn Fn(f64) -> f64>;

/// Named easing presets.
///
/// Everything except `Linear` is a cubic bezier with the standard
/// easings.net control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    /// Sine wave easing (smooth).
    SineIn,
    SineOut,
    SineInOut,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    /// Exponential easing (dramatic).
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    /// Overshoot then settle.
    BackIn,
    BackOut,
    BackInOut,
}

impl Easing {
    pub const ALL: [Easing; 25] = [
        Easing::Linear,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
    ];

    /// Registry name, as written in transition configs.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::SineIn => "easeInSine",
            Easing::SineOut => "easeOutSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::QuintIn => "easeInQuint",
            Easing::QuintOut => "easeOutQuint",
            Easing::QuintInOut => "easeInOutQuint",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::CircIn => "easeInCirc",
            Easing::CircOut => "easeOutCirc",
            Easing::CircInOut => "easeInOutCirc",
            Easing::BackIn => "easeInBack",
            Easing::BackOut => "easeOutBack",
            Easing::BackInOut => "easeInOutBack",
        }
    }

    /// Look up a preset by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }

    /// Bezier control points `[x1, y1, x2, y2]`, or `None` for `Linear`.
    pub fn control_points(self) -> Option<[f64; 4]> {
        let points = match self {
            Easing::Linear => return None,
            Easing::SineIn => [0.12, 0.0, 0.39, 0.0],
            Easing::SineOut => [0.61, 1.0, 0.88, 1.0],
            Easing::SineInOut => [0.37, 0.0, 0.63, 1.0],
            Easing::QuadIn => [0.11, 0.0, 0.5, 0.0],
            Easing::QuadOut => [0.5, 1.0, 0.89, 1.0],
            Easing::QuadInOut => [0.45, 0.0, 0.55, 1.0],
            Easing::CubicIn => [0.32, 0.0, 0.67, 0.0],
            Easing::CubicOut => [0.33, 1.0, 0.68, 1.0],
            Easing::CubicInOut => [0.65, 0.0, 0.35, 1.0],
            Easing::QuartIn => [0.5, 0.0, 0.75, 0.0],
            Easing::QuartOut => [0.25, 1.0, 0.5, 1.0],
            Easing::QuartInOut => [0.76, 0.0, 0.24, 1.0],
            Easing::QuintIn => [0.64, 0.0, 0.78, 0.0],
            Easing::QuintOut => [0.22, 1.0, 0.36, 1.0],
            Easing::QuintInOut => [0.83, 0.0, 0.17, 1.0],
            Easing::ExpoIn => [0.7, 0.0, 0.84, 0.0],
            Easing::ExpoOut => [0.16, 1.0, 0.3, 1.0],
            Easing::ExpoInOut => [0.87, 0.0, 0.13, 1.0],
            Easing::CircIn => [0.55, 0.0, 1.0, 0.45],
            Easing::CircOut => [0.0, 0.55, 0.45, 1.0],
            Easing::CircInOut => [0.85, 0.0, 0.15, 1.0],
            Easing::BackIn => [0.36, 0.0, 0.66, -0.56],
            Easing::BackOut => [0.34, 1.56, 0.64, 1.0],
            Easing::BackInOut => [0.68, -0.6, 0.32, 1.6],
        };
        Some(points)
    }

    /// Apply the preset to a normalized time value.
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        match self.control_points() {
            Some(points) => CubicBezier::new(points).apply(t),
            None => t,
        }
    }
}

/// A cubic bezier timing curve anchored at (0, 0) and (1, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 4;

    pub fn new([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Evaluate the curve's y for a given x (time fraction).
    pub fn apply(&self, x: f64) -> f64 {
        // A curve whose handles sit on the diagonal is the identity.
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        sample(self.solve_t(x), self.y1, self.y2)
    }

    /// Newton–Raphson search for the curve parameter whose x matches.
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let slope = slope(t, self.x1, self.x2);
            if slope == 0.0 {
                return t;
            }
            let current_x = sample(t, self.x1, self.x2) - x;
            t -= current_x / slope;
        }
        t
    }
}

#[inline]
fn coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
    (1.0 - 3.0 * p2 + 3.0 * p1, 3.0 * p2 - 6.0 * p1, 3.0 * p1)
}

#[inline]
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    let (a, b, c) = coefficients(p1, p2);
    ((a * t + b) * t + c) * t
}

#[inline]
fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    let (a, b, c) = coefficients(p1, p2);
    3.0 * a * t * t + 2.0 * b * t + c
}

/// How a transition spec names its easing curve.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum EaseSpec {
    /// A preset from the registry, e.g. `"easeOutCubic"`.
    Named(String),
    /// Cubic bezier control points `[x1, y1, x2, y2]`.
    Bezier([f64; 4]),
    /// A caller-supplied curve. Only reachable from code.
    #[serde(skip_deserializing)]
    Custom(EasingFn),
}

impl EaseSpec {
    pub fn custom(curve: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(curve))
    }
}

impl From<Easing> for EaseSpec {
    fn from(easing: Easing) -> Self {
        Self::Named(easing.name().to_string())
    }
}

impl fmt::Debug for EaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EaseSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            EaseSpec::Bezier(points) => f.debug_tuple("Bezier").field(points).finish(),
            EaseSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Turn an easing spec into a callable curve. Absent means linear.
///
/// Unknown preset names fail here, before any frame is scheduled.
pub fn resolve(spec: Option<&EaseSpec>) -> Result<EasingFn, TransitionError> {
    match spec {
        None => Ok(Rc::new(|t| t)),
        Some(EaseSpec::Custom(curve)) => Ok(Rc::clone(curve)),
        Some(EaseSpec::Named(name)) => {
            let easing = Easing::from_name(name).ok_or_else(|| TransitionError::UnknownEasing {
                name: name.clone(),
            })?;
            Ok(Rc::new(move |t| easing.apply(t)))
        }
        Some(EaseSpec::Bezier(points)) => {
            let curve = CubicBezier::new(*points);
            Ok(Rc::new(move |t| curve.apply(t)))
        }
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values. `alpha` is not clamped.
#[inline]
pub fn lerp(a: f64, b: f64, alpha: f64) -> f64 {
    a + alpha * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_endpoints() {
        assert_eq!(Easing::Linear.apply(0.0), 0.0);
        assert_eq!(Easing::Linear.apply(1.0), 1.0);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn presets_hit_their_endpoints() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{} at 0", easing.name());
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{} at 1", easing.name());
        }
    }

    #[test]
    fn quad_out_faster_start() {
        let mid = Easing::QuadOut.apply(0.5);
        assert!(mid > 0.5, "QuadOut at 0.5 should be > 0.5, got {}", mid);
    }

    #[test]
    fn back_in_dips_below_zero() {
        assert!(Easing::BackIn.apply(0.2) < 0.0);
    }

    #[test]
    fn names_round_trip_through_registry() {
        for easing in Easing::ALL {
            assert_eq!(Easing::from_name(easing.name()), Some(easing));
        }
        assert_eq!(Easing::from_name("bouncy"), None);
    }

    #[test]
    fn diagonal_bezier_is_identity() {
        let curve = CubicBezier::new([0.25, 0.25, 0.75, 0.75]);
        assert_eq!(curve.apply(0.3), 0.3);
    }

    #[test]
    fn resolve_defaults_to_linear() {
        let ease = resolve(None).unwrap();
        assert_eq!(ease(0.42), 0.42);
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let spec = EaseSpec::Named("wobble".into());
        let err = resolve(Some(&spec)).err().unwrap();
        assert_eq!(err, TransitionError::UnknownEasing { name: "wobble".into() });
    }

    #[test]
    fn resolve_custom_is_returned_unchanged() {
        let spec = EaseSpec::custom(|t| t * t);
        let ease = resolve(Some(&spec)).unwrap();
        assert_eq!(ease(0.5), 0.25);
    }

    #[test]
    fn resolve_bezier_matches_preset() {
        let points = Easing::CubicOut.control_points().unwrap();
        let ease = resolve(Some(&EaseSpec::Bezier(points))).unwrap();
        assert_eq!(ease(0.3), Easing::CubicOut.apply(0.3));
    }

    #[test]
    fn ease_spec_deserializes_both_shapes() {
        let named: EaseSpec = serde_json::from_str(r#""easeInQuad""#).unwrap();
        assert!(matches!(named, EaseSpec::Named(ref n) if n == "easeInQuad"));
        let bezier: EaseSpec = serde_json::from_str("[0.1, 0.2, 0.3, 0.4]").unwrap();
        match bezier {
            EaseSpec::Bezier(points) => assert_eq!(points, [0.1, 0.2, 0.3, 0.4]),
            other => panic!("expected bezier, got {:?}", other),
        }
    }

    #[test]
    fn lerp_interpolates_without_clamping() {
        assert_eq!(lerp(100.0, 200.0, 0.5), 150.0);
        assert_eq!(lerp(0.0, 10.0, 1.2), 12.0);
    }
}
