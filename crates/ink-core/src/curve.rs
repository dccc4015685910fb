//! Bézier flattening sized by arc length.

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment};

use crate::geometry::Point;

/// Minimum number of line segments a curve is split into.
pub const MIN_SEGMENTS: u32 = 3;

/// Steps used when measuring a curve; the result only sizes the subdivision.
const LENGTH_SAMPLES: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    Quadratic { from: Point, control: Point, to: Point },
    Cubic { from: Point, control_a: Point, control_b: Point, to: Point },
}

impl Curve {
    pub fn start(&self) -> Point {
        match *self {
            Curve::Quadratic { from, .. } | Curve::Cubic { from, .. } => from,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Curve::Quadratic { to, .. } | Curve::Cubic { to, .. } => to,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Point {
        match *self {
            Curve::Quadratic { from, control, to } => QuadraticBezierSegment::<f32> {
                from: from.into(),
                ctrl: control.into(),
                to: to.into(),
            }
            .sample(t)
            .into(),
            Curve::Cubic { from, control_a, control_b, to } => CubicBezierSegment::<f32> {
                from: from.into(),
                ctrl1: control_a.into(),
                ctrl2: control_b.into(),
                to: to.into(),
            }
            .sample(t)
            .into(),
        }
    }

    /// Polyline estimate of the arc length.
    pub fn arc_length(&self) -> f32 {
        let mut length = 0.0;
        let mut previous = self.start();
        for i in 1..=LENGTH_SAMPLES {
            let next = self.sample(i as f32 / LENGTH_SAMPLES as f32);
            length += previous.distance(next);
            previous = next;
        }
        length
    }

    /// Segment count for a given arc length: one per device pixel of length,
    /// scaled by the density multiplier, never fewer than [`MIN_SEGMENTS`].
    pub fn segment_count(arc_length: f32, pixels_per_point: f32, curve_multiplier: f32) -> u32 {
        let count = arc_length.abs().ceil() * pixels_per_point * curve_multiplier;
        // NaN and negative products saturate to 0 here and hit the floor.
        (count as u32).max(MIN_SEGMENTS)
    }

    /// Points at `count` evenly spaced steps after the start, ending exactly
    /// on the anchor.
    pub fn flatten(&self, count: u32) -> impl Iterator<Item = Point> + '_ {
        let count = count.max(1);
        (1..=count).map(move |i| {
            if i == count {
                self.end()
            } else {
                self.sample(i as f32 / count as f32)
            }
        })
    }
}
