//! Value types for 2-D geometry: points, sizes, rectangles, affine matrices,
//! triangles and line segments.

use std::ops::{Add, Mul, Sub};

/// Tolerance used by the containment tests.
pub const EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `to`.
    pub fn interpolate(self, to: Self, t: f32) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    /// Reflect `other` through `self` (`2 * self - other`).
    pub fn reflect(self, other: Self) -> Self {
        (self - other) + self
    }

    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f32; 2]> for Point {
    fn from(p: [f32; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<Point> for lyon_geom::Point<f32> {
    fn from(p: Point) -> Self {
        lyon_geom::point(p.x, p.y)
    }
}

impl From<lyon_geom::Point<f32>> for Point {
    fn from(p: lyon_geom::Point<f32>) -> Self {
        Self::new(p.x, p.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Origin + size. Width and height may be negative while a rectangle is being
/// assembled; [`Rect::contains`] normalizes before testing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Self = Self { origin: Point::ZERO, size: Size::ZERO };

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { origin: Point::new(x, y), size: Size::new(w, h) }
    }

    /// Smallest rectangle spanning both corners.
    pub fn from_points(min: Point, max: Point) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Same rectangle with non-negative width and height.
    pub fn standardized(self) -> Self {
        let Self { origin, size } = self;
        let (x, w) = if size.width < 0.0 { (origin.x + size.width, -size.width) } else { (origin.x, size.width) };
        let (y, h) = if size.height < 0.0 { (origin.y + size.height, -size.height) } else { (origin.y, size.height) };
        Self::new(x, y, w, h)
    }

    pub fn min(self) -> Point {
        self.standardized().origin
    }

    pub fn max(self) -> Point {
        let r = self.standardized();
        Point::new(r.origin.x + r.size.width, r.origin.y + r.size.height)
    }

    /// Inclusive containment.
    pub fn contains(self, p: Point) -> bool {
        let min = self.min();
        let max = self.max();
        p.x >= min.x && p.y >= min.y && p.x <= max.x && p.y <= max.y
    }
}

/// 2×3 affine matrix mapping `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Compose two matrices: self ∘ other (apply `other`, then `self`).
    pub fn concat(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn translate(self, offset: Point) -> Self {
        self.concat(Self::translation(offset.x, offset.y))
    }

    pub fn scale(self, scale: Size) -> Self {
        self.concat(Self::scaling(scale.width, scale.height))
    }

    pub fn rotate(self, radians: f32) -> Self {
        self.concat(Self::rotation(radians))
    }

    pub fn determinant(self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn invert(self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        // Inverse translation = -inv_linear * [tx, ty]
        let tx = -(a * self.tx + c * self.ty);
        let ty = -(b * self.tx + d * self.ty);
        Some(Self { a, b, c, d, tx, ty })
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.tx, self.b * p.x + self.d * p.y + self.ty)
    }

    /// Transform ignoring the translation part.
    pub fn delta_transform_point(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y, self.b * p.x + self.d * p.y)
    }

    /// Per-axis scale factors: lengths of the transformed unit x and y vectors.
    pub fn scale_factors(&self) -> Size {
        Size::new(self.a.hypot(self.b), self.c.hypot(self.d))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub const fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    pub fn signed_area(&self) -> f32 {
        0.5 * (self.b - self.a).cross(self.c - self.a)
    }

    /// Inclusive of the edges. Degenerate (zero-area) triangles contain nothing,
    /// which keeps the stitching triangles of a strip invisible to hit tests.
    pub fn contains(&self, p: Point) -> bool {
        let area = self.signed_area();
        if area.abs() <= f32::EPSILON {
            return false;
        }
        let d1 = (self.b - self.a).cross(p - self.a);
        let d2 = (self.c - self.b).cross(p - self.b);
        let d3 = (self.a - self.c).cross(p - self.c);
        let tol = EPSILON * area.abs().max(1.0);
        let has_neg = d1 < -tol || d2 < -tol || d3 < -tol;
        let has_pos = d1 > tol || d2 > tol || d3 > tol;
        !(has_neg && has_pos)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// True when `p` lies on the segment, within [`EPSILON`].
    pub fn contains(&self, p: Point) -> bool {
        let dir = self.end - self.start;
        let len_sq = dir.dot(dir);
        if len_sq <= f32::EPSILON {
            return self.start.distance(p) <= EPSILON;
        }
        let rel = p - self.start;
        let len = len_sq.sqrt();
        if (dir.cross(rel) / len).abs() > EPSILON {
            return false;
        }
        let t = dir.dot(rel) / len_sq;
        let slack = EPSILON / len;
        (-slack..=1.0 + slack).contains(&t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn rect_contains_normalizes_negative_size() {
        let r = Rect::new(10.0, 10.0, -10.0, -5.0);
        assert!(r.contains(Point::new(5.0, 7.0)));
        assert!(r.contains(Point::new(0.0, 5.0)));
        assert!(!r.contains(Point::new(11.0, 7.0)));
    }

    #[test]
    fn matrix_invert_roundtrips_points() {
        let m = Matrix::translation(3.0, -2.0).rotate(0.7).scale(Size::new(2.0, 0.5));
        let inv = m.invert().unwrap();
        let p = Point::new(4.5, -1.25);
        let back = inv.transform_point(m.transform_point(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix::scaling(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn concat_applies_right_hand_side_first() {
        let m = Matrix::translation(10.0, 0.0).concat(Matrix::scaling(2.0, 2.0));
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn scale_factors_ignore_rotation() {
        let m = Matrix::rotation(1.1).scale(Size::new(2.0, 3.0));
        let s = m.scale_factors();
        assert!(approx(s.width, 2.0) && approx(s.height, 3.0));
    }

    #[test]
    fn triangle_contains_edges_and_rejects_outside() {
        let t = Triangle::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0));
        assert!(t.contains(Point::new(2.0, 2.0)));
        assert!(t.contains(Point::new(5.0, 0.0)));
        assert!(t.contains(Point::new(5.0, 5.0)));
        assert!(!t.contains(Point::new(6.0, 6.0)));
    }

    #[test]
    fn degenerate_triangle_contains_nothing() {
        let p = Point::new(1.0, 1.0);
        let t = Triangle::new(p, p, Point::new(4.0, 4.0));
        assert!(!t.contains(Point::new(2.0, 2.0)));
    }

    #[test]
    fn line_contains_points_on_segment_only() {
        let l = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 5.0));
        assert!(l.contains(Point::new(4.0, 2.0)));
        assert!(l.contains(Point::new(10.0, 5.0)));
        assert!(!l.contains(Point::new(12.0, 6.0)));
        assert!(!l.contains(Point::new(4.0, 2.5)));
    }

    #[test]
    fn reflect_mirrors_through_point() {
        let cursor = Point::new(5.0, 5.0);
        assert_eq!(cursor.reflect(Point::new(3.0, 4.0)), Point::new(7.0, 6.0));
    }
}
