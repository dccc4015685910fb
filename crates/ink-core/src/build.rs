//! Replaying the command log into render groups.

use ink_config::IncompleteDrawStrategy;

use crate::canvas::{Canvas, UNBOUNDED_LENGTH};
use crate::command::{Command, Fill, LineScaleMode, LineStyle, Stroke};
use crate::curve::Curve;
use crate::error::{InkError, Result};
use crate::generator::{FillGenerator, StrokeGenerator};
use crate::geometry::{EPSILON, Matrix, Point, Rect};
use crate::render_group::RenderGroup;
use crate::tessellator::{StrokeStyle, Tessellator, TessellatorContext};

/// Device thickness of `stroke` under `matrix`.
///
/// Scaled modes follow the matrix scale factors: horizontal strokes take the
/// vertical factor, vertical strokes the horizontal one, normal strokes the
/// mean. Pixel hinting snaps to whole device pixels, never below one.
pub fn resolve_thickness(stroke: &Stroke, matrix: &Matrix, pixels_per_point: f32) -> f32 {
    let mut thickness = match stroke.scale_mode {
        LineScaleMode::None => stroke.thickness,
        mode => {
            let scale = matrix.scale_factors();
            let author = stroke.thickness.abs();
            let x = (author * scale.width).abs();
            let y = (author * scale.height).abs();
            match mode {
                LineScaleMode::Horizontal => y,
                LineScaleMode::Vertical => x,
                _ => (x + y) * 0.5,
            }
        }
    };

    if stroke.pixel_hinting && pixels_per_point > 0.0 {
        let pixel = 1.0 / pixels_per_point;
        thickness = ((thickness / pixel).round() * pixel).max(pixel);
    }
    thickness
}

/// Opacity left on geometry that overshot the budget by `overshoot`.
///
/// Reaching the budget exactly leaves it opaque; overshooting by the whole
/// allowance or more hides it. Without an allowance anything cut short is
/// hidden.
pub fn fade_factor(overshoot: f32, allowance: f32) -> f32 {
    if allowance.is_nan() || allowance <= 0.0 {
        return 0.0;
    }
    let ratio = overshoot / allowance;
    if ratio.is_nan() {
        return 0.0;
    }
    1.0 - ratio.clamp(0.0, 1.0)
}

fn inverse(matrix: &Matrix) -> Result<Matrix> {
    matrix.invert().ok_or(InkError::SingularMatrix(matrix.determinant()))
}

/// Settings copied out of the canvas for one replay.
#[derive(Clone, Copy, Debug)]
struct ReplaySettings {
    matrix: Matrix,
    max_length: f32,
    pixels_per_point: f32,
    curve_multiplier: f32,
}

/// Mutable state of one replay. Generators live here; the tessellators are
/// borrowed from the caller's context.
struct Replay<'t> {
    settings: ReplaySettings,
    fill_tess: &'t mut dyn Tessellator,
    stroke_tess: &'t mut dyn Tessellator,
    fill: Option<FillGenerator>,
    stroke: Option<StrokeGenerator>,
    render_groups: Vec<RenderGroup>,
    cursor: Point,
    /// Length actually drawn; never exceeds the budget.
    drawn_length: f32,
    /// Length the replayed segments asked for, including the cut-off part.
    requested_length: f32,
}

impl<'t> Replay<'t> {
    fn new(settings: ReplaySettings, tess: &'t mut TessellatorContext) -> Self {
        tess.reset();
        let TessellatorContext { fill, stroke } = tess;
        Self {
            settings,
            fill_tess: &mut **fill,
            stroke_tess: &mut **stroke,
            fill: None,
            stroke: None,
            render_groups: Vec::new(),
            cursor: Point::ZERO,
            drawn_length: 0.0,
            requested_length: 0.0,
        }
    }

    fn is_bounded(&self) -> bool {
        self.settings.max_length < UNBOUNDED_LENGTH
    }

    fn budget_exhausted(&self) -> bool {
        self.is_bounded() && self.drawn_length >= self.settings.max_length
    }

    fn apply(&mut self, command: &Command) {
        let matrix = self.settings.matrix;
        match command {
            Command::MoveTo(position) => {
                let point = matrix.transform_point(*position);
                if !point.is_finite() {
                    log::debug!("skipping move to non-finite point {point:?}");
                    return;
                }
                if let Some(fill) = self.fill.as_mut() {
                    fill.move_to(point, self.fill_tess);
                }
                if let Some(stroke) = self.stroke.as_mut() {
                    stroke.move_to(point, self.stroke_tess);
                }
                self.cursor = point;
            }
            Command::LineTo(position) => {
                self.line_to(matrix.transform_point(*position), false);
            }
            Command::QuadraticCurveTo { control, anchor } => {
                let (control, to) = (matrix.transform_point(*control), matrix.transform_point(*anchor));
                if !(control.is_finite() && to.is_finite()) {
                    log::debug!("skipping curve through non-finite point {control:?} {to:?}");
                    return;
                }
                self.curve(Curve::Quadratic { from: self.cursor, control, to });
            }
            Command::CubicCurveTo { control_a, control_b, anchor } => {
                let control_a = matrix.transform_point(*control_a);
                let control_b = matrix.transform_point(*control_b);
                let to = matrix.transform_point(*anchor);
                if !(control_a.is_finite() && control_b.is_finite() && to.is_finite()) {
                    log::debug!("skipping curve through non-finite point {control_a:?} {control_b:?} {to:?}");
                    return;
                }
                self.curve(Curve::Cubic { from: self.cursor, control_a, control_b, to });
            }
            Command::SolidFill(fill) => self.begin_fill(Fill::Solid(*fill)),
            Command::BitmapFill(fill) => self.begin_fill(Fill::Bitmap(*fill)),
            Command::GradientFill(fill) => {
                log::debug!("gradient fills are recorded but not colored");
                self.begin_fill(Fill::Gradient(fill.clone()));
            }
            Command::LineStyle(style) => self.line_style(style.as_ref()),
            Command::LineBitmap(fill) => self.set_line_fill(Fill::Bitmap(*fill)),
            Command::LineGradient(fill) => self.set_line_fill(Fill::Gradient(fill.clone())),
            Command::Winding(rule) => {
                self.fill_tess.set_winding_rule(*rule);
                self.stroke_tess.set_winding_rule(*rule);
            }
            Command::UserData(data) => {
                self.fill_tess.set_user_data(Some(*data));
                self.stroke_tess.set_user_data(Some(*data));
            }
            Command::EndFill => {
                self.finish_fill();
                if let Some(stroke) = self.stroke.as_mut() {
                    stroke.end(self.stroke_tess);
                    stroke.remove_all_vertices();
                }
            }
        }
    }

    /// The single path every drawn segment goes through. Enforces the length
    /// budget and feeds both generators. Non-finite points are dropped.
    fn line_to(&mut self, point: Point, is_curve: bool) {
        let max = self.settings.max_length;
        if max.abs() < EPSILON || self.budget_exhausted() {
            return;
        }
        if !point.is_finite() {
            log::debug!("skipping line to non-finite point {point:?}");
            return;
        }

        let distance = self.cursor.distance(point);
        let mut point = point;
        if self.is_bounded() && self.drawn_length + distance >= max {
            let remaining = max - self.drawn_length;
            if distance > 0.0 {
                point = self.cursor.interpolate(point, remaining / distance);
            }
            self.drawn_length = max;
        } else {
            self.drawn_length += distance;
        }
        self.requested_length += distance;

        if let Some(fill) = self.fill.as_mut() {
            fill.line_to(point, is_curve);
        }
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.line_to(point, is_curve);
        }
        self.cursor = point;
    }

    fn curve(&mut self, curve: Curve) {
        let length = curve.arc_length();
        debug_assert!(length.is_finite() && length != 0.0, "degenerate curve {curve:?}");
        let count = Curve::segment_count(length, self.settings.pixels_per_point, self.settings.curve_multiplier);
        for point in curve.flatten(count) {
            self.line_to(point, true);
        }
    }

    fn begin_fill(&mut self, fill: Fill) {
        self.finish_fill();
        match inverse(&self.settings.matrix) {
            Ok(inv) => {
                let mut generator = FillGenerator::new(self.fill_tess, fill, inv);
                generator.move_to(self.cursor, self.fill_tess);
                self.fill = Some(generator);
            }
            Err(e) => log::warn!("skipping fill: {e}"),
        }
    }

    fn line_style(&mut self, style: Option<&LineStyle>) {
        self.finish_stroke();
        let Some(style) = style else {
            return;
        };
        if style.stroke.thickness.is_nan() {
            return;
        }
        let inv = match inverse(&self.settings.matrix) {
            Ok(inv) => inv,
            Err(e) => {
                log::warn!("skipping stroke: {e}");
                return;
            }
        };
        let resolved = StrokeStyle {
            width: resolve_thickness(&style.stroke, &self.settings.matrix, self.settings.pixels_per_point),
            caps: style.stroke.caps,
            joints: style.stroke.joints,
            miter_limit: style.stroke.miter_limit,
        };
        let mut generator = StrokeGenerator::new(self.stroke_tess, resolved, Fill::Solid(style.fill), inv);
        generator.move_to(self.cursor, self.stroke_tess);
        self.stroke = Some(generator);
    }

    fn set_line_fill(&mut self, fill: Fill) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        match inverse(&self.settings.matrix) {
            Ok(inv) => stroke.set_fill(self.stroke_tess, &mut self.render_groups, fill, inv),
            Err(e) => log::warn!("keeping previous line fill: {e}"),
        }
    }

    fn finish_fill(&mut self) {
        if let Some(fill) = self.fill.take() {
            fill.finish(self.fill_tess, &mut self.render_groups);
        }
    }

    fn finish_stroke(&mut self) {
        if let Some(stroke) = self.stroke.take() {
            stroke.finish(self.stroke_tess, &mut self.render_groups);
        }
    }

    /// Fill strictly before stroke.
    fn finish(&mut self) {
        self.finish_fill();
        self.finish_stroke();
    }

    /// Apply the `None` strategy to the unfinished generators. `Fade` is
    /// applied to whole render groups once they exist.
    fn discard_incomplete(&mut self, fill: IncompleteDrawStrategy, stroke: IncompleteDrawStrategy) {
        if fill == IncompleteDrawStrategy::None {
            if let Some(generator) = self.fill.as_mut() {
                generator.remove_all_vertices();
            }
        }
        if stroke == IncompleteDrawStrategy::None {
            if let Some(generator) = self.stroke.as_mut() {
                generator.remove_all_vertices();
            }
        }
    }
}

/// Fill-only and fill-plus-stroke bounds over every vertex.
fn compute_bounds(groups: &[RenderGroup]) -> (Rect, Rect) {
    let mut fill: Option<(Point, Point)> = None;
    let mut all: Option<(Point, Point)> = None;
    let grow = |acc: &mut Option<(Point, Point)>, p: Point| {
        *acc = Some(match *acc {
            Some((min, max)) => (min.min(p), max.max(p)),
            None => (p, p),
        });
    };
    for group in groups {
        for vertex in &group.vertices {
            let p = vertex.position();
            if !group.is_stroke {
                grow(&mut fill, p);
            }
            grow(&mut all, p);
        }
    }
    let rect = |acc: Option<(Point, Point)>| acc.map_or(Rect::ZERO, |(min, max)| Rect::from_points(min, max));
    (rect(fill), rect(all))
}

impl Canvas {
    /// Replay the recorded commands into render groups, replacing the
    /// previous build. Tessellation runs on `tess`.
    pub fn build(&mut self, tess: &mut TessellatorContext) {
        self.render_groups.clear();
        self.total_length = 0.0;

        let settings = ReplaySettings {
            matrix: self.matrix,
            max_length: self.max_length,
            pixels_per_point: self.pixels_per_point,
            curve_multiplier: self.curve_multiplier,
        };
        let mut replay = Replay::new(settings, tess);
        let mut incomplete = false;

        for command in &self.commands {
            replay.apply(command);
            if replay.budget_exhausted() {
                incomplete = true;
                replay.discard_incomplete(self.incomplete_fill_strategy, self.incomplete_stroke_strategy);
                break;
            }
        }
        replay.finish();

        self.total_length = replay.drawn_length;
        let overshoot = replay.requested_length - replay.drawn_length;
        let mut groups = std::mem::take(&mut replay.render_groups);
        drop(replay);

        if incomplete {
            self.fade_incomplete(&mut groups, overshoot);
        }

        let (bounds, bounds_with_stroke) = compute_bounds(&groups);
        self.bounds = bounds;
        self.bounds_with_stroke = bounds_with_stroke;

        if self.convert_triangles_into_strips {
            for group in &mut groups {
                group.convert_to_strips();
                group.convert_to_elements();
            }
        }

        log::debug!(
            "built {} render groups from {} commands, drawn length {}{}",
            groups.len(),
            self.commands.len(),
            self.total_length,
            if incomplete { " (truncated)" } else { "" },
        );
        self.render_groups = groups;
    }

    fn fade_incomplete(&self, groups: &mut [RenderGroup], overshoot: f32) {
        let fade_fill = self.incomplete_fill_strategy == IncompleteDrawStrategy::Fade;
        let fade_stroke = self.incomplete_stroke_strategy == IncompleteDrawStrategy::Fade;
        if !fade_fill && !fade_stroke {
            return;
        }
        let factor = fade_factor(overshoot, self.over_draw_allowance);
        for group in groups.iter_mut() {
            let fade = if group.is_stroke { fade_stroke } else { fade_fill };
            if fade {
                group.fade(factor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SolidFill;
    use crate::geometry::Size;

    #[test]
    fn normal_scale_averages_factors() {
        let stroke = Stroke::with_thickness(2.0);
        let matrix = Matrix::scaling(2.0, 3.0);
        assert_eq!(resolve_thickness(&stroke, &matrix, 1.0), 5.0);
    }

    #[test]
    fn directional_scale_modes_pick_one_axis() {
        let matrix = Matrix::scaling(2.0, 3.0);
        let horizontal = Stroke { scale_mode: LineScaleMode::Horizontal, ..Stroke::with_thickness(2.0) };
        let vertical = Stroke { scale_mode: LineScaleMode::Vertical, ..Stroke::with_thickness(2.0) };
        let none = Stroke { scale_mode: LineScaleMode::None, ..Stroke::with_thickness(2.0) };
        assert_eq!(resolve_thickness(&horizontal, &matrix, 1.0), 6.0);
        assert_eq!(resolve_thickness(&vertical, &matrix, 1.0), 4.0);
        assert_eq!(resolve_thickness(&none, &matrix, 1.0), 2.0);
    }

    #[test]
    fn pixel_hinting_snaps_and_floors() {
        let hinted = |t: f32| Stroke { pixel_hinting: true, ..Stroke::with_thickness(t) };
        let m = Matrix::IDENTITY;
        assert_eq!(resolve_thickness(&hinted(2.3), &m, 1.0), 2.0);
        assert_eq!(resolve_thickness(&hinted(0.1), &m, 1.0), 1.0);
        assert_eq!(resolve_thickness(&hinted(1.3), &m, 2.0), 1.5);
    }

    #[test]
    fn fade_factor_is_guarded() {
        assert_eq!(fade_factor(5.0, 0.0), 0.0);
        assert_eq!(fade_factor(0.0, 10.0), 1.0);
        assert_eq!(fade_factor(5.0, 10.0), 0.5);
        assert_eq!(fade_factor(50.0, 10.0), 0.0);
    }

    #[test]
    fn bounds_skip_stroke_for_fill_only() {
        let mut canvas = Canvas::new();
        canvas.begin_fill(SolidFill::new(0xFF0000, 1.0));
        canvas.move_to(Point::new(0.0, 0.0), false);
        canvas.line_to(Point::new(10.0, 0.0), false);
        canvas.line_to(Point::new(10.0, 10.0), false);
        canvas.line_to(Point::new(0.0, 10.0), false);
        canvas.end_fill();
        let mut tess = TessellatorContext::default();
        canvas.build(&mut tess);
        let b = canvas.bounds();
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.bounds_with_stroke(), b);
    }

    #[test]
    fn singular_matrix_skips_fill() {
        let mut canvas = Canvas::new();
        canvas.scale(Size::new(0.0, 1.0));
        canvas.begin_fill(SolidFill::default());
        canvas.move_to(Point::new(0.0, 0.0), false);
        canvas.line_to(Point::new(10.0, 0.0), false);
        canvas.line_to(Point::new(10.0, 10.0), false);
        canvas.end_fill();
        let mut tess = TessellatorContext::default();
        canvas.build(&mut tess);
        assert!(canvas.render_groups().is_empty());
        assert_eq!(canvas.bounds(), Rect::ZERO);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let mut canvas = Canvas::new();
        canvas.begin_fill(SolidFill::default());
        canvas.move_to(Point::ZERO, false);
        canvas.line_to(Point::new(10.0, 0.0), false);
        canvas.line_to(Point::new(f32::NAN, 10.0), false);
        canvas.line_to(Point::new(10.0, 10.0), false);
        canvas.quadratic_curve_to(Point::new(f32::INFINITY, 0.0), Point::new(5.0, 12.0), false, false);
        canvas.line_to(Point::new(0.0, 10.0), false);
        canvas.end_fill();
        canvas.move_to(Point::new(0.0, f32::NAN), false);
        let mut tess = TessellatorContext::default();
        canvas.build(&mut tess);

        assert_eq!(canvas.total_length(), 30.0);
        assert_eq!(canvas.render_groups().len(), 1);
        assert_eq!(canvas.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn budget_truncates_onto_boundary() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::ZERO, false);
        canvas.line_to(Point::new(10.0, 0.0), false);
        canvas.line_to(Point::new(10.0, 10.0), false);
        canvas.set_max_length(15.0);
        let mut tess = TessellatorContext::default();
        canvas.build(&mut tess);
        assert_eq!(canvas.total_length(), 15.0);
    }
}
