//! Contour accumulation between the replay loop and the tessellators.
//!
//! A generator owns the open contour of one style run. Ended contours are
//! handed to the tessellator straight away. Fill and stroke generators open
//! a polygon on their tessellator when created and close it when finished;
//! the tessellator turns it into render groups.

use crate::command::Fill;
use crate::geometry::{Matrix, Point};
use crate::render_group::{RenderGroup, Vertex};
use crate::tessellator::{StrokeStyle, Tessellator};

/// Open contour plus the style applied to its vertices.
#[derive(Debug, Default)]
pub struct Generator {
    current: Option<Vec<Vertex>>,
    fill: Option<Fill>,
    inv_matrix: Matrix,
    previous: Point,
}

impl Generator {
    pub fn new(fill: Option<Fill>, inv_matrix: Matrix) -> Self {
        Self { fill, inv_matrix, ..Self::default() }
    }

    pub fn fill(&self) -> Option<&Fill> {
        self.fill.as_ref()
    }

    pub fn set_fill(&mut self, fill: Option<Fill>, inv_matrix: Matrix) {
        self.fill = fill;
        self.inv_matrix = inv_matrix;
    }

    /// Last position handed to `move_to` or `line_to`.
    pub fn previous(&self) -> Point {
        self.previous
    }

    /// Vertices of the open contour, if any.
    pub fn current_vertices(&self) -> Option<&[Vertex]> {
        self.current.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Close the open contour with `end` and start a new one at `position`.
    pub fn move_to_with<F: FnOnce(&mut Self)>(&mut self, position: Point, end: F) {
        end(self);
        self.start_contour(position);
    }

    /// Close the open contour through `tess` and start a new one at `position`.
    pub fn move_to(&mut self, position: Point, tess: &mut dyn Tessellator) {
        self.move_to_with(position, |generator| generator.end(tess));
    }

    /// Append `position` to the open contour. Curve samples landing exactly on
    /// the previous point are dropped; explicit lines are always kept. Without
    /// an open contour this only moves the pen.
    pub fn line_to(&mut self, position: Point, is_curve: bool) {
        if is_curve && self.current.is_some() && position == self.previous {
            return;
        }
        self.add_vertex(position);
    }

    /// Hand the open contour to `tess` and release it. No-op without one.
    pub fn end(&mut self, tess: &mut dyn Tessellator) {
        let Some(contour) = self.current.take() else {
            return;
        };
        tess.begin_contour();
        for vertex in &contour {
            tess.add_point(vertex);
        }
        tess.end_contour();
    }

    /// Forget the open contour. Contours already ended belong to the
    /// tessellator.
    pub fn remove_all_vertices(&mut self) {
        self.current = None;
    }

    fn start_contour(&mut self, position: Point) {
        self.current = Some(Vec::new());
        self.add_vertex(position);
    }

    fn add_vertex(&mut self, position: Point) {
        self.previous = position;
        if let Some(contour) = self.current.as_mut() {
            contour.push(Vertex::styled(position, self.fill.as_ref(), &self.inv_matrix));
        }
    }
}

/// Generator for the interior of a fill run.
#[derive(Debug)]
pub struct FillGenerator {
    generator: Generator,
}

impl FillGenerator {
    pub fn new(tess: &mut dyn Tessellator, fill: Fill, inv_matrix: Matrix) -> Self {
        tess.set_gl_data(Some(fill.clone()));
        tess.set_inv_matrix(inv_matrix);
        tess.begin_polygon();
        Self { generator: Generator::new(Some(fill), inv_matrix) }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn move_to(&mut self, position: Point, tess: &mut dyn Tessellator) {
        self.generator.move_to(position, tess);
    }

    pub fn line_to(&mut self, position: Point, is_curve: bool) {
        self.generator.line_to(position, is_curve);
    }

    pub fn end(&mut self, tess: &mut dyn Tessellator) {
        self.generator.end(tess);
    }

    pub fn remove_all_vertices(&mut self) {
        self.generator.remove_all_vertices();
    }

    /// Flush the open contour and close the polygon.
    pub fn finish(mut self, tess: &mut dyn Tessellator, render_groups: &mut Vec<RenderGroup>) {
        self.generator.end(tess);
        tess.end_polygon(render_groups);
    }
}

/// Generator for outlines. Line fills may change mid-path; the outline
/// continues from the point where the fill changed.
#[derive(Debug)]
pub struct StrokeGenerator {
    generator: Generator,
    style: StrokeStyle,
}

impl StrokeGenerator {
    pub fn new(tess: &mut dyn Tessellator, style: StrokeStyle, fill: Fill, inv_matrix: Matrix) -> Self {
        tess.set_stroke_style(Some(style));
        tess.set_gl_data(Some(fill.clone()));
        tess.set_inv_matrix(inv_matrix);
        tess.begin_polygon();
        Self { generator: Generator::new(Some(fill), inv_matrix), style }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn move_to(&mut self, position: Point, tess: &mut dyn Tessellator) {
        self.generator.move_to(position, tess);
    }

    pub fn line_to(&mut self, position: Point, is_curve: bool) {
        self.generator.line_to(position, is_curve);
    }

    pub fn end(&mut self, tess: &mut dyn Tessellator) {
        self.generator.end(tess);
    }

    pub fn remove_all_vertices(&mut self) {
        self.generator.remove_all_vertices();
    }

    /// Switch the line fill. Geometry so far is emitted with the old fill and
    /// an open contour resumes at the pen position under the new one.
    pub fn set_fill(
        &mut self,
        tess: &mut dyn Tessellator,
        render_groups: &mut Vec<RenderGroup>,
        fill: Fill,
        inv_matrix: Matrix,
    ) {
        let resume = self.generator.is_open().then(|| self.generator.previous());
        self.generator.end(tess);
        tess.end_polygon(render_groups);
        self.generator.remove_all_vertices();

        tess.set_stroke_style(Some(self.style));
        tess.set_gl_data(Some(fill.clone()));
        tess.set_inv_matrix(inv_matrix);
        tess.begin_polygon();
        self.generator.set_fill(Some(fill), inv_matrix);

        if let Some(position) = resume {
            self.generator.start_contour(position);
        }
    }

    pub fn finish(mut self, tess: &mut dyn Tessellator, render_groups: &mut Vec<RenderGroup>) {
        self.generator.end(tess);
        tess.end_polygon(render_groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BitmapFill, CapsStyle, JointStyle, SolidFill, TextureRef};
    use crate::render_group::DrawMode;
    use crate::tessellator::{FillTessellator, StrokeTessellator};

    fn solid(color: u32) -> Fill {
        Fill::Solid(SolidFill::new(color, 1.0))
    }

    #[test]
    fn line_without_contour_only_moves_pen() {
        let mut generator = Generator::new(None, Matrix::IDENTITY);
        generator.line_to(Point::new(3.0, 4.0), false);
        assert!(generator.current_vertices().is_none());
        assert_eq!(generator.previous(), Point::new(3.0, 4.0));
    }

    #[test]
    fn move_to_starts_new_contour() {
        let mut tess = FillTessellator::default();
        let mut generator = Generator::new(Some(solid(0xFF0000)), Matrix::IDENTITY);
        generator.move_to(Point::new(0.0, 0.0), &mut tess);
        generator.line_to(Point::new(1.0, 0.0), false);
        assert_eq!(generator.current_vertices().map(|c| c[1].color.r), Some(255));
        generator.move_to(Point::new(5.0, 5.0), &mut tess);
        assert_eq!(generator.current_vertices().map(<[Vertex]>::len), Some(1));
    }

    #[test]
    fn repeated_curve_points_are_dropped() {
        let mut tess = FillTessellator::default();
        let mut generator = Generator::default();
        generator.move_to(Point::ZERO, &mut tess);
        generator.line_to(Point::new(1.0, 1.0), true);
        generator.line_to(Point::new(1.0, 1.0), true);
        generator.line_to(Point::new(1.0, 1.0), false);
        assert_eq!(generator.current_vertices().map(<[Vertex]>::len), Some(3));
    }

    #[test]
    fn ended_contour_moves_to_tessellator() {
        let mut tess = FillTessellator::default();
        tess.begin_polygon();
        let mut generator = Generator::new(Some(solid(0x00FF00)), Matrix::IDENTITY);
        generator.move_to(Point::new(0.0, 0.0), &mut tess);
        generator.line_to(Point::new(6.0, 0.0), false);
        generator.line_to(Point::new(6.0, 6.0), false);
        generator.move_to(Point::new(20.0, 20.0), &mut tess);
        assert_eq!(generator.current_vertices().map(<[Vertex]>::len), Some(1));

        generator.end(&mut tess);
        assert!(generator.current_vertices().is_none());
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].vertex_count(), 3);
    }

    #[test]
    fn end_without_contour_is_noop() {
        let mut tess = FillTessellator::default();
        let mut generator = Generator::default();
        generator.end(&mut tess);
        assert!(!generator.is_open());
    }

    #[test]
    fn fill_generator_emits_group_on_finish() {
        let mut tess = FillTessellator::default();
        let mut groups = Vec::new();
        let mut fill = FillGenerator::new(&mut tess, solid(0x0000FF), Matrix::IDENTITY);
        fill.move_to(Point::new(0.0, 0.0), &mut tess);
        fill.line_to(Point::new(4.0, 0.0), false);
        fill.line_to(Point::new(4.0, 4.0), false);
        fill.line_to(Point::new(0.0, 4.0), false);
        fill.finish(&mut tess, &mut groups);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].draw_mode, DrawMode::Triangles);
        assert!(groups[0].vertices.iter().all(|v| v.color.b == 255));
    }

    #[test]
    fn stroke_fill_change_splits_groups() {
        let mut tess = StrokeTessellator::default();
        let mut groups = Vec::new();
        let style = StrokeStyle { width: 2.0, caps: CapsStyle::None, joints: JointStyle::Round, miter_limit: 3.0 };
        let mut stroke = StrokeGenerator::new(&mut tess, style, solid(0xFF0000), Matrix::IDENTITY);
        stroke.move_to(Point::new(0.0, 0.0), &mut tess);
        stroke.line_to(Point::new(10.0, 0.0), false);

        let texture = TextureRef { name: 7, width: 8, height: 8 };
        let bitmap = Fill::Bitmap(BitmapFill::new(texture, Matrix::IDENTITY, true, false));
        stroke.set_fill(&mut tess, &mut groups, bitmap, Matrix::IDENTITY);
        assert_eq!(groups.len(), 1);
        assert_eq!(stroke.generator().current_vertices().map(<[Vertex]>::len), Some(1));

        stroke.line_to(Point::new(10.0, 10.0), false);
        stroke.finish(&mut tess, &mut groups);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].gl_data.texture_name, 0);
        assert_eq!(groups[1].gl_data.texture_name, 7);
        assert!(groups.iter().all(|g| g.is_stroke));
    }
}
