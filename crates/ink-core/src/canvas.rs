//! Canvas: the recorded command log plus everything needed to replay it.

use ink_config::{CanvasConfig, IncompleteDrawStrategy};

use crate::command::{
    BitmapFill, Command, GradientFill, LineStyle, SolidFill, UserData, WindingRule,
};
use crate::draw;
use crate::geometry::{Matrix, Point, Rect, Size};
use crate::hit_test;
use crate::render_group::RenderGroup;
use crate::renderer::Renderer;

/// Budget value meaning "draw everything".
pub const UNBOUNDED_LENGTH: f32 = f32::MAX;

#[derive(Clone, Debug)]
pub struct Canvas {
    pub(crate) commands: Vec<Command>,
    pub(crate) render_groups: Vec<RenderGroup>,

    pub(crate) matrix: Matrix,
    matrix_stack: Vec<Matrix>,

    cursor: Point,
    previous_control: Point,

    pub(crate) total_length: f32,
    pub(crate) max_length: f32,
    pub(crate) over_draw_allowance: f32,
    pub(crate) incomplete_fill_strategy: IncompleteDrawStrategy,
    pub(crate) incomplete_stroke_strategy: IncompleteDrawStrategy,

    pub(crate) pixels_per_point: f32,
    pub(crate) curve_multiplier: f32,
    pub(crate) convert_triangles_into_strips: bool,

    pub(crate) bounds: Rect,
    pub(crate) bounds_with_stroke: Rect,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            commands: Vec::new(),
            render_groups: Vec::new(),
            matrix: Matrix::IDENTITY,
            matrix_stack: Vec::new(),
            cursor: Point::ZERO,
            previous_control: Point::ZERO,
            total_length: 0.0,
            max_length: UNBOUNDED_LENGTH,
            over_draw_allowance: config.over_draw_allowance,
            incomplete_fill_strategy: config.incomplete_fill,
            incomplete_stroke_strategy: config.incomplete_stroke,
            pixels_per_point: config.pixels_per_point,
            curve_multiplier: config.curve_multiplier,
            convert_triangles_into_strips: config.convert_triangles_into_strips,
            bounds: Rect::ZERO,
            bounds_with_stroke: Rect::ZERO,
        }
    }

    /// Drop commands, render groups and replay state. Settings and the matrix
    /// stack are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.render_groups.clear();
        self.render_groups.shrink_to_fit();
        self.cursor = Point::ZERO;
        self.previous_control = Point::ZERO;
        self.total_length = 0.0;
        self.bounds = Rect::ZERO;
        self.bounds_with_stroke = Rect::ZERO;
    }

    fn position(&self, position: Point, relative: bool) -> Point {
        if relative { self.cursor + position } else { position }
    }

    fn reflected_control(&self) -> Point {
        self.cursor.reflect(self.previous_control)
    }

    fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    // Path recording

    pub fn move_to(&mut self, position: Point, relative: bool) {
        let position = self.position(position, relative);
        self.push(Command::MoveTo(position));
        self.cursor = position;
    }

    pub fn line_to(&mut self, position: Point, relative: bool) {
        let position = self.position(position, relative);
        self.push(Command::LineTo(position));
        self.cursor = position;
    }

    /// Quadratic curve. With `reflect`, `control` is ignored and the previous
    /// control point mirrored through the cursor is used instead.
    pub fn quadratic_curve_to(&mut self, control: Point, anchor: Point, relative: bool, reflect: bool) {
        let control = if reflect { self.reflected_control() } else { self.position(control, relative) };
        let anchor = self.position(anchor, relative);
        self.push(Command::QuadraticCurveTo { control, anchor });
        self.previous_control = control;
        self.cursor = anchor;
    }

    pub fn curve_to(&mut self, control: Point, anchor: Point, relative: bool, reflect: bool) {
        self.quadratic_curve_to(control, anchor, relative, reflect);
    }

    /// Cubic curve. With `reflect`, `control_a` is replaced by the mirrored
    /// previous control point.
    pub fn cubic_curve_to(
        &mut self,
        control_a: Point,
        control_b: Point,
        anchor: Point,
        relative: bool,
        reflect: bool,
    ) {
        let control_a = if reflect { self.reflected_control() } else { self.position(control_a, relative) };
        let control_b = self.position(control_b, relative);
        let anchor = self.position(anchor, relative);
        self.push(Command::CubicCurveTo { control_a, control_b, anchor });
        self.previous_control = control_b;
        self.cursor = anchor;
    }

    // Styles

    pub fn begin_fill(&mut self, fill: SolidFill) {
        self.push(Command::SolidFill(fill));
    }

    pub fn begin_bitmap_fill(&mut self, fill: BitmapFill) {
        self.push(Command::BitmapFill(fill));
    }

    pub fn begin_gradient_fill(&mut self, fill: GradientFill) {
        self.push(Command::GradientFill(fill));
    }

    pub fn line_style(&mut self, style: LineStyle) {
        self.push(Command::LineStyle(Some(style)));
    }

    /// Stop stroking subsequent segments.
    pub fn line_style_none(&mut self) {
        self.push(Command::LineStyle(None));
    }

    pub fn line_bitmap_style(&mut self, fill: BitmapFill) {
        self.push(Command::LineBitmap(fill));
    }

    pub fn line_gradient_style(&mut self, fill: GradientFill) {
        self.push(Command::LineGradient(fill));
    }

    pub fn winding_style(&mut self, rule: WindingRule) {
        self.push(Command::Winding(rule));
    }

    pub fn user_data(&mut self, data: UserData) {
        self.push(Command::UserData(data));
    }

    pub fn end_fill(&mut self) {
        self.push(Command::EndFill);
    }

    // Matrix stack

    pub fn push_matrix(&mut self) {
        self.matrix_stack.push(self.matrix);
    }

    /// Restore the matrix saved by the matching `push_matrix`, or identity
    /// when nothing was saved.
    pub fn pop_matrix(&mut self) {
        self.matrix = self.matrix_stack.pop().unwrap_or(Matrix::IDENTITY);
    }

    pub fn load_matrix(&mut self, matrix: Matrix) {
        self.matrix = matrix;
    }

    pub fn mult_matrix(&mut self, matrix: Matrix) {
        self.matrix = self.matrix.concat(matrix);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.matrix = self.matrix.rotate(radians);
    }

    pub fn scale(&mut self, scale: Size) {
        self.matrix = self.matrix.scale(scale);
    }

    pub fn translate(&mut self, offset: Point) {
        self.matrix = self.matrix.translate(offset);
    }

    pub fn matrix(&self) -> Matrix {
        self.matrix
    }

    // Accessors

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn render_groups(&self) -> &[RenderGroup] {
        &self.render_groups
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn previous_control(&self) -> Point {
        self.previous_control
    }

    /// Length drawn by the last build, in device units.
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    /// Cap the drawn path length of the next build. [`UNBOUNDED_LENGTH`] or
    /// any infinite value draws everything; NaN is treated as zero.
    pub fn set_max_length(&mut self, max_length: f32) {
        self.max_length = if max_length.is_nan() {
            0.0
        } else if max_length.is_infinite() && max_length > 0.0 {
            UNBOUNDED_LENGTH
        } else {
            max_length.max(0.0)
        };
    }

    pub fn over_draw_allowance(&self) -> f32 {
        self.over_draw_allowance
    }

    pub fn set_over_draw_allowance(&mut self, allowance: f32) {
        self.over_draw_allowance = allowance;
    }

    pub fn incomplete_fill_strategy(&self) -> IncompleteDrawStrategy {
        self.incomplete_fill_strategy
    }

    pub fn set_incomplete_fill_strategy(&mut self, strategy: IncompleteDrawStrategy) {
        self.incomplete_fill_strategy = strategy;
    }

    pub fn incomplete_stroke_strategy(&self) -> IncompleteDrawStrategy {
        self.incomplete_stroke_strategy
    }

    pub fn set_incomplete_stroke_strategy(&mut self, strategy: IncompleteDrawStrategy) {
        self.incomplete_stroke_strategy = strategy;
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point;
    }

    pub fn curve_multiplier(&self) -> f32 {
        self.curve_multiplier
    }

    pub fn set_curve_multiplier(&mut self, multiplier: f32) {
        self.curve_multiplier = multiplier;
    }

    pub fn convert_triangles_into_strips(&self) -> bool {
        self.convert_triangles_into_strips
    }

    pub fn set_convert_triangles_into_strips(&mut self, convert: bool) {
        self.convert_triangles_into_strips = convert;
    }

    /// Bounds of the last build's fill geometry only.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounds of the last build's fill and stroke geometry.
    pub fn bounds_with_stroke(&self) -> Rect {
        self.bounds_with_stroke
    }

    // Output

    /// First render group hit by `point` (device space), if any.
    pub fn contains_point(&self, point: Point, use_bounding_box: bool, use_stroke: bool) -> Option<&RenderGroup> {
        let bounds = if use_stroke { self.bounds_with_stroke } else { self.bounds };
        hit_test::contains_point(&self.render_groups, bounds, point, use_bounding_box, use_stroke)
    }

    /// Draw the last build through `renderer`; returns the vertex count.
    pub fn draw(&self, renderer: &mut dyn Renderer) -> usize {
        draw::draw(&self.render_groups, renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_moves_resolve_against_cursor() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::new(10.0, 10.0), false);
        canvas.line_to(Point::new(5.0, -2.0), true);
        assert_eq!(canvas.cursor(), Point::new(15.0, 8.0));
        assert_eq!(canvas.commands()[1], Command::LineTo(Point::new(15.0, 8.0)));
    }

    #[test]
    fn reflected_quadratic_mirrors_previous_control() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::ZERO, false);
        canvas.quadratic_curve_to(Point::new(5.0, 10.0), Point::new(10.0, 0.0), false, false);
        canvas.quadratic_curve_to(Point::ZERO, Point::new(20.0, 0.0), false, true);
        assert_eq!(
            canvas.commands()[2],
            Command::QuadraticCurveTo { control: Point::new(15.0, -10.0), anchor: Point::new(20.0, 0.0) }
        );
        assert_eq!(canvas.previous_control(), Point::new(15.0, -10.0));
    }

    #[test]
    fn cubic_stores_second_control() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::new(1.0, 1.0), false);
        canvas.cubic_curve_to(Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0), true, false);
        assert_eq!(canvas.previous_control(), Point::new(3.0, 1.0));
        assert_eq!(canvas.cursor(), Point::new(4.0, 1.0));
    }

    #[test]
    fn reflected_cubic_mirrors_previous_control() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::ZERO, false);
        canvas.cubic_curve_to(Point::new(0.0, 5.0), Point::new(8.0, 6.0), Point::new(10.0, 4.0), false, false);
        canvas.cubic_curve_to(Point::ZERO, Point::new(4.0, 2.0), Point::new(6.0, -4.0), true, true);
        assert_eq!(
            canvas.commands()[2],
            Command::CubicCurveTo {
                control_a: Point::new(12.0, 2.0),
                control_b: Point::new(14.0, 6.0),
                anchor: Point::new(16.0, 0.0),
            }
        );
        assert_eq!(canvas.previous_control(), Point::new(14.0, 6.0));
        assert_eq!(canvas.cursor(), Point::new(16.0, 0.0));
    }

    #[test]
    fn style_commands_leave_cursor_alone() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::new(2.0, 2.0), false);
        canvas.begin_fill(SolidFill::default());
        canvas.line_style_none();
        canvas.winding_style(WindingRule::EvenOdd);
        canvas.end_fill();
        assert_eq!(canvas.cursor(), Point::new(2.0, 2.0));
        assert_eq!(canvas.commands().len(), 5);
    }

    #[test]
    fn pop_matrix_restores_saved_matrix() {
        let mut canvas = Canvas::new();
        canvas.translate(Point::new(5.0, 0.0));
        canvas.push_matrix();
        canvas.scale(Size::new(2.0, 2.0));
        canvas.pop_matrix();
        assert_eq!(canvas.matrix(), Matrix::translation(5.0, 0.0));
        canvas.pop_matrix();
        assert_eq!(canvas.matrix(), Matrix::IDENTITY);
    }

    #[test]
    fn clear_resets_recording_state() {
        let mut canvas = Canvas::new();
        canvas.move_to(Point::new(1.0, 1.0), false);
        canvas.curve_to(Point::new(2.0, 2.0), Point::new(3.0, 1.0), false, false);
        canvas.clear();
        assert!(canvas.commands().is_empty());
        assert_eq!(canvas.cursor(), Point::ZERO);
        assert_eq!(canvas.previous_control(), Point::ZERO);
    }

    #[test]
    fn max_length_sanitizes_input() {
        let mut canvas = Canvas::new();
        canvas.set_max_length(f32::INFINITY);
        assert_eq!(canvas.max_length(), UNBOUNDED_LENGTH);
        canvas.set_max_length(f32::NAN);
        assert_eq!(canvas.max_length(), 0.0);
        canvas.set_max_length(-4.0);
        assert_eq!(canvas.max_length(), 0.0);
    }
}
