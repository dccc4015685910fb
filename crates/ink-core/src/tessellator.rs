//! Polygon → triangle conversion.
//!
//! Generators talk to a [`Tessellator`] the way they would to a GLU-style
//! tessellator: open a polygon, feed it contours point by point, and close it
//! to receive render groups. The default implementations wrap lyon.

use lyon_geom::point;
use lyon_path::Path as LyonPath;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillVertex, LineCap, LineJoin, StrokeOptions, StrokeVertex,
    VertexBuffers,
};

use ink_config::TessellationConfig;

use crate::command::{CapsStyle, Fill, JointStyle, UserData, WindingRule};
use crate::error::{InkError, Result};
use crate::geometry::Matrix;
use crate::render_group::{DrawMode, GlState, RenderGroup, Vertex};

/// Device-space stroke parameters resolved for one build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub caps: CapsStyle,
    pub joints: JointStyle,
    pub miter_limit: f32,
}

pub trait Tessellator {
    fn begin_polygon(&mut self);
    /// Close the polygon, appending whatever render groups it produced.
    fn end_polygon(&mut self, render_groups: &mut Vec<RenderGroup>);
    fn begin_contour(&mut self);
    fn add_point(&mut self, vertex: &Vertex);
    fn end_contour(&mut self);

    fn set_winding_rule(&mut self, rule: WindingRule);
    fn set_user_data(&mut self, user_data: Option<UserData>);

    /// Style used to color vertices the tessellator creates.
    fn gl_data(&self) -> Option<&Fill>;
    fn set_gl_data(&mut self, fill: Option<Fill>);
    fn inv_matrix(&self) -> Matrix;
    fn set_inv_matrix(&mut self, matrix: Matrix);

    /// Stroke parameters for outline tessellators. Fill tessellators ignore it.
    fn set_stroke_style(&mut self, _style: Option<StrokeStyle>) {}
}

/// Per-polygon bookkeeping shared by the lyon-backed tessellators.
#[derive(Debug, Default)]
struct PolygonState {
    contours: Vec<Vec<Vertex>>,
    open: Option<Vec<Vertex>>,
    winding: WindingRule,
    user_data: Option<UserData>,
    fill: Option<Fill>,
    inv_matrix: Matrix,
}

impl PolygonState {
    fn begin_polygon(&mut self) {
        self.contours.clear();
        self.open = None;
    }

    fn begin_contour(&mut self) {
        self.end_contour();
        self.open = Some(Vec::new());
    }

    fn add_point(&mut self, vertex: &Vertex) {
        if let Some(open) = self.open.as_mut() {
            open.push(*vertex);
        }
    }

    fn end_contour(&mut self) {
        if let Some(contour) = self.open.take() {
            self.contours.push(contour);
        }
    }

    fn take_contours(&mut self) -> Vec<Vec<Vertex>> {
        self.end_contour();
        std::mem::take(&mut self.contours)
    }

    fn style(&self, position: lyon_geom::Point<f32>) -> Vertex {
        Vertex::styled(position.into(), self.fill.as_ref(), &self.inv_matrix)
    }

    /// Turn indexed lyon output into a flat triangle-list group.
    fn render_group(&self, geometry: VertexBuffers<Vertex, u32>, is_stroke: bool) -> Option<RenderGroup> {
        if geometry.indices.is_empty() {
            return None;
        }
        let mut group = RenderGroup::new(DrawMode::Triangles);
        group.vertices = geometry
            .indices
            .iter()
            .map(|&i| geometry.vertices[i as usize])
            .collect();
        group.gl_data = GlState::for_fill(self.fill.as_ref());
        group.is_stroke = is_stroke;
        group.user_data = self.user_data;
        Some(group)
    }
}

macro_rules! delegate_polygon_state {
    () => {
        fn begin_contour(&mut self) {
            self.state.begin_contour();
        }
        fn add_point(&mut self, vertex: &Vertex) {
            self.state.add_point(vertex);
        }
        fn end_contour(&mut self) {
            self.state.end_contour();
        }
        fn set_winding_rule(&mut self, rule: WindingRule) {
            self.state.winding = rule;
        }
        fn set_user_data(&mut self, user_data: Option<UserData>) {
            self.state.user_data = user_data;
        }
        fn gl_data(&self) -> Option<&Fill> {
            self.state.fill.as_ref()
        }
        fn set_gl_data(&mut self, fill: Option<Fill>) {
            self.state.fill = fill;
        }
        fn inv_matrix(&self) -> Matrix {
            self.state.inv_matrix
        }
        fn set_inv_matrix(&mut self, matrix: Matrix) {
            self.state.inv_matrix = matrix;
        }
    };
}

/// Interior fill tessellation honouring the winding rule.
pub struct FillTessellator {
    state: PolygonState,
    tolerance: f32,
    inner: lyon_tessellation::FillTessellator,
}

impl FillTessellator {
    pub fn new(tolerance: f32) -> Self {
        Self { state: PolygonState::default(), tolerance, inner: lyon_tessellation::FillTessellator::new() }
    }

    fn tessellate(&mut self, contours: &[Vec<Vertex>]) -> Result<VertexBuffers<Vertex, u32>> {
        let mut builder = LyonPath::builder();
        let mut any = false;
        for contour in contours.iter().filter(|c| c.len() >= 3) {
            builder.begin(point(contour[0].pos[0], contour[0].pos[1]));
            for v in &contour[1..] {
                builder.line_to(point(v.pos[0], v.pos[1]));
            }
            builder.end(true);
            any = true;
        }
        let mut geometry: VertexBuffers<Vertex, u32> = VertexBuffers::new();
        if !any {
            return Ok(geometry);
        }
        let path = builder.build();

        let base_opts = FillOptions::default().with_tolerance(self.tolerance);
        let options = match self.state.winding {
            WindingRule::NonZero => base_opts.with_fill_rule(lyon_tessellation::FillRule::NonZero),
            WindingRule::EvenOdd => base_opts.with_fill_rule(lyon_tessellation::FillRule::EvenOdd),
        };
        let state = &self.state;
        self.inner
            .tessellate_path(
                path.as_slice(),
                &options,
                &mut BuffersBuilder::new(&mut geometry, |fv: FillVertex| state.style(fv.position())),
            )
            .map_err(|e| InkError::Tessellation(format!("{e:?}")))?;
        Ok(geometry)
    }
}

impl Default for FillTessellator {
    fn default() -> Self {
        Self::new(TessellationConfig::default().tolerance)
    }
}

impl Tessellator for FillTessellator {
    fn begin_polygon(&mut self) {
        self.state.begin_polygon();
    }

    fn end_polygon(&mut self, render_groups: &mut Vec<RenderGroup>) {
        let contours = self.state.take_contours();
        match self.tessellate(&contours) {
            Ok(geometry) => render_groups.extend(self.state.render_group(geometry, false)),
            Err(e) => log::warn!("dropping fill polygon: {e}"),
        }
    }

    delegate_polygon_state!();
}

/// Outline tessellation of each contour at the configured stroke width.
pub struct StrokeTessellator {
    state: PolygonState,
    tolerance: f32,
    style: Option<StrokeStyle>,
    inner: lyon_tessellation::StrokeTessellator,
}

impl StrokeTessellator {
    pub fn new(tolerance: f32) -> Self {
        Self {
            state: PolygonState::default(),
            tolerance,
            style: None,
            inner: lyon_tessellation::StrokeTessellator::new(),
        }
    }

    fn options(&self, style: &StrokeStyle) -> StrokeOptions {
        let cap = match style.caps {
            CapsStyle::None => LineCap::Butt,
            CapsStyle::Round => LineCap::Round,
            CapsStyle::Square => LineCap::Square,
        };
        let join = match style.joints {
            JointStyle::Bevel => LineJoin::Bevel,
            JointStyle::Miter => LineJoin::Miter,
            JointStyle::Round => LineJoin::Round,
        };
        StrokeOptions::default()
            .with_line_width(style.width.max(0.0))
            .with_tolerance(self.tolerance)
            .with_line_join(join)
            .with_start_cap(cap)
            .with_end_cap(cap)
            // lyon rejects limits below 1.
            .with_miter_limit(style.miter_limit.max(1.0))
    }

    fn tessellate(&mut self, contours: &[Vec<Vertex>], style: &StrokeStyle) -> Result<VertexBuffers<Vertex, u32>> {
        let mut builder = LyonPath::builder();
        let mut any = false;
        for contour in contours.iter().filter(|c| c.len() >= 2) {
            let first = contour[0].pos;
            let last = contour[contour.len() - 1].pos;
            // A contour that returns to its start is drawn with a join there, not two caps.
            let closed = contour.len() > 2 && first == last;
            let body = if closed { &contour[1..contour.len() - 1] } else { &contour[1..] };
            builder.begin(point(first[0], first[1]));
            for v in body {
                builder.line_to(point(v.pos[0], v.pos[1]));
            }
            builder.end(closed);
            any = true;
        }
        let mut geometry: VertexBuffers<Vertex, u32> = VertexBuffers::new();
        if !any {
            return Ok(geometry);
        }
        let path = builder.build();
        let options = self.options(style);
        let state = &self.state;
        self.inner
            .tessellate_path(
                path.as_slice(),
                &options,
                &mut BuffersBuilder::new(&mut geometry, |sv: StrokeVertex| state.style(sv.position())),
            )
            .map_err(|e| InkError::Tessellation(format!("{e:?}")))?;
        Ok(geometry)
    }
}

impl Default for StrokeTessellator {
    fn default() -> Self {
        Self::new(TessellationConfig::default().tolerance)
    }
}

impl Tessellator for StrokeTessellator {
    fn begin_polygon(&mut self) {
        self.state.begin_polygon();
    }

    fn end_polygon(&mut self, render_groups: &mut Vec<RenderGroup>) {
        let contours = self.state.take_contours();
        let Some(style) = self.style else {
            return;
        };
        match self.tessellate(&contours, &style) {
            Ok(geometry) => render_groups.extend(self.state.render_group(geometry, true)),
            Err(e) => log::warn!("dropping stroke polygon: {e}"),
        }
    }

    fn set_stroke_style(&mut self, style: Option<StrokeStyle>) {
        self.style = style;
    }

    delegate_polygon_state!();
}

/// The pair of tessellators a build threads its generators through.
///
/// Single-owner and not thread-safe: hold one per thread that builds canvases.
pub struct TessellatorContext {
    pub fill: Box<dyn Tessellator>,
    pub stroke: Box<dyn Tessellator>,
}

impl TessellatorContext {
    pub fn new(fill: Box<dyn Tessellator>, stroke: Box<dyn Tessellator>) -> Self {
        Self { fill, stroke }
    }

    pub fn from_config(config: &TessellationConfig) -> Self {
        Self::new(
            Box::new(FillTessellator::new(config.tolerance)),
            Box::new(StrokeTessellator::new(config.tolerance)),
        )
    }

    /// Reset shared configuration so each build starts from the same state.
    pub(crate) fn reset(&mut self) {
        for tess in [&mut *self.fill, &mut *self.stroke] {
            tess.set_winding_rule(WindingRule::default());
            tess.set_user_data(None);
        }
    }
}

impl Default for TessellatorContext {
    fn default() -> Self {
        Self::from_config(&TessellationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SolidFill;
    use crate::geometry::Point;

    fn feed(tess: &mut dyn Tessellator, points: &[(f32, f32)]) {
        tess.begin_contour();
        for &(x, y) in points {
            tess.add_point(&Vertex { pos: [x, y], ..Vertex::default() });
        }
        tess.end_contour();
    }

    #[test]
    fn square_fills_two_triangles() {
        let mut tess = FillTessellator::default();
        tess.set_gl_data(Some(Fill::Solid(SolidFill::new(0x00FF00, 1.0))));
        tess.begin_polygon();
        feed(&mut tess, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.draw_mode, DrawMode::Triangles);
        assert_eq!(group.vertex_count(), 6);
        assert!(!group.is_stroke);
        assert!(group.vertices.iter().all(|v| v.color.g == 255 && v.color.a == 255));
    }

    #[test]
    fn even_odd_leaves_a_hole() {
        let mut tess = FillTessellator::default();
        tess.set_winding_rule(WindingRule::EvenOdd);
        tess.begin_polygon();
        feed(&mut tess, &[(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (0.0, 30.0)]);
        feed(&mut tess, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)]);
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert_eq!(groups.len(), 1);
        let hit = crate::hit_test::group_contains_point(&groups[0], Point::new(15.0, 15.0));
        assert!(!hit);
        assert!(crate::hit_test::group_contains_point(&groups[0], Point::new(5.0, 5.0)));
    }

    #[test]
    fn degenerate_contours_produce_nothing() {
        let mut tess = FillTessellator::default();
        tess.begin_polygon();
        feed(&mut tess, &[(0.0, 0.0), (10.0, 0.0)]);
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert!(groups.is_empty());
    }

    #[test]
    fn stroke_without_style_is_skipped() {
        let mut tess = StrokeTessellator::default();
        tess.begin_polygon();
        feed(&mut tess, &[(0.0, 0.0), (10.0, 0.0)]);
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert!(groups.is_empty());
    }

    #[test]
    fn stroke_outline_spans_line_width() {
        let mut tess = StrokeTessellator::default();
        tess.set_stroke_style(Some(StrokeStyle {
            width: 4.0,
            caps: CapsStyle::None,
            joints: JointStyle::Miter,
            miter_limit: 3.0,
        }));
        tess.set_user_data(Some(UserData(9)));
        tess.begin_polygon();
        feed(&mut tess, &[(0.0, 0.0), (10.0, 0.0)]);
        let mut groups = Vec::new();
        tess.end_polygon(&mut groups);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert!(group.is_stroke);
        assert_eq!(group.user_data, Some(UserData(9)));
        let (min_y, max_y) = group
            .vertices
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.pos[1]), hi.max(v.pos[1])));
        assert!((min_y + 2.0).abs() < 1e-3);
        assert!((max_y - 2.0).abs() < 1e-3);
    }
}
