use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::color::Color;
use crate::command::{Fill, UserData};
use crate::geometry::{Matrix, Point};
use crate::renderer::{GL_CLAMP_TO_EDGE, GL_LINEAR, GL_NEAREST, GL_REPEAT};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: Color,
    pub tex: [f32; 2],
}

impl Vertex {
    /// Vertex at `position` (device space) carrying the style data of `fill`.
    ///
    /// `inv_matrix` maps device space back to content space, which is where
    /// bitmap fill matrices are expressed.
    pub fn styled(position: Point, fill: Option<&Fill>, inv_matrix: &Matrix) -> Self {
        let mut vertex = Self { pos: position.into(), ..Self::default() };
        match fill {
            Some(Fill::Solid(solid)) => {
                vertex.color = Color::from_packed_rgb(solid.color, solid.alpha);
            }
            Some(Fill::Bitmap(bitmap)) => {
                let content = inv_matrix.transform_point(position);
                let texel = bitmap.matrix.transform_point(content);
                let (one_w, one_h) = bitmap.reciprocal_size();
                vertex.color = Color::WHITE;
                vertex.tex = [texel.x * one_w, texel.y * one_h];
            }
            // Gradient coloring is not supported yet.
            Some(Fill::Gradient(_)) | None => {}
        }
        vertex
    }

    pub fn position(&self) -> Point {
        self.pos.into()
    }

    /// Bit-exact identity used to merge duplicate vertices.
    fn key(&self) -> [u32; 5] {
        bytemuck::cast(*self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawType {
    #[default]
    Arrays,
    Elements,
}

/// GPU state a render group needs bound while it draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlState {
    /// Texture name, 0 for untextured geometry.
    pub texture_name: u32,
    pub mag_filter: i32,
    pub min_filter: i32,
    pub wrap_s: i32,
    pub wrap_t: i32,
    pub point_size: f32,
    pub line_width: f32,
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            texture_name: 0,
            mag_filter: GL_LINEAR,
            min_filter: GL_LINEAR,
            wrap_s: GL_CLAMP_TO_EDGE,
            wrap_t: GL_CLAMP_TO_EDGE,
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

impl GlState {
    /// State implied by a fill: bitmap fills bind their texture with the
    /// requested filtering and wrapping, everything else draws untextured.
    pub fn for_fill(fill: Option<&Fill>) -> Self {
        match fill {
            Some(Fill::Bitmap(bitmap)) => {
                let filter = if bitmap.smooth { GL_LINEAR } else { GL_NEAREST };
                let wrap = if bitmap.repeat { GL_REPEAT } else { GL_CLAMP_TO_EDGE };
                Self {
                    texture_name: bitmap.texture.name,
                    mag_filter: filter,
                    min_filter: filter,
                    wrap_s: wrap,
                    wrap_t: wrap,
                    ..Self::default()
                }
            }
            _ => Self::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderGroup {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub draw_mode: DrawMode,
    pub draw_type: DrawType,
    pub gl_data: GlState,
    pub is_stroke: bool,
    pub user_data: Option<UserData>,
}

impl RenderGroup {
    pub fn new(draw_mode: DrawMode) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            draw_mode,
            draw_type: DrawType::Arrays,
            gl_data: GlState::default(),
            is_stroke: false,
            user_data: None,
        }
    }

    pub fn push_vertex(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Scale the opacity of every vertex.
    pub fn fade(&mut self, alpha: f32) {
        for vertex in &mut self.vertices {
            vertex.color = vertex.color.fade(alpha);
        }
    }

    /// Vertices in the order the draw mode consumes them: the index list when
    /// drawn as elements, the vertex list otherwise.
    pub fn primitive_vertices(&self) -> Box<dyn Iterator<Item = &Vertex> + '_> {
        match self.draw_type {
            DrawType::Arrays => Box::new(self.vertices.iter()),
            DrawType::Elements => Box::new(
                self.indices
                    .iter()
                    .filter_map(|&i| self.vertices.get(i as usize)),
            ),
        }
    }

    /// Rewrite a flat triangle list as one triangle strip, stitching
    /// consecutive triangles with degenerate triangles. Each triangle starts on
    /// an even strip index so its winding is preserved.
    pub fn convert_to_strips(&mut self) {
        if self.draw_mode != DrawMode::Triangles || self.draw_type != DrawType::Arrays {
            return;
        }
        let mut strip: Vec<Vertex> = Vec::with_capacity(self.vertices.len() * 5 / 3 + 2);
        for tri in self.vertices.chunks_exact(3) {
            if let Some(&last) = strip.last() {
                strip.push(last);
                strip.push(tri[0]);
                if strip.len() % 2 == 1 {
                    strip.push(tri[0]);
                }
            }
            strip.extend_from_slice(tri);
        }
        self.vertices = strip;
        self.draw_mode = DrawMode::TriangleStrip;
    }

    /// Merge identical vertices and draw through a u16 index list. Groups with
    /// more unique vertices than a u16 can address stay as arrays.
    pub fn convert_to_elements(&mut self) {
        if self.draw_type == DrawType::Elements || self.vertices.is_empty() {
            return;
        }
        let mut unique: Vec<Vertex> = Vec::new();
        let mut lookup: HashMap<[u32; 5], u16> = HashMap::new();
        let mut indices: Vec<u16> = Vec::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            let index = match lookup.get(&vertex.key()) {
                Some(&index) => index,
                None => {
                    let Ok(index) = u16::try_from(unique.len()) else {
                        log::debug!(
                            "render group has more than {} unique vertices; keeping arrays",
                            u16::MAX as usize + 1
                        );
                        return;
                    };
                    lookup.insert(vertex.key(), index);
                    unique.push(*vertex);
                    index
                }
            };
            indices.push(index);
        }
        self.vertices = unique;
        self.indices = indices;
        self.draw_type = DrawType::Elements;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BitmapFill, SolidFill, TextureRef};

    fn v(x: f32, y: f32) -> Vertex {
        Vertex { pos: [x, y], ..Vertex::default() }
    }

    fn two_quads() -> RenderGroup {
        let mut group = RenderGroup::new(DrawMode::Triangles);
        for p in [v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)] {
            group.push_vertex(p);
        }
        group
    }

    #[test]
    fn strips_keep_every_triangle_on_an_even_start() {
        let mut group = two_quads();
        group.convert_to_strips();
        assert_eq!(group.draw_mode, DrawMode::TriangleStrip);
        // 3 + (last, first, first) + 3
        assert_eq!(group.vertex_count(), 9);
        assert_eq!(&group.vertices[6..9], &[v(0.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)]);
    }

    #[test]
    fn elements_deduplicate_vertices() {
        let mut group = two_quads();
        group.convert_to_strips();
        group.convert_to_elements();
        assert_eq!(group.draw_type, DrawType::Elements);
        assert_eq!(group.vertex_count(), 4);
        assert_eq!(group.indices.len(), 9);
        let replay: Vec<Vertex> = group.primitive_vertices().copied().collect();
        let mut expected = two_quads();
        expected.convert_to_strips();
        assert_eq!(replay, expected.vertices);
    }

    #[test]
    fn strips_ignore_non_triangle_groups() {
        let mut group = RenderGroup::new(DrawMode::LineStrip);
        group.push_vertex(v(0.0, 0.0));
        group.push_vertex(v(1.0, 0.0));
        group.convert_to_strips();
        assert_eq!(group.draw_mode, DrawMode::LineStrip);
        assert_eq!(group.vertex_count(), 2);
    }

    #[test]
    fn solid_vertex_is_premultiplied() {
        let fill = Fill::Solid(SolidFill::new(0xFF0000, 0.5));
        let vertex = Vertex::styled(Point::new(1.0, 2.0), Some(&fill), &Matrix::IDENTITY);
        assert_eq!(vertex.pos, [1.0, 2.0]);
        assert_eq!(vertex.color, Color::rgba(128, 0, 0, 128));
    }

    #[test]
    fn bitmap_vertex_maps_uv_through_fill_matrix() {
        let texture = TextureRef { name: 7, width: 64, height: 32 };
        let fill = Fill::Bitmap(BitmapFill::new(texture, Matrix::translation(16.0, 0.0), false, true));
        // Device space is twice the content space.
        let inv = Matrix::scaling(2.0, 2.0).invert().unwrap();
        let vertex = Vertex::styled(Point::new(32.0, 32.0), Some(&fill), &inv);
        assert_eq!(vertex.tex, [0.5, 0.5]);
        assert_eq!(GlState::for_fill(Some(&fill)).texture_name, 7);
    }
}
