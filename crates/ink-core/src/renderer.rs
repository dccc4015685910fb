//! GPU capability interface used by [`crate::draw`].
//!
//! Implementations forward to the platform binding (GL ES 1.x style fixed
//! function calls). Every required call is a trait method, so an incomplete
//! binding fails to compile instead of failing at draw time. Point-size and
//! line-width setters are optional and default to doing nothing.

use crate::render_group::DrawMode;

pub const GL_NEAREST: i32 = 0x2600;
pub const GL_LINEAR: i32 = 0x2601;
pub const GL_REPEAT: i32 = 0x2901;
pub const GL_CLAMP_TO_EDGE: i32 = 0x812F;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Texture2D,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientArray {
    Vertex,
    Color,
    TextureCoord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateQuery {
    TextureBinding2D,
    PointSize,
    LineWidth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TexParam {
    MagFilter,
    MinFilter,
    WrapS,
    WrapT,
}

/// Component type of a client array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Float,
    UnsignedByte,
}

/// Interleaved client array description. `data` starts at the attribute's
/// offset inside the first vertex; `stride` is the vertex size in bytes.
#[derive(Clone, Copy, Debug)]
pub struct ArrayPointer<'a> {
    pub components: u32,
    pub ty: ComponentType,
    pub stride: usize,
    pub data: &'a [u8],
}

pub trait Renderer {
    fn enable(&mut self, cap: Capability);
    fn disable(&mut self, cap: Capability);
    fn is_enabled(&self, cap: Capability) -> bool;

    fn enable_client(&mut self, array: ClientArray);
    fn disable_client(&mut self, array: ClientArray);

    fn get_boolean(&self, query: StateQuery) -> bool;
    fn get_float(&self, query: StateQuery) -> f32;
    fn get_integer(&self, query: StateQuery) -> i32;

    fn bind_texture(&mut self, name: u32);
    fn tex_parameter(&self, param: TexParam) -> i32;
    fn set_tex_parameter(&mut self, param: TexParam, value: i32);

    fn vertex_pointer(&mut self, pointer: ArrayPointer<'_>);
    fn tex_coord_pointer(&mut self, pointer: ArrayPointer<'_>);
    fn color_pointer(&mut self, pointer: ArrayPointer<'_>);

    fn draw_arrays(&mut self, mode: DrawMode, first: usize, count: usize);
    fn draw_elements(&mut self, mode: DrawMode, indices: &[u16]);

    fn set_point_size(&mut self, _size: f32) {}
    fn set_line_width(&mut self, _width: f32) {}
}
