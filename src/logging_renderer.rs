use std::collections::{HashMap, HashSet};

use ink_core::{
    ArrayPointer, Capability, ClientArray, DrawMode, GL_LINEAR, GL_REPEAT, Renderer, StateQuery,
    TexParam,
};

/// Renderer that keeps fixed-function state in memory and logs every call.
#[derive(Default)]
pub struct LoggingRenderer {
    enabled: HashSet<Capability>,
    client: HashSet<ClientArray>,
    bound: u32,
    tex_params: HashMap<(u32, TexParam), i32>,
    point_size: f32,
    line_width: f32,
    pub calls: usize,
}

impl LoggingRenderer {
    pub fn new() -> Self {
        Self { point_size: 1.0, line_width: 1.0, ..Self::default() }
    }

    fn record(&mut self, call: std::fmt::Arguments<'_>) {
        self.calls += 1;
        log::info!("gl: {call}");
    }
}

impl Renderer for LoggingRenderer {
    fn enable(&mut self, cap: Capability) {
        self.record(format_args!("enable {cap:?}"));
        self.enabled.insert(cap);
    }

    fn disable(&mut self, cap: Capability) {
        self.record(format_args!("disable {cap:?}"));
        self.enabled.remove(&cap);
    }

    fn is_enabled(&self, cap: Capability) -> bool {
        self.enabled.contains(&cap)
    }

    fn enable_client(&mut self, array: ClientArray) {
        self.record(format_args!("enable client {array:?}"));
        self.client.insert(array);
    }

    fn disable_client(&mut self, array: ClientArray) {
        self.record(format_args!("disable client {array:?}"));
        self.client.remove(&array);
    }

    fn get_boolean(&self, query: StateQuery) -> bool {
        self.get_integer(query) != 0
    }

    fn get_float(&self, query: StateQuery) -> f32 {
        match query {
            StateQuery::TextureBinding2D => self.bound as f32,
            StateQuery::PointSize => self.point_size,
            StateQuery::LineWidth => self.line_width,
        }
    }

    fn get_integer(&self, query: StateQuery) -> i32 {
        match query {
            StateQuery::TextureBinding2D => self.bound as i32,
            other => self.get_float(other) as i32,
        }
    }

    fn bind_texture(&mut self, name: u32) {
        self.record(format_args!("bind texture {name}"));
        self.bound = name;
    }

    fn tex_parameter(&self, param: TexParam) -> i32 {
        self.tex_params.get(&(self.bound, param)).copied().unwrap_or(match param {
            TexParam::MagFilter | TexParam::MinFilter => GL_LINEAR,
            TexParam::WrapS | TexParam::WrapT => GL_REPEAT,
        })
    }

    fn set_tex_parameter(&mut self, param: TexParam, value: i32) {
        self.record(format_args!("tex parameter {param:?} = {value:#x}"));
        self.tex_params.insert((self.bound, param), value);
    }

    fn vertex_pointer(&mut self, pointer: ArrayPointer<'_>) {
        self.record(format_args!("vertex pointer stride {} ({} bytes)", pointer.stride, pointer.data.len()));
    }

    fn tex_coord_pointer(&mut self, pointer: ArrayPointer<'_>) {
        self.record(format_args!("tex coord pointer stride {}", pointer.stride));
    }

    fn color_pointer(&mut self, pointer: ArrayPointer<'_>) {
        self.record(format_args!("color pointer stride {}", pointer.stride));
    }

    fn draw_arrays(&mut self, mode: DrawMode, first: usize, count: usize) {
        self.record(format_args!("draw arrays {mode:?} first {first} count {count}"));
    }

    fn draw_elements(&mut self, mode: DrawMode, indices: &[u16]) {
        self.record(format_args!("draw elements {mode:?} count {}", indices.len()));
    }

    fn set_point_size(&mut self, size: f32) {
        self.record(format_args!("point size {size}"));
        self.point_size = size;
    }

    fn set_line_width(&mut self, width: f32) {
        self.record(format_args!("line width {width}"));
        self.line_width = width;
    }
}
