use std::mem::{offset_of, size_of};

use crate::render_group::{DrawType, GlState, RenderGroup, Vertex};
use crate::renderer::{
    ArrayPointer, Capability, ClientArray, ComponentType, Renderer, StateQuery, TexParam,
};

const TEX_PARAMS: [TexParam; 4] = [TexParam::MagFilter, TexParam::MinFilter, TexParam::WrapS, TexParam::WrapT];

fn tex_param_value(state: &GlState, param: TexParam) -> i32 {
    match param {
        TexParam::MagFilter => state.mag_filter,
        TexParam::MinFilter => state.min_filter,
        TexParam::WrapS => state.wrap_s,
        TexParam::WrapT => state.wrap_t,
    }
}

fn tex_param_slot(state: &mut GlState, param: TexParam) -> &mut i32 {
    match param {
        TexParam::MagFilter => &mut state.mag_filter,
        TexParam::MinFilter => &mut state.min_filter,
        TexParam::WrapS => &mut state.wrap_s,
        TexParam::WrapT => &mut state.wrap_t,
    }
}

fn read_tex_params(renderer: &dyn Renderer, state: &mut GlState) {
    for param in TEX_PARAMS {
        *tex_param_slot(state, param) = renderer.tex_parameter(param);
    }
}

/// Move the renderer from `current` to `next`, issuing only the calls whose
/// state actually differs.
///
/// `orig` holds the parameters the bound texture had before we touched it, so
/// they can be put back when that texture is unbound.
fn compare_and_set_states(renderer: &mut dyn Renderer, orig: &mut GlState, current: &mut GlState, next: &GlState) {
    if current.point_size != next.point_size {
        renderer.set_point_size(next.point_size);
    }
    if current.line_width != next.line_width {
        renderer.set_line_width(next.line_width);
    }

    if current.texture_name != next.texture_name {
        if current.texture_name != 0 {
            for param in TEX_PARAMS {
                let value = tex_param_value(current, param);
                if tex_param_value(orig, param) != value {
                    renderer.set_tex_parameter(param, tex_param_value(orig, param));
                }
            }
        }

        if next.texture_name != 0 {
            renderer.disable_client(ClientArray::Color);
            renderer.enable_client(ClientArray::TextureCoord);
            renderer.enable(Capability::Texture2D);
            renderer.bind_texture(next.texture_name);

            read_tex_params(renderer, orig);
            for param in TEX_PARAMS {
                let wanted = tex_param_value(next, param);
                if tex_param_value(orig, param) != wanted {
                    renderer.set_tex_parameter(param, wanted);
                }
            }
        } else {
            renderer.disable(Capability::Texture2D);
            renderer.enable_client(ClientArray::Color);
            renderer.disable_client(ClientArray::TextureCoord);
        }
    }

    *current = *next;
}

fn submit_pointers(renderer: &mut dyn Renderer, vertices: &[Vertex]) {
    let bytes: &[u8] = bytemuck::cast_slice(vertices);
    let stride = size_of::<Vertex>();
    renderer.vertex_pointer(ArrayPointer {
        components: 2,
        ty: ComponentType::Float,
        stride,
        data: &bytes[offset_of!(Vertex, pos)..],
    });
    renderer.tex_coord_pointer(ArrayPointer {
        components: 2,
        ty: ComponentType::Float,
        stride,
        data: &bytes[offset_of!(Vertex, tex)..],
    });
    renderer.color_pointer(ArrayPointer {
        components: 4,
        ty: ComponentType::UnsignedByte,
        stride,
        data: &bytes[offset_of!(Vertex, color)..],
    });
}

/// Draw every render group through `renderer`, returning the number of
/// vertices submitted. Texture binding, texture parameters, point size and
/// line width are restored to their entry values before returning.
pub fn draw(groups: &[RenderGroup], renderer: &mut dyn Renderer) -> usize {
    let mut started = GlState { texture_name: 0, ..GlState::default() };

    if renderer.is_enabled(Capability::Texture2D) {
        started.texture_name = renderer.get_integer(StateQuery::TextureBinding2D).max(0) as u32;
    }

    if started.texture_name != 0 {
        read_tex_params(renderer, &mut started);
        renderer.disable_client(ClientArray::Color);
        renderer.enable_client(ClientArray::TextureCoord);
        renderer.enable(Capability::Texture2D);
    } else {
        renderer.disable(Capability::Texture2D);
        renderer.enable_client(ClientArray::Color);
        renderer.disable_client(ClientArray::TextureCoord);
    }

    started.point_size = renderer.get_float(StateQuery::PointSize);
    started.line_width = renderer.get_float(StateQuery::LineWidth);

    let mut previous = started;
    let mut orig = started;
    let mut total = 0;

    for group in groups {
        if group.vertices.is_empty() {
            continue;
        }

        compare_and_set_states(renderer, &mut orig, &mut previous, &group.gl_data);

        total += group.vertices.len();
        submit_pointers(renderer, &group.vertices);

        match group.draw_type {
            DrawType::Arrays => renderer.draw_arrays(group.draw_mode, 0, group.vertices.len()),
            DrawType::Elements => {
                if !group.indices.is_empty() {
                    renderer.draw_elements(group.draw_mode, &group.indices);
                }
            }
        }
    }

    compare_and_set_states(renderer, &mut orig, &mut previous, &started);

    total
}
