//! ink-core: path recording, tessellation, drawing and hit testing for 2D
//! vector graphics.
//!
//! A [`Canvas`] records drawing commands. [`Canvas::build`] replays them
//! through fill and stroke generators into [`RenderGroup`]s, which can then be
//! drawn through a [`Renderer`] or hit tested.

mod build;
mod canvas;
mod color;
mod command;
mod curve;
mod draw;
mod error;
mod generator;
mod geometry;
mod render_group;
mod renderer;
mod tessellator;

pub use build::{fade_factor, resolve_thickness};
pub use canvas::{Canvas, UNBOUNDED_LENGTH};
pub use color::Color;
pub use command::{
    BitmapFill, CapsStyle, Command, Fill, GradientFill, GradientType, InterpolationMethod,
    JointStyle, LineScaleMode, LineStyle, SolidFill, SpreadMethod, Stroke, TextureRef, UserData,
    WindingRule,
};
pub use curve::{Curve, MIN_SEGMENTS};
pub use draw::draw;
pub use error::{InkError, Result};
pub use generator::{FillGenerator, Generator, StrokeGenerator};
pub use geometry::{EPSILON, Line, Matrix, Point, Rect, Size, Triangle};
pub use hit_test::{contains_point, group_contains_point};
pub use render_group::{DrawMode, DrawType, GlState, RenderGroup, Vertex};
pub use renderer::{
    ArrayPointer, Capability, ClientArray, ComponentType, GL_CLAMP_TO_EDGE, GL_LINEAR, GL_NEAREST,
    GL_REPEAT, Renderer, StateQuery, TexParam,
};
pub use tessellator::{FillTessellator, StrokeStyle, StrokeTessellator, Tessellator, TessellatorContext};

pub use ink_config::{CanvasConfig, IncompleteDrawStrategy, InkConfig, TessellationConfig};
