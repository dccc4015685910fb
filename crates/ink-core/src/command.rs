//! The recorded drawing log and the style descriptors it carries.

use crate::geometry::{Matrix, Point};

/// Texture handed to bitmap fills. Decoding and upload happen elsewhere; the
/// pipeline only needs the GPU name and the pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureRef {
    pub name: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidFill {
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub alpha: f32,
}

impl SolidFill {
    pub const fn new(color: u32, alpha: f32) -> Self {
        Self { color, alpha }
    }
}

impl Default for SolidFill {
    fn default() -> Self {
        Self { color: 0x000000, alpha: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitmapFill {
    pub texture: TextureRef,
    /// Maps content-space positions into bitmap pixel space.
    pub matrix: Matrix,
    pub repeat: bool,
    pub smooth: bool,
}

impl BitmapFill {
    pub fn new(texture: TextureRef, matrix: Matrix, repeat: bool, smooth: bool) -> Self {
        Self { texture, matrix, repeat, smooth }
    }

    /// `(1 / width, 1 / height)`, zero for an empty texture.
    pub fn reciprocal_size(&self) -> (f32, f32) {
        let recip = |v: u32| if v == 0 { 0.0 } else { 1.0 / v as f32 };
        (recip(self.texture.width), recip(self.texture.height))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpolationMethod {
    #[default]
    Rgb,
    LinearRgb,
}

/// Recorded but not rendered: gradient vertices carry no color or UV yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientFill {
    pub kind: GradientType,
    pub colors: Vec<u32>,
    pub alphas: Vec<f32>,
    pub ratios: Vec<f32>,
    pub matrix: Matrix,
    pub spread: SpreadMethod,
    pub interpolation: InterpolationMethod,
    pub focal_point_ratio: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    Solid(SolidFill),
    Bitmap(BitmapFill),
    Gradient(GradientFill),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineScaleMode {
    None,
    /// Thickness follows the vertical scale only.
    Horizontal,
    /// Thickness follows the horizontal scale only.
    Vertical,
    #[default]
    Normal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapsStyle {
    None,
    #[default]
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JointStyle {
    Bevel,
    Miter,
    #[default]
    Round,
}

/// Stroke as authored. The device thickness is resolved per build from the
/// canvas matrix; `thickness` itself is never rewritten.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub thickness: f32,
    pub pixel_hinting: bool,
    pub scale_mode: LineScaleMode,
    pub caps: CapsStyle,
    pub joints: JointStyle,
    pub miter_limit: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            pixel_hinting: false,
            scale_mode: LineScaleMode::Normal,
            caps: CapsStyle::Round,
            joints: JointStyle::Round,
            miter_limit: 3.0,
        }
    }
}

impl Stroke {
    pub fn with_thickness(thickness: f32) -> Self {
        Self { thickness, ..Self::default() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub stroke: Stroke,
    pub fill: SolidFill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindingRule {
    EvenOdd,
    #[default]
    NonZero,
}

/// Opaque tag copied onto every render group tessellated after it was set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserData(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    MoveTo(Point),
    LineTo(Point),
    QuadraticCurveTo { control: Point, anchor: Point },
    CubicCurveTo { control_a: Point, control_b: Point, anchor: Point },
    SolidFill(SolidFill),
    BitmapFill(BitmapFill),
    GradientFill(GradientFill),
    /// `None` turns stroking off.
    LineStyle(Option<LineStyle>),
    LineBitmap(BitmapFill),
    LineGradient(GradientFill),
    Winding(WindingRule),
    UserData(UserData),
    EndFill,
}
