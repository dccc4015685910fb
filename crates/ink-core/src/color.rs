use bytemuck::{Pod, Zeroable};
use palette::{Srgb, Srgba};

/// Quantized premultiplied RGBA, laid out the way the color array is submitted.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a packed `0xRRGGBB` color and a float alpha, premultiplying.
    pub fn from_packed_rgb(color: u32, alpha: f32) -> Self {
        let rgb: Srgb<f32> = Srgb::new((color >> 16) as u8, (color >> 8) as u8, color as u8).into_format();
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        let pre: Srgba<u8> = Srgba::new(rgb.red * a, rgb.green * a, rgb.blue * a, a).into_format();
        Self { r: pre.red, g: pre.green, b: pre.blue, a: pre.alpha }
    }

    /// Multiply each channel by its factor, clamping factors to [0, 1].
    pub fn multiply(self, red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        fn scale(channel: u8, factor: f32) -> u8 {
            let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
            (channel as f32 * factor).round() as u8
        }
        Self {
            r: scale(self.r, red),
            g: scale(self.g, green),
            b: scale(self.b, blue),
            a: scale(self.a, alpha),
        }
    }

    /// Scale opacity. Color channels follow alpha to stay premultiplied.
    pub fn fade(self, alpha: f32) -> Self {
        self.multiply(alpha, alpha, alpha, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_rgb_opaque() {
        assert_eq!(Color::from_packed_rgb(0xFF8000, 1.0), Color::rgba(255, 128, 0, 255));
    }

    #[test]
    fn packed_rgb_premultiplies() {
        let c = Color::from_packed_rgb(0xFFFFFF, 0.5);
        assert_eq!(c.a, 128);
        assert_eq!(c.r, 128);
    }

    #[test]
    fn fade_scales_every_channel() {
        let c = Color::rgba(200, 100, 50, 200).fade(0.5);
        assert_eq!(c, Color::rgba(100, 50, 25, 100));
    }
}
