//! The intermediate drawable surface.
//!
//! A [`Surface`] is an RGBA8 pixel buffer sized exactly to the decoded
//! image's natural dimensions. The decoded raster is taken over as-is, at the
//! origin with no scaling or cropping, then the surface is exported in the pixel
//! layout the target encoder wants.
//!
//! ## Alpha handling
//!
//! PNG and WebP keep the alpha channel. JPEG cannot store one, so every
//! pixel is composited onto opaque black first; this is what an HTML canvas
//! does on a JPEG export, so transparent regions come out black rather than
//! revealing whatever colour the transparent pixels happened to carry.

use crate::format::TargetFormat;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

/// In-memory RGBA pixel buffer.
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Surface sized to `image`'s natural dimensions holding its pixels.
    ///
    /// Takes ownership so an RGBA8 raster becomes the surface in place; other
    /// layouts are converted once.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Export the pixels in the layout `format`'s encoder accepts.
    pub fn export(self, format: TargetFormat) -> DynamicImage {
        if format.supports_alpha() {
            DynamicImage::ImageRgba8(self.pixels)
        } else {
            DynamicImage::ImageRgb8(flatten_onto_black(&self.pixels))
        }
    }
}

fn flatten_onto_black(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}
