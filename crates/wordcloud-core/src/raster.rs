use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::color::PixelGrid;
use crate::error::{WordcloudError, WordcloudResult};
use crate::stream::ByteInput;

/// Decodes any supported image format into an RGBA grid.
pub fn decode_grid(input: ByteInput) -> WordcloudResult<PixelGrid> {
    let label = input.label().to_string();
    let bytes = input.read_all()?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| WordcloudError::ImageDecode { label, source })?;
    Ok(image.to_rgba8())
}

/// A rendered canvas in the color mode it should be saved with.
#[derive(Debug, Clone)]
pub enum Canvas {
    Rgb(image::RgbImage),
    Rgba(RgbaImage),
}

impl Canvas {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(image) => image.dimensions(),
            Self::Rgba(image) => image.dimensions(),
        }
    }
}

/// Writes `canvas` as PNG into `output`.
pub fn encode_png<W: Write>(canvas: &Canvas, output: W) -> WordcloudResult<()> {
    let encoder = PngEncoder::new(output);
    let (width, height) = canvas.dimensions();
    let result = match canvas {
        Canvas::Rgb(image) => {
            encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        }
        Canvas::Rgba(image) => {
            encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        }
    };
    result.map_err(WordcloudError::ImageEncode)
}
