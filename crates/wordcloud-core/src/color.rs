//! Word coloring strategies and color-string parsing.

use image::{Rgba, RgbaImage};
use rand::Rng;
use tracing::debug;

use crate::error::{WordcloudError, WordcloudResult};
use crate::raster::decode_grid;
use crate::stream::{open_bytes, StreamTarget};

pub type PixelGrid = RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Where and how a word was laid out on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub orientation: Orientation,
}

/// The coloring strategy requested on the command line, before any image is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorChoice {
    Fixed(String),
    Mask(StreamTarget),
    Random,
}

/// Validates the mutually exclusive color options.
pub fn choose_color(
    color: Option<String>,
    colormask: Option<StreamTarget>,
) -> WordcloudResult<ColorChoice> {
    match (color, colormask) {
        (Some(_), Some(_)) => Err(WordcloudError::ConflictingColorOptions),
        (Some(color), None) => Ok(ColorChoice::Fixed(color)),
        (None, Some(mask)) => Ok(ColorChoice::Mask(mask)),
        (None, None) => Ok(ColorChoice::Random),
    }
}

impl ColorChoice {
    /// The color mask to sample from, if this choice needs one.
    pub fn mask(&self) -> Option<&StreamTarget> {
        match self {
            Self::Mask(target) => Some(target),
            Self::Fixed(_) | Self::Random => None,
        }
    }

    /// Builds the color function, decoding the color mask if one was chosen.
    pub fn resolve(self) -> WordcloudResult<ColorFunction> {
        match self {
            Self::Fixed(color) => Ok(ColorFunction::Fixed(color)),
            Self::Mask(target) => {
                let grid = decode_grid(open_bytes(&target)?)?;
                debug!(
                    source = %target,
                    width = grid.width(),
                    height = grid.height(),
                    "decoded color mask"
                );
                Ok(ColorFunction::ImageSampled(grid))
            }
            Self::Random => Ok(ColorFunction::Random),
        }
    }
}

/// Resolves exactly one color function from the two optional inputs.
///
/// The conflict check runs before the color mask is opened.
pub fn resolve_color_function(
    color: Option<String>,
    colormask: Option<StreamTarget>,
) -> WordcloudResult<ColorFunction> {
    choose_color(color, colormask)?.resolve()
}

#[derive(Debug, Clone)]
pub enum ColorFunction {
    /// One color for every word. The string is parsed when the word is drawn.
    Fixed(String),
    /// Colors sampled from the image region under each word.
    ImageSampled(PixelGrid),
    /// A fresh random hue for every word.
    Random,
}

impl ColorFunction {
    pub fn color_for<R: Rng + ?Sized>(
        &self,
        _word: &str,
        placement: &Placement,
        rng: &mut R,
    ) -> WordcloudResult<Rgba<u8>> {
        match self {
            Self::Fixed(value) => parse_color(value),
            Self::ImageSampled(grid) => Ok(sample_region(grid, placement)),
            Self::Random => {
                let hue = rng.gen_range(0.0..360.0);
                let [r, g, b] = hsl_to_rgb(hue, 0.8, 0.5);
                Ok(Rgba([r, g, b, 255]))
            }
        }
    }
}

fn sample_region(grid: &PixelGrid, placement: &Placement) -> Rgba<u8> {
    let (width, height) = grid.dimensions();
    if width == 0 || height == 0 {
        return Rgba([0, 0, 0, 255]);
    }

    let x0 = placement.x.min(width - 1);
    let y0 = placement.y.min(height - 1);
    let x1 = placement.x.saturating_add(placement.width).clamp(x0 + 1, width);
    let y1 = placement.y.saturating_add(placement.height).clamp(y0 + 1, height);

    let mut sums = [0u64; 4];
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = grid.get_pixel(x, y);
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += u64::from(channel);
            }
            count += 1;
        }
    }

    let average = |sum: u64| (sum / count) as u8;
    Rgba([
        average(sums[0]),
        average(sums[1]),
        average(sums[2]),
        average(sums[3]),
    ])
}

/// Parses hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb(..)`, `hsl(..)`
/// and common named colors.
pub fn parse_color(value: &str) -> WordcloudResult<Rgba<u8>> {
    let normalized = value.trim().to_ascii_lowercase();
    let invalid = || WordcloudError::InvalidColor(value.to_string());

    if let Some(hex) = normalized.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }
    if let Some(args) = function_args(&normalized, "rgb") {
        return parse_rgb_function(args).ok_or_else(invalid);
    }
    if let Some(args) = function_args(&normalized, "hsl") {
        return parse_hsl_function(args).ok_or_else(invalid);
    }

    named_color(&normalized)
        .map(|[r, g, b]| Rgba([r, g, b, 255]))
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let digits: Vec<u8> = hex
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();

    match digits.as_slice() {
        [r, g, b] => Some(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Some(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Some(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => Some(Rgba([
            r1 * 16 + r2,
            g1 * 16 + g2,
            b1 * 16 + b2,
            a1 * 16 + a2,
        ])),
        _ => None,
    }
}

fn function_args<'a>(value: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let inner = value.strip_prefix(name)?.trim_start();
    let inner = inner.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

fn parse_rgb_function(args: Vec<&str>) -> Option<Rgba<u8>> {
    let [r, g, b] = args.as_slice() else {
        return None;
    };
    Some(Rgba([r.parse().ok()?, g.parse().ok()?, b.parse().ok()?, 255]))
}

fn parse_hsl_function(args: Vec<&str>) -> Option<Rgba<u8>> {
    let [h, s, l] = args.as_slice() else {
        return None;
    };
    let hue: f32 = h.parse().ok()?;
    let saturation = parse_percent(s)?;
    let lightness = parse_percent(l)?;
    let [r, g, b] = hsl_to_rgb(hue, saturation, lightness);
    Some(Rgba([r, g, b, 255]))
}

fn parse_percent(raw: &str) -> Option<f32> {
    let value: f32 = raw.strip_suffix('%')?.trim().parse().ok()?;
    (0.0..=100.0).contains(&value).then_some(value / 100.0)
}

/// `hue` in degrees, `saturation` and `lightness` in `[0, 1]`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let hue = hue.rem_euclid(360.0) / 60.0;
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let second = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
    let (r, g, b) = match hue as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

fn named_color(name: &str) -> Option<[u8; 3]> {
    let rgb = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "lime" => [0, 255, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        "gold" => [255, 215, 0],
        "indigo" => [75, 0, 130],
        "violet" => [238, 130, 238],
        "darkblue" => [0, 0, 139],
        "darkgreen" => [0, 100, 0],
        "darkred" => [139, 0, 0],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "darkgray" | "darkgrey" => [169, 169, 169],
        "steelblue" => [70, 130, 180],
        "crimson" => [220, 20, 60],
        "salmon" => [250, 128, 114],
        _ => return None,
    };
    Some(rgb)
}
