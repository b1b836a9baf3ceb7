//! Generation of the word cloud canvas.
//!
//! [`Generator`] is the seam between configuration and rendering. The
//! built-in [`BlockLayout`] places each word as a solid block with the
//! footprint the word would have at its font size. It does not rasterize
//! glyphs.

use std::cmp::Reverse;
use std::fs::File;

use image::{DynamicImage, Rgba, RgbaImage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::color::{parse_color, Orientation, PixelGrid, Placement};
use crate::config::{InputSource, ResolvedConfiguration};
use crate::error::{WordcloudError, WordcloudResult};
use crate::raster::Canvas;
use crate::text::{count_words, default_stopwords};

const MAX_WORDS: usize = 200;
const MIN_FONT_SIZE: u32 = 4;
/// Font sizes shrink by this fraction of their value until a word fits.
const SHRINK_NUMERATOR: u32 = 4;
const SHRINK_DENOMINATOR: u32 = 5;
/// Average glyph advance as a fraction of the font size.
const GLYPH_ASPECT: f32 = 0.6;

pub trait Generator {
    fn generate(&mut self, config: &ResolvedConfiguration) -> WordcloudResult<Canvas>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorMode {
    Rgb,
    Rgba,
}

impl ColorMode {
    fn parse(raw: &str) -> WordcloudResult<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "RGB" => Ok(Self::Rgb),
            "RGBA" => Ok(Self::Rgba),
            _ => Err(WordcloudError::UnsupportedColorMode(raw.to_string())),
        }
    }
}

pub struct BlockLayout<R = SmallRng> {
    rng: R,
}

impl BlockLayout<SmallRng> {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl Default for BlockLayout<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> BlockLayout<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Generator for BlockLayout<R> {
    fn generate(&mut self, config: &ResolvedConfiguration) -> WordcloudResult<Canvas> {
        let mode = ColorMode::parse(&config.color_mode)?;
        let background = parse_color(&config.background_color)?;
        if let Some(path) = &config.font_path {
            File::open(path).map_err(|source| WordcloudError::Open {
                path: path.clone(),
                source,
            })?;
        }

        let words = ranked_words(config);
        let (width, height) = match &config.mask {
            Some(mask) => mask.dimensions(),
            None => (config.dimensions.width, config.dimensions.height),
        };

        let mut image = RgbaImage::from_pixel(width, height, background);
        let mut occupancy = Occupancy::new(width, height, config.mask.as_ref());
        let margin = config.dimensions.margin;
        let largest = ((u64::from(height) * 2 / 5) as u32).max(MIN_FONT_SIZE);
        let max_count = words.first().map_or(1, |(_, count)| *count) as f32;
        let mut ceiling = largest;
        let mut placed = 0usize;

        for (word, count) in &words {
            let frequency = *count as f32 / max_count;
            let scale = config.relative_scaling * frequency
                + (1.0 - config.relative_scaling) * frequency.sqrt();
            let mut font_size =
                ((largest as f32 * scale).round() as u32).clamp(MIN_FONT_SIZE, ceiling);

            let placement = loop {
                if let Some(found) = occupancy.find_slot(word, font_size, margin, &mut self.rng) {
                    break Some(found);
                }
                if font_size <= MIN_FONT_SIZE {
                    break None;
                }
                font_size =
                    (font_size * SHRINK_NUMERATOR / SHRINK_DENOMINATOR).max(MIN_FONT_SIZE);
            };

            let Some(placement) = placement else {
                debug!(word = %word, "canvas full at minimum font size");
                break;
            };

            let color = config
                .color_function
                .color_for(word, &placement, &mut self.rng)?;
            fill(&mut image, &placement, color);
            occupancy.claim(&placement, margin);
            ceiling = font_size;
            placed += 1;
        }

        debug!(placed, candidates = words.len(), width, height, "laid out words");

        Ok(match mode {
            ColorMode::Rgba => Canvas::Rgba(image),
            ColorMode::Rgb => Canvas::Rgb(DynamicImage::ImageRgba8(image).to_rgb8()),
        })
    }
}

/// Highest counts first, ties broken alphabetically, capped at [`MAX_WORDS`].
fn ranked_words(config: &ResolvedConfiguration) -> Vec<(String, u64)> {
    let mut words: Vec<(String, u64)> = match &config.input {
        InputSource::Frequencies(frequencies) => frequencies
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect(),
        InputSource::Text(text) => {
            let stopwords = config.stopwords.clone().unwrap_or_else(default_stopwords);
            count_words(text, &stopwords, config.collocations)
                .into_iter()
                .collect()
        }
    };

    words.retain(|(word, count)| *count > 0 && !word.is_empty());
    words.sort_by(|(a_word, a_count), (b_word, b_count)| {
        (Reverse(a_count), a_word).cmp(&(Reverse(b_count), b_word))
    });
    words.truncate(MAX_WORDS);
    words
}

fn block_extent(word: &str, font_size: u32) -> (u32, u32) {
    let chars = word.chars().count().max(1) as f32;
    let width = (chars * font_size as f32 * GLYPH_ASPECT).ceil() as u32;
    (width.max(1), font_size)
}

/// Block size including the margin on every side, or `None` if it overflows.
fn padded(width: u32, height: u32, margin: u32) -> Option<(u32, u32)> {
    let both_sides = margin.checked_mul(2)?;
    Some((
        width.checked_add(both_sides)?,
        height.checked_add(both_sides)?,
    ))
}

fn fill(image: &mut RgbaImage, placement: &Placement, color: Rgba<u8>) {
    let x_end = (placement.x + placement.width).min(image.width());
    let y_end = (placement.y + placement.height).min(image.height());
    for y in placement.y..y_end {
        for x in placement.x..x_end {
            image.put_pixel(x, y, color);
        }
    }
}

/// Free/used bookkeeping over the canvas, queried through a summed-area table.
struct Occupancy {
    width: u32,
    height: u32,
    used: Vec<bool>,
    integral: Vec<u64>,
}

impl Occupancy {
    /// Pure white mask pixels are unavailable for placement.
    fn new(width: u32, height: u32, mask: Option<&PixelGrid>) -> Self {
        let mut used = vec![false; (width as usize) * (height as usize)];
        if let Some(mask) = mask {
            for (x, y, pixel) in mask.enumerate_pixels() {
                let [r, g, b, _] = pixel.0;
                if r == 255 && g == 255 && b == 255 {
                    used[(y as usize) * (width as usize) + x as usize] = true;
                }
            }
        }

        let mut occupancy = Self {
            width,
            height,
            used,
            integral: Vec::new(),
        };
        occupancy.rebuild();
        occupancy
    }

    fn rebuild(&mut self) {
        let stride = self.width as usize + 1;
        let mut integral = vec![0u64; stride * (self.height as usize + 1)];
        for y in 0..self.height as usize {
            let mut row = 0u64;
            for x in 0..self.width as usize {
                row += u64::from(self.used[y * self.width as usize + x]);
                integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row;
            }
        }
        self.integral = integral;
    }

    fn used_in(&self, x: u32, y: u32, width: u32, height: u32) -> u64 {
        let stride = self.width as usize + 1;
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + width as usize, y0 + height as usize);
        self.integral[y1 * stride + x1] + self.integral[y0 * stride + x0]
            - self.integral[y0 * stride + x1]
            - self.integral[y1 * stride + x0]
    }

    /// Picks a random free slot, preferring horizontal placement.
    fn find_slot<R: Rng>(
        &self,
        word: &str,
        font_size: u32,
        margin: u32,
        rng: &mut R,
    ) -> Option<Placement> {
        let (text_width, text_height) = block_extent(word, font_size);
        let step = margin.max(1) as usize;

        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let (width, height) = match orientation {
                Orientation::Horizontal => (text_width, text_height),
                Orientation::Vertical => (text_height, text_width),
            };
            let Some((outer_width, outer_height)) = padded(width, height, margin) else {
                continue;
            };
            if outer_width > self.width || outer_height > self.height {
                continue;
            }

            let mut free = Vec::new();
            for y in (0..=self.height - outer_height).step_by(step) {
                for x in (0..=self.width - outer_width).step_by(step) {
                    if self.used_in(x, y, outer_width, outer_height) == 0 {
                        free.push((x, y));
                    }
                }
            }

            if free.is_empty() {
                continue;
            }
            let (x, y) = free[rng.gen_range(0..free.len())];
            return Some(Placement {
                x: x + margin,
                y: y + margin,
                width,
                height,
                font_size,
                orientation,
            });
        }

        None
    }

    fn claim(&mut self, placement: &Placement, margin: u32) {
        let x0 = placement.x.saturating_sub(margin);
        let y0 = placement.y.saturating_sub(margin);
        let x1 = (placement.x + placement.width + margin).min(self.width);
        let y1 = (placement.y + placement.height + margin).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.used[(y as usize) * (self.width as usize) + x as usize] = true;
            }
        }
        self.rebuild();
    }
}
