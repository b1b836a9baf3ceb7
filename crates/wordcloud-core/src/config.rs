//! Turns command-line inputs into one validated [`ResolvedConfiguration`].
//!
//! Resolution runs in a fixed order: option validation, a readability check
//! of every named input file, input selection, background normalization,
//! stopwords, placement mask, color function and the collocations flag. A
//! missing file is therefore reported before any content is read. Each
//! resource is then read when its step runs and released as soon as its
//! content has been consumed. Any failure stops resolution before the output
//! is touched.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::color::{choose_color, ColorFunction, PixelGrid};
use crate::error::{WordcloudError, WordcloudResult};
use crate::raster::decode_grid;
use crate::stream::{
    ensure_readable, ensure_supported, open_bytes, open_text, StreamMode, StreamTarget,
};
use crate::wordlist::{parse_wordlist, Frequencies};

/// Background value that stands for a fully transparent canvas.
pub const TRANSPARENT_BACKGROUND: &str = "#ffffff00";

pub const DEFAULT_COLOR_MODE: &str = "RGB";
pub const DEFAULT_BACKGROUND: &str = "black";
pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 200;
pub const DEFAULT_MARGIN: u32 = 2;

/// Inputs exactly as supplied on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArguments {
    /// `None` reads the text from stdin.
    pub text: Option<StreamTarget>,
    pub stopwords: Option<StreamTarget>,
    pub wordlist: Option<StreamTarget>,
    pub color_mode: String,
    pub image_file: StreamTarget,
    pub font_path: Option<PathBuf>,
    pub mask: Option<StreamTarget>,
    pub color_mask: Option<StreamTarget>,
    pub relative_scaling: f32,
    pub margin: u32,
    pub width: u32,
    pub height: u32,
    pub color: Option<String>,
    pub background: String,
    pub no_collocations: bool,
}

impl Default for RawArguments {
    fn default() -> Self {
        Self {
            text: None,
            stopwords: None,
            wordlist: None,
            color_mode: DEFAULT_COLOR_MODE.to_string(),
            image_file: StreamTarget::Standard,
            font_path: None,
            mask: None,
            color_mask: None,
            relative_scaling: 0.0,
            margin: DEFAULT_MARGIN,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: None,
            background: DEFAULT_BACKGROUND.to_string(),
            no_collocations: false,
        }
    }
}

/// The words to lay out: raw text or an explicit frequency table, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    Frequencies(Frequencies),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

/// Everything the generator needs. The output target has been validated but
/// is not opened until the image is ready to be written.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub input: InputSource,
    pub stopwords: Option<HashSet<String>>,
    pub mask: Option<PixelGrid>,
    pub dimensions: Dimensions,
    pub relative_scaling: f32,
    pub background_color: String,
    pub color_function: ColorFunction,
    pub collocations: bool,
    pub color_mode: String,
    pub font_path: Option<PathBuf>,
    pub output: StreamTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSelection {
    Wordlist(StreamTarget),
    Text(StreamTarget),
}

impl InputSelection {
    fn target(&self) -> &StreamTarget {
        match self {
            Self::Wordlist(target) | Self::Text(target) => target,
        }
    }
}

/// The wordlist always wins over text. An explicit text source that loses is
/// reported and never opened.
fn select_input(text: Option<StreamTarget>, wordlist: Option<StreamTarget>) -> InputSelection {
    match (wordlist, text) {
        (Some(wordlist), Some(ignored)) => {
            warn!(
                wordlist = %wordlist,
                text = %ignored,
                "both a wordlist and a text source were given; the text source is ignored"
            );
            InputSelection::Wordlist(wordlist)
        }
        (Some(wordlist), None) => InputSelection::Wordlist(wordlist),
        (None, text) => InputSelection::Text(text.unwrap_or(StreamTarget::Standard)),
    }
}

fn load_input(selection: InputSelection) -> WordcloudResult<InputSource> {
    match selection {
        InputSelection::Wordlist(target) => {
            let frequencies = parse_wordlist(open_text(&target)?)?;
            debug!(source = %target, words = frequencies.len(), "parsed wordlist");
            Ok(InputSource::Frequencies(frequencies))
        }
        InputSelection::Text(target) => {
            let text = open_text(&target)?.read_all()?;
            debug!(source = %target, bytes = text.len(), "read text");
            Ok(InputSource::Text(text))
        }
    }
}

/// Maps the literals `None` and `none` to [`TRANSPARENT_BACKGROUND`].
pub fn normalize_background(raw: &str) -> String {
    match raw {
        "None" | "none" => TRANSPARENT_BACKGROUND.to_string(),
        other => other.to_string(),
    }
}

/// Reads one stopword per line, trimmed. Duplicates collapse and blank lines
/// are dropped.
pub fn read_stopwords(target: &StreamTarget) -> WordcloudResult<HashSet<String>> {
    let mut stopwords = HashSet::new();
    for line in open_text(target)?.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            stopwords.insert(word.to_string());
        }
    }
    Ok(stopwords)
}

fn load_mask(target: &StreamTarget) -> WordcloudResult<PixelGrid> {
    let grid = decode_grid(open_bytes(target)?)?;
    debug!(
        source = %target,
        width = grid.width(),
        height = grid.height(),
        "decoded placement mask"
    );
    Ok(grid)
}

fn validate_scaling(relative_scaling: f32) -> WordcloudResult<f32> {
    if (0.0..=1.0).contains(&relative_scaling) {
        Ok(relative_scaling)
    } else {
        Err(WordcloudError::InvalidArguments(format!(
            "relative scaling must be between 0 and 1, got {relative_scaling}"
        )))
    }
}

/// Validates `args` and loads every resource it names.
pub fn resolve_configuration(args: RawArguments) -> WordcloudResult<ResolvedConfiguration> {
    let RawArguments {
        text,
        stopwords,
        wordlist,
        color_mode,
        image_file,
        font_path,
        mask,
        color_mask,
        relative_scaling,
        margin,
        width,
        height,
        color,
        background,
        no_collocations,
    } = args;

    let color_choice = choose_color(color, color_mask)?;
    let relative_scaling = validate_scaling(relative_scaling)?;
    ensure_supported(&image_file, StreamMode::WriteBinary)?;

    let selection = select_input(text, wordlist);
    [
        Some(selection.target()),
        stopwords.as_ref(),
        mask.as_ref(),
        color_choice.mask(),
    ]
    .into_iter()
    .flatten()
    .try_for_each(ensure_readable)?;

    let input = load_input(selection)?;
    let background_color = normalize_background(&background);
    let stopwords = stopwords.as_ref().map(read_stopwords).transpose()?;
    let mask = mask.as_ref().map(load_mask).transpose()?;
    let color_function = color_choice.resolve()?;
    let collocations = !no_collocations;

    Ok(ResolvedConfiguration {
        input,
        stopwords,
        mask,
        dimensions: Dimensions {
            width,
            height,
            margin,
        },
        relative_scaling,
        background_color,
        color_function,
        collocations,
        color_mode,
        font_path,
        output: image_file,
    })
}
