//! Command-line front end for generating word clouds.

pub mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wordcloud_core::config::{
    DEFAULT_BACKGROUND, DEFAULT_COLOR_MODE, DEFAULT_HEIGHT, DEFAULT_MARGIN, DEFAULT_WIDTH,
};
use wordcloud_core::{BlockLayout, RawArguments, StreamTarget};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wordcloud",
    version,
    about = "A simple command line interface for generating word clouds",
    long_about = None
)]
pub struct Cli {
    /// File of words to build the word cloud from (default: stdin)
    #[arg(long, value_name = "FILE")]
    pub text: Option<StreamTarget>,

    /// File of stopwords, one per line, removed from the text after parsing
    #[arg(long, value_name = "FILE")]
    pub stopwords: Option<StreamTarget>,

    /// File of `word;count` lines used instead of the text
    #[arg(long, value_name = "FILE")]
    pub wordlist: Option<StreamTarget>,

    /// Color mode of the image; use RGBA with a transparent background
    #[arg(long, value_name = "COLORMODE", default_value = DEFAULT_COLOR_MODE)]
    pub colormode: String,

    /// File the PNG image is written to (default: stdout)
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub imagefile: StreamTarget,

    /// Font file to use for the words
    #[arg(long = "fontfile", value_name = "PATH")]
    pub font_path: Option<PathBuf>,

    /// Image whose white pixels are kept free of words
    #[arg(long, value_name = "FILE")]
    pub mask: Option<StreamTarget>,

    /// Image whose colors are used to color the words
    #[arg(long, value_name = "FILE")]
    pub colormask: Option<StreamTarget>,

    /// Scaling of words by frequency (0 - 1)
    #[arg(
        long = "relative_scaling",
        value_name = "RS",
        default_value_t = 0.0,
        allow_hyphen_values = true
    )]
    pub relative_scaling: f32,

    /// Spacing to leave around words
    #[arg(long, value_name = "WIDTH", default_value_t = DEFAULT_MARGIN)]
    pub margin: u32,

    /// Output image width
    #[arg(
        long,
        value_name = "WIDTH",
        default_value_t = DEFAULT_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub width: u32,

    /// Output image height
    #[arg(
        long,
        value_name = "HEIGHT",
        default_value_t = DEFAULT_HEIGHT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Single color used for every word
    #[arg(long, value_name = "COLOR")]
    pub color: Option<String>,

    /// Background color; "None" or "none" means transparent
    #[arg(long, value_name = "COLOR", default_value = DEFAULT_BACKGROUND)]
    pub background: String,

    /// Do not add collocations (bigrams) to the word cloud
    #[arg(long = "no_collocations")]
    pub no_collocations: bool,
}

impl From<Cli> for RawArguments {
    fn from(cli: Cli) -> Self {
        Self {
            text: cli.text,
            stopwords: cli.stopwords,
            wordlist: cli.wordlist,
            color_mode: cli.colormode,
            image_file: cli.imagefile,
            font_path: cli.font_path,
            mask: cli.mask,
            color_mask: cli.colormask,
            relative_scaling: cli.relative_scaling,
            margin: cli.margin,
            width: cli.width,
            height: cli.height,
            color: cli.color,
            background: cli.background,
            no_collocations: cli.no_collocations,
        }
    }
}

/// Resolves the command line and writes the word cloud.
pub fn run(cli: Cli) -> Result<()> {
    let mut generator = BlockLayout::new();
    wordcloud_core::run(cli.into(), &mut generator).context("failed to generate word cloud")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RawArguments {
        let argv = std::iter::once("wordcloud").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn defaults_match_core_defaults() {
        assert_eq!(parse(&[]), RawArguments::default());
    }

    #[test]
    fn maps_every_flag() {
        let args = parse(&[
            "--text=-",
            "--stopwords",
            "stop.txt",
            "--wordlist",
            "list.txt",
            "--colormode",
            "RGBA",
            "--imagefile",
            "out.png",
            "--fontfile",
            "font.ttf",
            "--mask",
            "mask.png",
            "--colormask",
            "colors.png",
            "--relative_scaling",
            "0.5",
            "--margin",
            "4",
            "--width",
            "640",
            "--height",
            "480",
            "--color",
            "red",
            "--background",
            "None",
            "--no_collocations",
        ]);

        let path = |raw: &str| Some(StreamTarget::Path(PathBuf::from(raw)));
        assert_eq!(
            args,
            RawArguments {
                text: Some(StreamTarget::Standard),
                stopwords: path("stop.txt"),
                wordlist: path("list.txt"),
                color_mode: "RGBA".to_string(),
                image_file: StreamTarget::Path(PathBuf::from("out.png")),
                font_path: Some(PathBuf::from("font.ttf")),
                mask: path("mask.png"),
                color_mask: path("colors.png"),
                relative_scaling: 0.5,
                margin: 4,
                width: 640,
                height: 480,
                color: Some("red".to_string()),
                background: "None".to_string(),
                no_collocations: true,
            }
        );
    }

    #[test]
    fn no_collocations_defaults_to_false() {
        assert!(!parse(&[]).no_collocations);
        assert!(parse(&["--no_collocations"]).no_collocations);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(Cli::try_parse_from(["wordcloud", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["wordcloud", "--height", "0"]).is_err());
    }

    #[test]
    fn negative_scaling_reaches_validation() {
        assert_eq!(parse(&["--relative_scaling", "-1"]).relative_scaling, -1.0);
    }
}
