use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use wordcloud_core::{
    resolve_configuration, run, Canvas, ColorFunction, ErrorKind, Generator, InputSource,
    RawArguments, ResolvedConfiguration, StreamTarget, WordcloudError, WordcloudResult,
    TRANSPARENT_BACKGROUND,
};

/// Captures the configuration it was handed and paints a 2x2 canvas.
#[derive(Default)]
struct Recorder {
    seen: Option<ResolvedConfiguration>,
    fail: bool,
}

impl Generator for Recorder {
    fn generate(&mut self, config: &ResolvedConfiguration) -> WordcloudResult<Canvas> {
        self.seen = Some(config.clone());
        if self.fail {
            return Err(WordcloudError::InvalidColor("boom".to_string()));
        }
        Ok(Canvas::Rgb(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]))))
    }
}

fn write(dir: &TempDir, name: &str, contents: &str) -> StreamTarget {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    StreamTarget::Path(path)
}

fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> StreamTarget {
    let path = dir.path().join(name);
    RgbImage::from_pixel(width, height, Rgb([10, 200, 30]))
        .save(&path)
        .unwrap();
    StreamTarget::Path(path)
}

fn missing(dir: &TempDir, name: &str) -> StreamTarget {
    StreamTarget::Path(dir.path().join(name))
}

fn output(dir: &TempDir) -> (StreamTarget, PathBuf) {
    let path = dir.path().join("cloud.png");
    (StreamTarget::Path(path.clone()), path)
}

fn assert_absent(path: &Path) {
    assert!(!path.exists(), "{} should not exist", path.display());
}

#[test]
fn resolves_text_input_with_stopwords_and_flags() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "hello world\n")),
        stopwords: Some(write(&dir, "stop.txt", " the \nand\n\nthe\n")),
        background: "none".to_string(),
        no_collocations: true,
        ..RawArguments::default()
    };

    let config = resolve_configuration(args).unwrap();

    assert_eq!(config.input, InputSource::Text("hello world\n".to_string()));
    let expected: HashSet<String> = ["the", "and"].iter().map(|s| s.to_string()).collect();
    assert_eq!(config.stopwords, Some(expected));
    assert_eq!(config.background_color, TRANSPARENT_BACKGROUND);
    assert!(!config.collocations);
    assert!(config.mask.is_none());
    assert!(matches!(config.color_function, ColorFunction::Random));
}

#[test]
fn wordlist_wins_and_text_is_never_opened() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(missing(&dir, "never-read.txt")),
        wordlist: Some(write(&dir, "list.txt", "a;3\nb;5\n\nc;1\n")),
        ..RawArguments::default()
    };

    let config = resolve_configuration(args).unwrap();

    let InputSource::Frequencies(frequencies) = config.input else {
        panic!("expected frequencies");
    };
    assert_eq!(frequencies.len(), 3);
    assert_eq!(frequencies["b"], 5);
    assert!(config.collocations);
    assert_eq!(config.background_color, "black");
}

#[test]
fn conflicting_color_options_stop_before_any_output() {
    let dir = tempdir().unwrap();
    let (target, path) = output(&dir);
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        color: Some("red".to_string()),
        color_mask: Some(missing(&dir, "not-opened.png")),
        image_file: target,
        ..RawArguments::default()
    };

    let mut recorder = Recorder::default();
    let err = run(args, &mut recorder).unwrap_err();

    assert!(matches!(err, WordcloudError::ConflictingColorOptions));
    assert!(recorder.seen.is_none());
    assert_absent(&path);
}

#[test]
fn malformed_wordlist_aborts_without_output() {
    let dir = tempdir().unwrap();
    let (target, path) = output(&dir);
    let args = RawArguments {
        wordlist: Some(write(&dir, "list.txt", "a;1\nb;x\n")),
        image_file: target,
        ..RawArguments::default()
    };

    let err = run(args, &mut Recorder::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains(":2:"));
    assert_absent(&path);
}

#[test]
fn missing_stopwords_file_is_a_resource_error() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        stopwords: Some(missing(&dir, "stop.txt")),
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(err.to_string().starts_with("can't open"));
}

#[test]
fn missing_mask_is_reported_before_wordlist_is_parsed() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        wordlist: Some(write(&dir, "list.txt", "a;1\nbadline\n")),
        mask: Some(missing(&dir, "missing.png")),
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn missing_color_mask_is_reported_before_text_is_read() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        stopwords: Some(write(&dir, "stop.txt", "the\n")),
        color_mask: Some(missing(&dir, "colors.png")),
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert!(matches!(err, WordcloudError::Open { ref path, .. } if path.ends_with("colors.png")));
}

#[test]
fn missing_stopwords_fail_without_waiting_on_stdin() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: None,
        stopwords: Some(missing(&dir, "stop.txt")),
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn parse_errors_name_the_bare_path() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("list.txt");
    fs::write(&list, "a;1\nbadline\n").unwrap();
    let args = RawArguments {
        wordlist: Some(StreamTarget::Path(list.clone())),
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("{}:2: missing ';' separator in line 'badline'", list.display())
    );
}

#[test]
fn out_of_range_scaling_is_rejected() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        relative_scaling: 2.0,
        ..RawArguments::default()
    };

    let err = resolve_configuration(args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn decodes_placement_and_color_masks() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        mask: Some(write_png(&dir, "mask.png", 6, 4)),
        color_mask: Some(write_png(&dir, "colors.png", 3, 5)),
        ..RawArguments::default()
    };

    let config = resolve_configuration(args).unwrap();

    assert_eq!(config.mask.as_ref().map(|m| m.dimensions()), Some((6, 4)));
    let ColorFunction::ImageSampled(grid) = &config.color_function else {
        panic!("expected an image-sampled color function");
    };
    assert_eq!(grid.dimensions(), (3, 5));
    assert_eq!(grid.get_pixel(0, 0).0, [10, 200, 30, 255]);
}

#[test]
fn fixed_color_is_passed_through_unparsed() {
    let dir = tempdir().unwrap();
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        color: Some("not even a color".to_string()),
        ..RawArguments::default()
    };

    let config = resolve_configuration(args).unwrap();
    assert!(
        matches!(config.color_function, ColorFunction::Fixed(ref color) if color == "not even a color")
    );
}

#[test]
fn successful_run_writes_png() {
    let dir = tempdir().unwrap();
    let (target, path) = output(&dir);
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        image_file: target,
        ..RawArguments::default()
    };

    let mut recorder = Recorder::default();
    run(args, &mut recorder).unwrap();

    assert!(recorder.seen.is_some());
    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(1, 1), &Rgb([9, 9, 9]));
}

#[test]
fn failed_generation_leaves_no_output() {
    let dir = tempdir().unwrap();
    let (target, path) = output(&dir);
    let args = RawArguments {
        text: Some(write(&dir, "text.txt", "words")),
        image_file: target,
        ..RawArguments::default()
    };

    let mut recorder = Recorder {
        fail: true,
        ..Recorder::default()
    };
    assert!(run(args, &mut recorder).is_err());
    assert!(recorder.seen.is_some());
    assert_absent(&path);
}
