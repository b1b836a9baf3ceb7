//! Uniform access to named files and the standard streams.
//!
//! Every resource on the command line is either a filesystem path or the
//! sentinel `-`. The sentinel maps to stdin for read modes and to stdout for
//! the write mode; any other mode rejects it. Text inputs are always decoded
//! as UTF-8, regardless of locale.

use std::convert::Infallible;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::{WordcloudError, WordcloudResult};

const STANDARD_SENTINEL: &str = "-";

/// A resource named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    Standard,
    Path(PathBuf),
}

impl StreamTarget {
    /// Name used in diagnostics: `-` or the bare path.
    pub fn label(&self) -> String {
        match self {
            Self::Standard => STANDARD_SENTINEL.to_string(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl FromStr for StreamTarget {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == STANDARD_SENTINEL {
            Ok(Self::Standard)
        } else {
            Ok(Self::Path(PathBuf::from(raw)))
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str(STANDARD_SENTINEL),
            Self::Path(path) => write!(f, "'{}'", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    ReadText,
    ReadBinary,
    WriteBinary,
    /// Not available for any target; there is no standard stream to append to
    /// and outputs are always replaced whole.
    AppendBinary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StandardStream {
    Stdin,
    Stdout,
}

impl StreamMode {
    fn standard_stream(self) -> Option<StandardStream> {
        match self {
            Self::ReadText | Self::ReadBinary => Some(StandardStream::Stdin),
            Self::WriteBinary => Some(StandardStream::Stdout),
            Self::AppendBinary => None,
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadText => "read-text",
            Self::ReadBinary => "read-binary",
            Self::WriteBinary => "write-binary",
            Self::AppendBinary => "append-binary",
        })
    }
}

/// An opened resource, shaped by the mode it was requested with.
pub enum Stream {
    Text(TextInput),
    Bytes(ByteInput),
    Output(ByteOutput),
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(input) => f.debug_tuple("Text").field(&input.label).finish(),
            Self::Bytes(input) => f.debug_tuple("Bytes").field(&input.label).finish(),
            Self::Output(output) => f.debug_tuple("Output").field(&output.label).finish(),
        }
    }
}

/// Opens `target` in `mode`.
pub fn open(target: &StreamTarget, mode: StreamMode) -> WordcloudResult<Stream> {
    match mode {
        StreamMode::ReadText => open_text(target).map(Stream::Text),
        StreamMode::ReadBinary => open_bytes(target).map(Stream::Bytes),
        StreamMode::WriteBinary => create_output(target).map(Stream::Output),
        StreamMode::AppendBinary => {
            ensure_supported(target, mode)?;
            Err(WordcloudError::InvalidArguments(format!(
                "{} cannot be opened with mode {mode}",
                target.label()
            )))
        }
    }
}

/// Checks that `target` can be opened in `mode` without touching the filesystem.
pub fn ensure_supported(target: &StreamTarget, mode: StreamMode) -> WordcloudResult<()> {
    match target {
        StreamTarget::Standard if mode.standard_stream().is_none() => {
            Err(WordcloudError::UnsupportedStandardStream { mode })
        }
        _ => Ok(()),
    }
}

/// Confirms that a path-backed `target` can be opened for reading. The file is
/// closed again straight away. `-` always passes.
pub fn ensure_readable(target: &StreamTarget) -> WordcloudResult<()> {
    match target {
        StreamTarget::Standard => Ok(()),
        StreamTarget::Path(path) => File::open(path).map(drop).map_err(|source| {
            WordcloudError::Open {
                path: path.clone(),
                source,
            }
        }),
    }
}

pub fn open_text(target: &StreamTarget) -> WordcloudResult<TextInput> {
    let reader = open_reader(target, StreamMode::ReadText)?;
    Ok(TextInput {
        label: target.label(),
        reader,
    })
}

pub fn open_bytes(target: &StreamTarget) -> WordcloudResult<ByteInput> {
    let reader = open_reader(target, StreamMode::ReadBinary)?;
    Ok(ByteInput {
        label: target.label(),
        reader,
    })
}


fn open_reader(target: &StreamTarget, mode: StreamMode) -> WordcloudResult<Box<dyn BufRead>> {
    ensure_supported(target, mode)?;
    match target {
        StreamTarget::Standard => {
            debug!(%mode, "reading from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
        StreamTarget::Path(path) => {
            debug!(%mode, path = %path.display(), "opening file");
            let file = File::open(path).map_err(|source| WordcloudError::Open {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

pub fn create_output(target: &StreamTarget) -> WordcloudResult<ByteOutput> {
    let sink = match target {
        StreamTarget::Standard => {
            debug!("writing to stdout");
            OutputSink::Stdout(io::stdout())
        }
        StreamTarget::Path(path) => {
            debug!(path = %path.display(), "staging output next to file");
            let parent = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let staged = Builder::new()
                .prefix(".wordcloud")
                .tempfile_in(parent)
                .map_err(|source| WordcloudError::Open {
                    path: path.clone(),
                    source,
                })?;
            OutputSink::Staged {
                writer: BufWriter::new(staged),
                path: path.clone(),
            }
        }
    };

    Ok(ByteOutput {
        label: target.label(),
        sink,
    })
}

/// A UTF-8 text channel.
pub struct TextInput {
    label: String,
    reader: Box<dyn BufRead>,
}

impl fmt::Debug for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextInput")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl TextInput {
    pub fn from_reader(label: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            label: label.into(),
            reader: Box::new(BufReader::new(reader)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Reads the remaining content and releases the stream.
    pub fn read_all(mut self) -> WordcloudResult<String> {
        let mut buffer = String::new();
        self.reader
            .read_to_string(&mut buffer)
            .map_err(|source| WordcloudError::Read {
                label: self.label.clone(),
                source,
            })?;
        Ok(buffer)
    }

    /// Iterates over lines without their terminators. The stream is released
    /// when the iterator is dropped.
    pub fn lines(self) -> TextLines {
        TextLines {
            label: self.label,
            lines: self.reader.lines(),
        }
    }
}

pub struct TextLines {
    label: String,
    lines: io::Lines<Box<dyn BufRead>>,
}

impl TextLines {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Iterator for TextLines {
    type Item = WordcloudResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            line.map_err(|source| WordcloudError::Read {
                label: self.label.clone(),
                source,
            })
        })
    }
}

/// A raw byte channel.
pub struct ByteInput {
    label: String,
    reader: Box<dyn BufRead>,
}

impl ByteInput {
    pub fn from_reader(label: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            label: label.into(),
            reader: Box::new(BufReader::new(reader)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn read_all(mut self) -> WordcloudResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.reader
            .read_to_end(&mut buffer)
            .map_err(|source| WordcloudError::Read {
                label: self.label.clone(),
                source,
            })?;
        Ok(buffer)
    }
}

enum OutputSink {
    Stdout(io::Stdout),
    /// Written to a temporary file that replaces `path` once complete.
    Staged {
        writer: BufWriter<NamedTempFile>,
        path: PathBuf,
    },
}

/// A writable byte channel.
pub struct ByteOutput {
    label: String,
    sink: OutputSink,
}

impl ByteOutput {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_standard(&self) -> bool {
        matches!(self.sink, OutputSink::Stdout(_))
    }

    /// Flushes buffered bytes, moves staged content into place and releases
    /// the stream.
    pub fn finish(self) -> WordcloudResult<()> {
        let is_stdout = self.is_standard();
        let label = self.label;
        match commit(self.sink) {
            Ok(()) => Ok(()),
            Err(err) if is_stdout && should_ignore_pipe_error(&err) => Ok(()),
            Err(source) => Err(WordcloudError::Write { label, source }),
        }
    }

    /// Releases the stream without touching the destination file.
    pub fn discard(self) {
        if let OutputSink::Staged { path, .. } = &self.sink {
            debug!(path = %path.display(), "discarding staged output");
        }
    }
}

fn commit(sink: OutputSink) -> io::Result<()> {
    match sink {
        OutputSink::Stdout(mut stdout) => stdout.flush(),
        OutputSink::Staged { writer, path } => {
            let staged = writer.into_inner().map_err(|err| err.into_error())?;
            staged.as_file().sync_all()?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(metadata) = fs::metadata(&path) {
                    let perm = metadata.permissions().mode();
                    let _ = fs::set_permissions(staged.path(), fs::Permissions::from_mode(perm));
                }
            }

            staged.persist(&path).map(|_| ()).map_err(|err| err.error)
        }
    }
}

impl Write for ByteOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            OutputSink::Stdout(stdout) => stdout.write(buf),
            OutputSink::Staged { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            OutputSink::Stdout(stdout) => stdout.flush(),
            OutputSink::Staged { writer, .. } => writer.flush(),
        }
    }
}

/// A reader that went away early is not an error for stdout.
pub fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}
