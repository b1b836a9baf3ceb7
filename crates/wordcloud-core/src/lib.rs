pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod raster;
pub mod stream;
pub mod text;
pub mod wordlist;

pub use color::{
    choose_color, parse_color, resolve_color_function, ColorChoice, ColorFunction, Orientation,
    PixelGrid, Placement,
};
pub use config::{
    normalize_background, resolve_configuration, Dimensions, InputSource, RawArguments,
    ResolvedConfiguration, TRANSPARENT_BACKGROUND,
};
pub use error::{ErrorKind, WordcloudError, WordcloudResult, WordlistIssue};
pub use layout::{BlockLayout, Generator};
pub use pipeline::{render, run};
pub use raster::{decode_grid, encode_png, Canvas};
pub use stream::{StreamMode, StreamTarget};
pub use wordlist::{parse_wordlist, Frequencies};
