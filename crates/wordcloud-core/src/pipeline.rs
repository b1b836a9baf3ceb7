use image::ImageError;
use tracing::debug;

use crate::config::{resolve_configuration, RawArguments, ResolvedConfiguration};
use crate::error::{WordcloudError, WordcloudResult};
use crate::layout::Generator;
use crate::raster::encode_png;
use crate::stream::{create_output, should_ignore_pipe_error, ByteOutput};

/// Generates the image for `config` and writes it as PNG to its output.
///
/// The output is opened before generation and held until every byte has been
/// written. A failed render leaves the destination untouched. A reader that
/// closes stdout early ends the write without an error.
pub fn render<G: Generator + ?Sized>(
    config: &ResolvedConfiguration,
    generator: &mut G,
) -> WordcloudResult<()> {
    let mut output = create_output(&config.output)?;

    let written = generator
        .generate(config)
        .and_then(|canvas| encode_png(&canvas, &mut output));

    match written {
        Ok(()) => {
            debug!(output = %output.label(), "image written");
            output.finish()
        }
        Err(err) if is_closed_pipe(&output, &err) => {
            debug!("stdout closed before the image was fully written");
            output.discard();
            Ok(())
        }
        Err(err) => {
            output.discard();
            Err(err)
        }
    }
}

fn is_closed_pipe(output: &ByteOutput, err: &WordcloudError) -> bool {
    match err {
        WordcloudError::ImageEncode(ImageError::IoError(source)) => {
            output.is_standard() && should_ignore_pipe_error(source)
        }
        _ => false,
    }
}

/// Resolves `args` and renders the result. Nothing is written when
/// resolution fails.
pub fn run<G: Generator + ?Sized>(args: RawArguments, generator: &mut G) -> WordcloudResult<()> {
    let config = resolve_configuration(args)?;
    render(&config, generator)
}
