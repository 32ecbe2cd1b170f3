use std::path::Path;
use std::sync::Arc;

use image::ImageReader;
use tracing::debug;

use crate::error::DecodeError;
use crate::frame::Frame;

/// Load and decode an image file into a Frame.
///
/// The container format is guessed from the file contents, so a PNG with a
/// `.jpg` extension still decodes.
pub fn load_image(path: &Path) -> Result<Frame, DecodeError> {
    let io_err = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source: Arc::new(source),
    };

    let img = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()?;

    let frame = Frame::from_dynamic(&img)?;
    debug!(
        path = %path.display(),
        width = frame.width(),
        height = frame.height(),
        layout = %frame.layout(),
        "Decoded image"
    );
    Ok(frame)
}

/// Decode an in-memory encoded image.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let img = image::load_from_memory(bytes)?;
    Frame::from_dynamic(&img)
}
