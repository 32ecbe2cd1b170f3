use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::filters::FilterKind;

/// A static image could not be turned into a [`Frame`](crate::frame::Frame).
///
/// Underlying I/O and codec errors are reference-counted so the error can
/// be cloned into status events.
#[derive(Error, Debug, Clone)]
pub enum DecodeError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Image format error: {0}")]
    Image(#[source] Arc<image::ImageError>),

    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} ({width}x{height}x{channels})")]
    SizeMismatch {
        width: usize,
        height: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },
}

impl From<image::ImageError> for DecodeError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(Arc::new(e))
    }
}

/// A capture device refused to open or failed a read.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DeviceError(pub String);

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures of a frame source, either opening it or reading from it.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Could not open capture device {device}: {reason}")]
    OpenFailed { device: u32, reason: String },

    #[error("Read from capture device {device} failed: {reason}")]
    ReadFailed { device: u32, reason: String },

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("No source is open")]
    Closed,
}

impl SourceError {
    /// True for errors that leave the source unusable until it is re-opened.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OpenFailed { .. } | Self::Closed)
    }
}

/// Filter parameter problems.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{kind} parameter '{name}' = {value} out of range, clamped to {clamped}")]
    InvalidParameter {
        kind: FilterKind,
        name: &'static str,
        value: f64,
        clamped: f64,
    },

    #[error("{kind} has no parameter named '{name}'")]
    UnknownParameter { kind: FilterKind, name: String },

    #[error("{kind} parameter '{name}' is not a finite number")]
    NotFinite { kind: FilterKind, name: String },

    #[error("Unknown filter kind '{0}'")]
    UnknownKind(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
