use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TurboJpegError>;

#[derive(Error, Debug)]
pub enum TurboJpegError {
    /// The native library reported a failure. The message is the library's
    /// own error string, unmodified.
    #[error("{0}")]
    Codec(String),

    #[error("Failed to load TurboJPEG library from {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Raster buffer holds {actual} bytes, shape requires {expected}")]
    InvalidRaster { expected: usize, actual: usize },

    #[error("Destination buffer holds {actual} bytes, image requires {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Input of {0} bytes exceeds the native length type")]
    InputTooLarge(usize),

    #[error("Unknown {kind} value {value}")]
    UnknownEnumValue { kind: &'static str, value: i32 },
}

impl TurboJpegError {
    pub fn is_codec(&self) -> bool {
        matches!(self, TurboJpegError::Codec(_))
    }
}
