//! Error types for perennity-viz operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, mapping, rendering or exporting a sequence.
#[derive(Error, Debug)]
pub enum Error {
    /// A raw frame does not have the same entity count as the first frame.
    #[error("Shape mismatch at frame {frame_index}: expected {expected} entities, found {found}")]
    ShapeMismatch {
        /// Index of the offending raw frame.
        frame_index: usize,
        /// Entity count of the first frame.
        expected: usize,
        /// Entity count of the offending frame.
        found: usize,
    },

    /// The coordinate space has zero (or non-finite) width or height.
    #[error("Degenerate bounds: width {width}, height {height}")]
    DegenerateBounds {
        /// Data-space width.
        width: f32,
        /// Data-space height.
        height: f32,
    },

    /// A drawing or export call hit a canvas or driver that was already released.
    #[error("Surface closed: {0}")]
    SurfaceClosed(&'static str),

    /// The underlying image/animation encoder failed.
    #[error("Encoder error{}: {message}", .frame_index.map(|i| format!(" at frame {i}")).unwrap_or_default())]
    Encoder {
        /// Output frame being encoded when the failure happened, if any.
        frame_index: Option<usize>,
        /// Encoder message.
        message: String,
    },

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// GIF encoding error.
    #[error("GIF encoding error: {0}")]
    GifEncoding(#[from] gif::EncodingError),

    /// Invalid dimensions for a framebuffer or canvas.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// A topology connection references an entity that does not exist.
    #[error("Connection ({from}, {to}) references entity outside 0..{entity_count}")]
    InvalidConnection {
        /// First entity of the pair.
        from: usize,
        /// Second entity of the pair.
        to: usize,
        /// Number of entities per frame.
        entity_count: usize,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    /// Configuration text could not be parsed.
    #[error("Configuration parse error at line {line}: {message}")]
    ConfigParse {
        /// Line of the offending YAML (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// The caller cancelled an export between frames.
    #[error("Export cancelled after {frames_written} frames")]
    Cancelled {
        /// Frames encoded before cancellation was observed.
        frames_written: usize,
    },
}

impl Error {
    /// Build an [`Error::Encoder`] tagged with the output frame being encoded.
    pub(crate) fn encoder_at(frame_index: usize, message: impl Into<String>) -> Self {
        Self::Encoder {
            frame_index: Some(frame_index),
            message: message.into(),
        }
    }

    /// Re-tag an output failure as [`Error::Encoder`]; other errors pass through.
    pub(crate) fn into_encoder(self, frame_index: Option<usize>) -> Self {
        match self {
            Self::Io(_) | Self::PngEncoding(_) | Self::GifEncoding(_) => Self::Encoder {
                frame_index,
                message: self.to_string(),
            },
            other => other,
        }
    }
}
