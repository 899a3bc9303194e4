//! Errors surfaced by file operations. Interaction no-ops (a click without a
//! drag, a press outside the canvas) are not errors and never reach here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a shapes file (bad magic {0:02x?})")]
    BadMagic([u8; 4]),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown shape tag {tag} in record {index}")]
    UnknownTag { tag: u8, index: usize },
    #[error("file ends in the middle of record {index}")]
    Truncated { index: usize },
    #[error("no file chosen for this drawing")]
    NoPath,
    #[error("invalid canvas size {width}x{height}")]
    CanvasSize { width: u32, height: u32 },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("cannot export {0}")]
    Export(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileError>;
