//! Export module for Snapcrop
//!
//! Names and writes captured PNG files.

mod png;

pub use png::{capture_file_name, next_capture_path, save_image, PngExporter, CAPTURE_PREFIX};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to write")]
    Empty,
}

pub type ExportResult<T> = Result<T, ExportError>;
