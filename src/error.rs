use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("opencv: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf: {0}")]
    Pdf(#[from] printpdf::Error),

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("marker id {0} is outside the deck (0..=53)")]
    InvalidMarkerId(i32),

    #[error("unable to open camera at index {0}")]
    CameraUnavailable(i32),
}

pub type Result<T> = std::result::Result<T, Error>;
