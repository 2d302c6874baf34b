#![forbid(unsafe_code)]

//! Output serializers for RENSPA polygon batches.
//!
//! Every serializer accepts an empty batch and returns a structurally valid,
//! empty artifact. There is no error taxonomy at this boundary beyond
//! container-level plumbing (JSON text, zip archive).

pub mod ee;
pub mod geojson;
pub mod kml;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
