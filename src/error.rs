use std::path::PathBuf;

/// Errors returned by the ring alignment engine.
///
/// Out-of-bounds sampling and flat profiles are not errors; they produce the
/// sentinel intensity `0` and a score of `0` respectively.
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("profile length mismatch: inner has {inner} samples, outer has {outer}")]
    ShapeMismatch { inner: usize, outer: usize },
    #[error("sector count {0} does not evenly divide 360")]
    InvalidSectorCount(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
