//! Crate-wide error type.
//!
//! Collaborator failures (filesystem, serializer, image encoder, ndarray
//! reshapes) are wrapped as-is and propagated with `?`; nothing is retried
//! or swallowed.

use thiserror::Error;

/// Errors produced by the embedding, seeding and persistence helpers.
#[derive(Error, Debug)]
pub enum VitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SafeTensors error: {0}")]
    SafeTensors(#[from] safetensors::SafeTensorError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("expected a {expected}-D tensor, got shape {actual:?}")]
    RankMismatch { expected: usize, actual: Vec<usize> },

    #[error("image of {height}x{width} cannot be split into {patch_size}x{patch_size} patches")]
    IndivisiblePatchSize {
        height: usize,
        width: usize,
        patch_size: usize,
    },

    #[error("data loader produced no batches")]
    EmptyLoader,

    #[error("label {label} has no class name ({num_classes} classes known)")]
    UnknownLabel { label: usize, num_classes: usize },

    #[error("unsupported tensor dtype: {0}")]
    UnsupportedDtype(String),

    #[error("parameter '{0}' is missing from the state dict")]
    MissingParameter(String),

    #[error("figure has no image to render")]
    EmptyFigure,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, VitError>;
