//! Configuration of the patch-embedding layer.

use crate::error::{Result, VitError};
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`PatchEmbedding`](crate::nn::PatchEmbedding).
///
/// Defaults match ViT-Base/16: RGB input, 16x16 patches, 768-wide embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEmbeddingConfig {
    /// Number of image channels.
    pub in_channels: usize,
    /// Side length of a square patch, in pixels.
    pub patch_size: usize,
    /// Width of each patch embedding vector.
    pub embedding_dim: usize,
}

impl Default for PatchEmbeddingConfig {
    fn default() -> Self {
        Self {
            in_channels: 3,
            patch_size: 16,
            embedding_dim: 768,
        }
    }
}

impl PatchEmbeddingConfig {
    /// Creates a configuration.
    pub fn new(in_channels: usize, patch_size: usize, embedding_dim: usize) -> Self {
        Self {
            in_channels,
            patch_size,
            embedding_dim,
        }
    }

    /// Sets the number of input channels.
    pub fn with_in_channels(mut self, in_channels: usize) -> Self {
        self.in_channels = in_channels;
        self
    }

    /// Sets the patch size.
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Sets the embedding dimension.
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Rejects configurations with a zero-sized field.
    pub fn validate(&self) -> Result<()> {
        if self.in_channels == 0 {
            return Err(VitError::InvalidConfig("in_channels must be positive".into()));
        }
        if self.patch_size == 0 {
            return Err(VitError::InvalidConfig("patch_size must be positive".into()));
        }
        if self.embedding_dim == 0 {
            return Err(VitError::InvalidConfig("embedding_dim must be positive".into()));
        }
        Ok(())
    }

    /// Number of values in one flattened patch (`C * P * P`).
    pub fn patch_len(&self) -> usize {
        self.in_channels * self.patch_size * self.patch_size
    }

    /// Number of patches an image of `height` x `width` is split into.
    pub fn num_patches(&self, height: usize, width: usize) -> Result<usize> {
        num_patches(height, width, self.patch_size)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// `(height * width) / patch_size²`, requiring both sides to be exact
/// multiples of `patch_size`.
pub fn num_patches(height: usize, width: usize, patch_size: usize) -> Result<usize> {
    if patch_size == 0 || height % patch_size != 0 || width % patch_size != 0 {
        return Err(VitError::IndivisiblePatchSize {
            height,
            width,
            patch_size,
        });
    }
    Ok((height / patch_size) * (width / patch_size))
}
