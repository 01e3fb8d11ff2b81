// --- File: src/nn/patch_embedding.rs ---

//! Patch embedding layer for Vision Transformers.
//!
//! Splits an image `[N, C, H, W]` into non-overlapping `P x P` patches and
//! projects each flattened patch to `embedding_dim`. This is the same as a
//! Conv2d with `kernel_size = stride = P` followed by flattening the spatial
//! grid and moving channels last, giving `[N, num_patches, embedding_dim]`.
//! Patches are ordered row-major over the grid.

use crate::config::PatchEmbeddingConfig;
use crate::error::{Result, VitError};
use crate::nn::module::Module;
use crate::seed;
use crate::tensor::Parameter;
use ndarray::{s, Array2, ArrayD, Ix1, Ix4};
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use std::collections::HashMap;

/// Conv-style patch projection.
///
/// Weight layout is `[embedding_dim, in_channels, P, P]` and bias is
/// `[embedding_dim]`, the usual Conv2d kernel layout.
#[derive(Debug, Clone)]
pub struct PatchEmbedding {
    config: PatchEmbeddingConfig,
    weight: Parameter,
    bias: Parameter,
}

impl PatchEmbedding {
    /// Creates the layer, drawing its initial weights from the process-wide
    /// general-purpose generator (see [`seed::set_seeds`]).
    pub fn new(config: PatchEmbeddingConfig) -> Result<Self> {
        config.validate()?;
        seed::with_cpu_rng(|rng| Self::with_rng(config, rng))
    }

    /// Creates the layer with weights drawn from `rng`.
    ///
    /// Uses the Conv2d default: uniform in `±1/sqrt(fan_in)` with
    /// `fan_in = C * P * P`, for both weight and bias.
    pub fn with_rng<R: Rng + ?Sized>(config: PatchEmbeddingConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let bound = 1.0 / (config.patch_len() as f32).sqrt();
        let weight = Parameter::random(
            &[
                config.embedding_dim,
                config.in_channels,
                config.patch_size,
                config.patch_size,
            ],
            Uniform::new_inclusive(-bound, bound),
            rng,
        );
        let bias = Parameter::random(
            &[config.embedding_dim],
            Uniform::new_inclusive(-bound, bound),
            rng,
        );
        log::debug!(
            "initialized patch embedding: {} channels, {}px patches, dim {}",
            config.in_channels,
            config.patch_size,
            config.embedding_dim
        );
        Ok(Self {
            config,
            weight,
            bias,
        })
    }

    pub fn config(&self) -> &PatchEmbeddingConfig {
        &self.config
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    /// Output shape for an input of `[batch, C, height, width]`.
    pub fn output_shape(&self, batch: usize, height: usize, width: usize) -> Result<Vec<usize>> {
        let n = self.config.num_patches(height, width)?;
        Ok(vec![batch, n, self.config.embedding_dim])
    }
}

impl Module for PatchEmbedding {
    fn forward(&self, input: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let x = input.view().into_dimensionality::<Ix4>()?;
        let (batch, channels, height, width) = x.dim();
        if channels != self.config.in_channels {
            return Err(VitError::ShapeMismatch {
                expected: vec![batch, self.config.in_channels, height, width],
                actual: input.shape().to_vec(),
            });
        }

        let p = self.config.patch_size;
        let num_patches = self.config.num_patches(height, width)?;
        let grid_w = width / p;
        let patch_len = self.config.patch_len();
        let dim = self.config.embedding_dim;

        // im2col: one row per patch, laid out as (c, ky, kx) to match the
        // weight's trailing axes.
        let mut cols = Array2::<f32>::zeros((batch * num_patches, patch_len));
        for b in 0..batch {
            for idx in 0..num_patches {
                let (gy, gx) = (idx / grid_w, idx % grid_w);
                let patch = x.slice(s![b, .., gy * p..(gy + 1) * p, gx * p..(gx + 1) * p]);
                let mut row = cols.row_mut(b * num_patches + idx);
                for (dst, src) in row.iter_mut().zip(patch.iter()) {
                    *dst = *src;
                }
            }
        }

        let weight = self.weight.view().into_shape((dim, patch_len))?;
        let bias = self.bias.view().into_dimensionality::<Ix1>()?;
        let projected = cols.dot(&weight.t()) + &bias;

        Ok(projected.into_shape((batch, num_patches, dim))?.into_dyn())
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        vec![
            ("projection.weight".to_string(), &self.weight),
            ("projection.bias".to_string(), &self.bias),
        ]
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Parameter)> {
        vec![
            ("projection.weight".to_string(), &mut self.weight),
            ("projection.bias".to_string(), &mut self.bias),
        ]
    }

    fn metadata(&self) -> Result<HashMap<String, String>> {
        let mut meta = HashMap::new();
        meta.insert("config".to_string(), self.config.to_json()?);
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer(in_channels: usize, patch: usize, dim: usize) -> PatchEmbedding {
        let mut rng = StdRng::seed_from_u64(0);
        PatchEmbedding::with_rng(PatchEmbeddingConfig::new(in_channels, patch, dim), &mut rng).unwrap()
    }

    #[test]
    fn test_output_shape_vit_base() {
        let embed = layer(3, 16, 768);
        let image = ArrayD::<f32>::zeros(IxDyn(&[1, 3, 224, 224]));
        let out = embed.forward(&image).unwrap();
        assert_eq!(out.shape(), &[1, 196, 768]);
        assert_eq!(embed.output_shape(1, 224, 224).unwrap(), vec![1, 196, 768]);
    }

    #[test]
    fn test_zero_image_yields_bias() {
        let embed = layer(3, 4, 8);
        let image = ArrayD::<f32>::zeros(IxDyn(&[2, 3, 8, 8]));
        let out = embed.forward(&image).unwrap();
        assert_eq!(out.shape(), &[2, 4, 8]);
        for b in 0..2 {
            for n in 0..4 {
                for d in 0..8 {
                    assert!((out[[b, n, d]] - embed.bias().data()[[d]]).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_projection_matches_manual_conv() {
        let mut embed = layer(1, 2, 1);
        embed
            .weight
            .assign(ArrayD::from_shape_vec(IxDyn(&[1, 1, 2, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap())
            .unwrap();
        embed.bias.assign(ArrayD::zeros(IxDyn(&[1]))).unwrap();

        // 2x4 image -> two patches: [[0,1],[4,5]] and [[2,3],[6,7]]
        let image =
            ArrayD::from_shape_vec(IxDyn(&[1, 1, 2, 4]), (0..8).map(|v| v as f32).collect()).unwrap();
        let out = embed.forward(&image).unwrap();
        assert_eq!(out.shape(), &[1, 2, 1]);
        assert_eq!(out[[0, 0, 0]], 0.0 + 2.0 + 12.0 + 20.0);
        assert_eq!(out[[0, 1, 0]], 2.0 + 6.0 + 18.0 + 28.0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let embed = layer(3, 16, 8);
        let wrong_channels = ArrayD::<f32>::zeros(IxDyn(&[1, 1, 32, 32]));
        assert!(matches!(embed.forward(&wrong_channels), Err(VitError::ShapeMismatch { .. })));

        let not_divisible = ArrayD::<f32>::zeros(IxDyn(&[1, 3, 30, 32]));
        assert!(matches!(
            embed.forward(&not_divisible),
            Err(VitError::IndivisiblePatchSize { .. })
        ));

        let not_4d = ArrayD::<f32>::zeros(IxDyn(&[3, 32, 32]));
        assert!(matches!(embed.forward(&not_4d), Err(VitError::Shape(_))));
    }

    #[test]
    fn test_state_dict_round_trip() {
        let source = layer(3, 4, 16);
        let mut rng = StdRng::seed_from_u64(99);
        let mut target = PatchEmbedding::with_rng(*source.config(), &mut rng).unwrap();
        assert_ne!(target.weight(), source.weight());

        target.load_state_dict(&source.state_dict()).unwrap();
        assert_eq!(target.weight(), source.weight());
        assert_eq!(target.bias(), source.bias());
        assert_eq!(source.num_parameters(), 16 * 3 * 4 * 4 + 16);
    }

    #[test]
    fn test_load_state_dict_rejects_mismatch() {
        let mut embed = layer(3, 4, 16);
        let other = layer(3, 4, 8);
        assert!(matches!(
            embed.load_state_dict(&other.state_dict()),
            Err(VitError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            embed.load_state_dict(&crate::tensor::StateDict::new()),
            Err(VitError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_metadata_records_config() {
        let embed = layer(3, 8, 32);
        let meta = embed.metadata().unwrap();
        let config = PatchEmbeddingConfig::from_json(&meta["config"]).unwrap();
        assert_eq!(config, *embed.config());
    }
}
