//! # vit-utils: helpers for Vision Transformer training scripts
//!
//! - [`visualize`]: preview an image from a data loader together with its
//!   patch, class-token and position embeddings
//! - [`seed`]: reproducible random number generation
//! - [`serialization`]: save and restore model weights
//!
//! ## Usage Example
//!
//! ```no_run
//! use ndarray::{ArrayD, IxDyn};
//! use vit_utils::config::PatchEmbeddingConfig;
//! use vit_utils::data::{DataLoader, InMemoryDataset};
//! use vit_utils::nn::PatchEmbedding;
//! use vit_utils::plot::Figure;
//! use vit_utils::seed::{set_seeds, DEFAULT_SEED};
//! use vit_utils::serialization::save_model;
//! use vit_utils::visualize::plot_an_image;
//!
//! # fn main() -> vit_utils::Result<()> {
//! set_seeds(DEFAULT_SEED);
//!
//! let images = ArrayD::<f32>::zeros(IxDyn(&[8, 3, 224, 224]));
//! let loader = DataLoader::new(InMemoryDataset::new(images, vec![0; 8])?, 4);
//!
//! let mut figure = Figure::new();
//! plot_an_image(&loader, &["pizza", "steak", "sushi"], 16, &mut figure)?;
//! figure.save("preview.png")?;
//!
//! let model = PatchEmbedding::new(PatchEmbeddingConfig::default())?;
//! save_model(&model, "models", "patch_embedding.safetensors")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod nn;
pub mod plot;
pub mod seed;
pub mod serialization;
pub mod tensor;
pub mod visualize;

pub use error::{Result, VitError};
