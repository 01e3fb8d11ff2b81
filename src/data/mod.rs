//! # Data Loading Module
//!
//! PyTorch-style Dataset and DataLoader API for image batches.
//!
//! ## Example
//!
//! ```ignore
//! use vit_utils::data::{DataLoader, InMemoryDataset};
//!
//! let dataset = InMemoryDataset::new(images, labels)?;
//! let loader = DataLoader::new(dataset, 32).shuffle(true);
//!
//! for batch in &loader {
//!     // batch.images: [32, C, H, W], batch.labels: Vec<usize>
//! }
//! ```

pub mod dataloader;
pub mod dataset;
pub mod sampler;

pub use dataloader::{Batch, DataLoader, DataLoaderBuilder, DataLoaderIterator};
pub use dataset::{Dataset, InMemoryDataset};
pub use sampler::{BatchSampler, RandomSampler, SequentialSampler};
