// --- File: src/data/dataset.rs ---

//! The `Dataset` trait and an in-memory image dataset.

use crate::error::{Result, VitError};
use ndarray::{ArrayD, Axis, IxDyn};
use std::sync::Arc;

/// A source of indexed samples.
pub trait Dataset: Send + Sync {
    /// Sample type.
    type Item;
    /// Label type.
    type Label;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample and label at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<(Self::Item, Self::Label)>;
}

/// Images `[N, C, H, W]` with one class index per image, held in memory.
///
/// Storage is reference-counted, so clones are cheap and share data.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    images: Arc<ArrayD<f32>>,
    labels: Arc<Vec<usize>>,
}

impl InMemoryDataset {
    /// Builds a dataset from an image stack and matching labels.
    ///
    /// Fails if `images` is not 4-dimensional or if the number of labels
    /// differs from the number of images.
    pub fn new(images: ArrayD<f32>, labels: Vec<usize>) -> Result<Self> {
        if images.ndim() != 4 {
            return Err(VitError::RankMismatch {
                expected: 4,
                actual: images.shape().to_vec(),
            });
        }
        if images.shape()[0] != labels.len() {
            return Err(VitError::ShapeMismatch {
                expected: vec![labels.len()],
                actual: vec![images.shape()[0]],
            });
        }

        Ok(Self {
            images: Arc::new(images),
            labels: Arc::new(labels),
        })
    }

    /// Shape of one image, `[C, H, W]`.
    pub fn image_shape(&self) -> Vec<usize> {
        self.images.shape()[1..].to_vec()
    }

    /// Stacks the images at `indices` into `[indices.len(), C, H, W]`.
    pub fn get_images_batch(&self, indices: &[usize]) -> ArrayD<f32> {
        let mut batch_shape = vec![indices.len()];
        batch_shape.extend(self.image_shape());

        let mut batch = ArrayD::zeros(IxDyn(&batch_shape));
        for (i, &idx) in indices.iter().enumerate() {
            let sample = self.images.index_axis(Axis(0), idx);
            batch.index_axis_mut(Axis(0), i).assign(&sample);
        }
        batch
    }

    pub fn get_labels_batch(&self, indices: &[usize]) -> Vec<usize> {
        indices.iter().map(|&idx| self.labels[idx]).collect()
    }
}

impl Dataset for InMemoryDataset {
    type Item = ArrayD<f32>;
    type Label = usize;

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Option<(Self::Item, Self::Label)> {
        let label = *self.labels.get(index)?;
        let image = self.images.index_axis(Axis(0), index).to_owned();
        Some((image, label))
    }
}
