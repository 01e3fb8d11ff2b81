// --- File: src/data/dataloader.rs ---

//! DataLoader: batched iteration over an [`InMemoryDataset`].

use super::dataset::{Dataset, InMemoryDataset};
use super::sampler::{BatchSampler, RandomSampler, SequentialSampler};
use ndarray::ArrayD;

/// One batch: images `[B, C, H, W]` and their class indices.
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: ArrayD<f32>,
    pub labels: Vec<usize>,
    /// Dataset indices of the samples in this batch.
    pub indices: Vec<usize>,
}

impl Batch {
    pub fn new(images: ArrayD<f32>, labels: Vec<usize>, indices: Vec<usize>) -> Self {
        Self {
            images,
            labels,
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Iterates a dataset in batches.
///
/// Each call to [`iter`](DataLoader::iter) starts a fresh pass, so the
/// loader can be consumed any number of times.
///
/// ```rust,ignore
/// let loader = DataLoader::new(dataset, 32)
///     .shuffle(true)
///     .drop_last(false);
///
/// for batch in &loader {
///     println!("Batch size: {}", batch.len());
/// }
/// ```
pub struct DataLoader {
    dataset: InMemoryDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl DataLoader {
    /// A zero `batch_size` is treated as 1.
    pub fn new(dataset: InMemoryDataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Fixes the shuffle order. Without it, shuffling draws from the
    /// process-wide generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            (n + self.batch_size - 1) / self.batch_size
        }
    }

    /// Number of samples in the dataset.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn dataset(&self) -> &InMemoryDataset {
        &self.dataset
    }

    pub fn iter(&self) -> DataLoaderIterator<'_> {
        let batch_sampler = if self.shuffle {
            let sampler = match self.seed {
                Some(seed) => RandomSampler::with_seed(self.dataset.len(), seed),
                None => RandomSampler::new(self.dataset.len()),
            };
            BatchSamplerEnum::Random(BatchSampler::new(sampler, self.batch_size, self.drop_last))
        } else {
            let sampler = SequentialSampler::new(self.dataset.len());
            BatchSamplerEnum::Sequential(BatchSampler::new(sampler, self.batch_size, self.drop_last))
        };

        DataLoaderIterator {
            dataset: &self.dataset,
            batch_sampler,
        }
    }
}

impl<'a> IntoIterator for &'a DataLoader {
    type Item = Batch;
    type IntoIter = DataLoaderIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum BatchSamplerEnum {
    Sequential(BatchSampler<SequentialSampler>),
    Random(BatchSampler<RandomSampler>),
}

impl Iterator for BatchSamplerEnum {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            BatchSamplerEnum::Sequential(s) => s.next(),
            BatchSamplerEnum::Random(s) => s.next(),
        }
    }
}

/// Iterator over the batches of one pass.
pub struct DataLoaderIterator<'a> {
    dataset: &'a InMemoryDataset,
    batch_sampler: BatchSamplerEnum,
}

impl<'a> Iterator for DataLoaderIterator<'a> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.batch_sampler.next()?;
        let images = self.dataset.get_images_batch(&indices);
        let labels = self.dataset.get_labels_batch(&indices);
        Some(Batch::new(images, labels, indices))
    }
}

/// Builder for [`DataLoader`].
#[derive(Debug, Clone)]
pub struct DataLoaderBuilder {
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl Default for DataLoaderBuilder {
    fn default() -> Self {
        Self {
            batch_size: 1,
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }
}

impl DataLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self, dataset: InMemoryDataset) -> DataLoader {
        let mut loader = DataLoader::new(dataset, self.batch_size)
            .shuffle(self.shuffle)
            .drop_last(self.drop_last);

        if let Some(seed) = self.seed {
            loader = loader.seed(seed);
        }

        loader
    }
}
