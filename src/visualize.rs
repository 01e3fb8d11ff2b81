//! Previewing a training image with its ViT input embeddings.
//!
//! [`combine_embeddings`] and [`preview_embeddings`] are pure and return
//! everything they compute. [`plot_an_image`] wraps them with the default
//! ViT-Base patch embedding, prints the resulting shape and draws the image.

use crate::config::{num_patches, PatchEmbeddingConfig};
use crate::data::Batch;
use crate::error::{Result, VitError};
use crate::nn::{Module, PatchEmbedding};
use crate::plot::Plotter;
use crate::tensor::{broadcast_add, cat, Parameter};
use ndarray::{Array3, ArrayD, ArrayView3, Axis, Ix3};

/// Class token, position embedding and their sum with the patch embeddings.
#[derive(Debug, Clone)]
pub struct CombinedEmbedding {
    /// `[batch, 1, dim]`, all ones.
    pub class_token: Parameter,
    /// `[1, num_patches + 1, dim]`, all ones.
    pub position_embedding: Parameter,
    /// `[batch, num_patches + 1, dim]`.
    pub embeddings: ArrayD<f32>,
}

/// Prepends a class token to `patch_embedding` (`[batch, num_patches, dim]`)
/// and adds a position embedding broadcast over the batch.
///
/// Both new tensors are freshly created trainable parameters filled with
/// ones. `height` and `width` must be multiples of `patch_size`, and the
/// patch axis must hold exactly `height * width / patch_size²` entries.
pub fn combine_embeddings(
    patch_embedding: &ArrayD<f32>,
    height: usize,
    width: usize,
    patch_size: usize,
) -> Result<CombinedEmbedding> {
    let n = num_patches(height, width, patch_size)?;
    let shape = patch_embedding.shape();
    if shape.len() != 3 || shape[1] != n {
        return Err(VitError::ShapeMismatch {
            expected: vec![shape.first().copied().unwrap_or(1), n, shape.last().copied().unwrap_or(0)],
            actual: shape.to_vec(),
        });
    }
    let (batch, dim) = (shape[0], shape[2]);

    let class_token = Parameter::ones(&[batch, 1, dim]);
    let with_token = cat(&[class_token.view(), patch_embedding.view()], 1)?;

    let position_embedding = Parameter::ones(&[1, n + 1, dim]);
    let embeddings = broadcast_add(&with_token, position_embedding.data())?;

    Ok(CombinedEmbedding {
        class_token,
        position_embedding,
        embeddings,
    })
}

/// The first sample of a batch together with its embeddings.
#[derive(Debug, Clone)]
pub struct EmbeddingPreview {
    /// `[C, H, W]`.
    pub image: Array3<f32>,
    pub label: usize,
    pub class_name: String,
    /// `[1, num_patches, dim]`, as produced by the embedder.
    pub patch_embedding: ArrayD<f32>,
    pub combined: CombinedEmbedding,
}

impl EmbeddingPreview {
    /// Shape of the combined embedding, `[1, num_patches + 1, dim]`.
    pub fn shape(&self) -> &[usize] {
        self.combined.embeddings.shape()
    }

    pub fn num_patches(&self) -> usize {
        self.patch_embedding.shape()[1]
    }

    /// The image laid out channel-last, `[H, W, C]`.
    pub fn image_hwc(&self) -> ArrayView3<'_, f32> {
        self.image.view().permuted_axes([1, 2, 0])
    }
}

/// Embeds the first image of the first batch produced by `batches`.
///
/// Draws exactly one batch. `class_names[label]` names the sample; the
/// embedder receives the image with a leading batch axis of 1.
pub fn preview_embeddings<I, S, M>(
    batches: I,
    class_names: &[S],
    embedder: &M,
    patch_size: usize,
) -> Result<EmbeddingPreview>
where
    I: IntoIterator<Item = Batch>,
    S: AsRef<str>,
    M: Module + ?Sized,
{
    let batch = batches.into_iter().next().ok_or(VitError::EmptyLoader)?;
    let shape = batch.images.shape();
    if shape.len() != 4 {
        return Err(VitError::RankMismatch {
            expected: 4,
            actual: shape.to_vec(),
        });
    }
    if batch.labels.len() != shape[0] {
        return Err(VitError::ShapeMismatch {
            expected: vec![shape[0]],
            actual: vec![batch.labels.len()],
        });
    }
    let label = *batch.labels.first().ok_or(VitError::EmptyLoader)?;

    let class_name: &str = class_names
        .get(label)
        .ok_or(VitError::UnknownLabel {
            label,
            num_classes: class_names.len(),
        })?
        .as_ref();
    let class_name = class_name.to_string();

    let image = batch
        .images
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix3>()?
        .to_owned();
    let (_, height, width) = image.dim();

    let x = image.clone().insert_axis(Axis(0)).into_dyn();
    let patch_embedding = embedder.forward(&x)?;
    let combined = combine_embeddings(&patch_embedding, height, width, patch_size)?;

    Ok(EmbeddingPreview {
        image,
        label,
        class_name,
        patch_embedding,
        combined,
    })
}

/// Shows the first image of `batches` with its class name as title.
///
/// Builds a fresh 3-channel, 768-dimensional [`PatchEmbedding`] (weights from
/// the process-wide generator), prints the combined embedding shape, and
/// draws the image channel-last with axes hidden.
pub fn plot_an_image<I, S, P>(
    batches: I,
    class_names: &[S],
    patch_size: usize,
    plotter: &mut P,
) -> Result<EmbeddingPreview>
where
    I: IntoIterator<Item = Batch>,
    S: AsRef<str>,
    P: Plotter + ?Sized,
{
    let config = PatchEmbeddingConfig::new(3, patch_size, 768);
    let patch_embedding_layer = PatchEmbedding::new(config)?;

    let preview = preview_embeddings(batches, class_names, &patch_embedding_layer, patch_size)?;
    println!("Patch + token + position embeddings: {:?}", preview.shape());

    plotter.imshow(preview.image_hwc())?;
    plotter.title(&preview.class_name);
    plotter.axis(false);

    Ok(preview)
}
