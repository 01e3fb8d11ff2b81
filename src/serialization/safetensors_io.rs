// --- File: src/serialization/safetensors_io.rs ---

//! SafeTensors reading and writing for [`StateDict`]s.
//!
//! Tensors are written as little-endian F32. F64 files are accepted on read
//! and narrowed to f32; every other dtype is rejected.

use crate::error::{Result, VitError};
use crate::tensor::StateDict;
use ndarray::{ArrayD, IxDyn};
use safetensors::tensor::{SafeTensors, TensorView};
use safetensors::{serialize_to_file, Dtype};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Writes `tensors` to `path`, with optional string metadata in the header.
///
/// ```rust,ignore
/// let mut weights = StateDict::new();
/// weights.insert("layer.weight", ArrayD::zeros(IxDyn(&[4, 4])));
/// save_safetensors("weights.safetensors", &weights, None)?;
/// ```
pub fn save_safetensors<P: AsRef<Path>>(
    path: P,
    tensors: &StateDict,
    metadata: Option<HashMap<String, String>>,
) -> Result<()> {
    // Byte buffers must outlive the views that borrow them.
    let buffers: Vec<(&str, Vec<usize>, Vec<u8>)> = tensors
        .iter()
        .map(|(name, arr)| {
            let bytes: Vec<u8> = arr.iter().flat_map(|x| x.to_le_bytes()).collect();
            (name, arr.shape().to_vec(), bytes)
        })
        .collect();

    let mut views: Vec<(&str, TensorView<'_>)> = Vec::with_capacity(buffers.len());
    for (name, shape, bytes) in &buffers {
        views.push((*name, TensorView::new(Dtype::F32, shape.clone(), bytes)?));
    }

    serialize_to_file(views, &metadata, path.as_ref())?;
    Ok(())
}

/// Reads every tensor in `path`, in name order.
pub fn load_safetensors<P: AsRef<Path>>(path: P) -> Result<StateDict> {
    let buffer = fs::read(path)?;
    let tensors = SafeTensors::deserialize(&buffer)?;

    let mut entries: Vec<(String, ArrayD<f32>)> = Vec::new();
    for (name, view) in tensors.tensors() {
        let values: Vec<f32> = match view.dtype() {
            Dtype::F32 => view
                .data()
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            Dtype::F64 => view
                .data()
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32)
                .collect(),
            other => return Err(VitError::UnsupportedDtype(format!("{:?}", other))),
        };
        let shape = view.shape().to_vec();
        let values_len = values.len();
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| VitError::ShapeMismatch {
            expected: shape.clone(),
            actual: vec![values_len],
        })?;
        entries.push((name, arr));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries.into_iter().collect())
}

/// Header metadata of `path` (empty if the file has none).
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let buffer = fs::read(path)?;
    let (_, metadata) = SafeTensors::read_metadata(&buffer)?;
    Ok(metadata.metadata().clone().unwrap_or_default())
}

/// Tensor names in `path`, sorted.
pub fn list_tensors<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let buffer = fs::read(path)?;
    let tensors = SafeTensors::deserialize(&buffer)?;
    let mut names: Vec<String> = tensors.names().into_iter().cloned().collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_weights() -> StateDict {
        let mut weights = StateDict::new();
        weights.insert(
            "test.weight",
            ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        weights.insert(
            "test.bias",
            ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.1, 0.2, 0.3]).unwrap(),
        );
        weights
    }

    #[test]
    fn test_save_load_safetensors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.safetensors");
        let weights = sample_weights();

        save_safetensors(&path, &weights, None).unwrap();
        let loaded = load_safetensors(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["test.bias", "test.weight"]);
        assert_eq!(loaded.get("test.weight"), weights.get("test.weight"));
        assert_eq!(loaded.get("test.bias"), weights.get("test.bias"));
    }

    #[test]
    fn test_metadata_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.safetensors");

        let mut meta = HashMap::new();
        meta.insert("format".to_string(), "vit".to_string());
        save_safetensors(&path, &sample_weights(), Some(meta)).unwrap();

        assert_eq!(read_metadata(&path).unwrap().get("format").map(String::as_str), Some("vit"));
        assert_eq!(list_tensors(&path).unwrap(), vec!["test.bias", "test.weight"]);
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.safetensors");
        save_safetensors(&path, &sample_weights(), None).unwrap();
        assert!(read_metadata(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_safetensors(dir.path().join("absent.safetensors")),
            Err(VitError::Io(_))
        ));
    }
}
