//! Saving and restoring model weights.

use super::safetensors_io::{load_safetensors, save_safetensors};
use crate::error::Result;
use crate::nn::Module;
use crate::tensor::StateDict;
use std::fs;
use std::path::{Path, PathBuf};

/// Saves `model`'s state dict to `target_dir/model_name`.
///
/// Creates `target_dir` and any missing parents first; an existing
/// directory is fine, and an existing file is overwritten. Only the
/// parameter values and the model's metadata are written. Returns the path
/// of the saved file.
pub fn save_model<M, P>(model: &M, target_dir: P, model_name: &str) -> Result<PathBuf>
where
    M: Module + ?Sized,
    P: AsRef<Path>,
{
    let target_dir_path = target_dir.as_ref();
    fs::create_dir_all(target_dir_path)?;

    let model_save_path = target_dir_path.join(model_name);

    println!("[INFO] Saving model to: {}", model_save_path.display());
    let metadata = model.metadata()?;
    let metadata = if metadata.is_empty() { None } else { Some(metadata) };
    save_safetensors(&model_save_path, &model.state_dict(), metadata)?;

    Ok(model_save_path)
}

/// Reads a state dict written by [`save_model`].
pub fn load_state_dict<P: AsRef<Path>>(path: P) -> Result<StateDict> {
    load_safetensors(path)
}

/// Loads weights saved by [`save_model`] into `model`.
///
/// Every parameter of `model` must be present with a matching shape.
pub fn load_model<M, P>(model: &mut M, path: P) -> Result<()>
where
    M: Module + ?Sized,
    P: AsRef<Path>,
{
    let state = load_state_dict(path.as_ref())?;
    model.load_state_dict(&state)?;
    log::info!("loaded {} tensors from {}", state.len(), path.as_ref().display());
    Ok(())
}
