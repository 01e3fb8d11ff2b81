// --- File: src/serialization/mod.rs ---

//! Persisting model weights.
//!
//! Weights are stored as SafeTensors files: a JSON header (tensor names,
//! shapes, dtypes and free-form string metadata) followed by raw
//! little-endian data.
//!
//! # Example
//!
//! ```rust,ignore
//! use vit_utils::serialization::{save_model, load_model};
//!
//! let path = save_model(&model, "outputs", "model.safetensors")?;
//! load_model(&mut fresh_model, &path)?;
//! ```

pub mod model;
pub mod safetensors_io;

pub use model::{load_model, load_state_dict, save_model};
pub use safetensors_io::{list_tensors, load_safetensors, read_metadata, save_safetensors};
