//! # Neural Network Layers Module
//!
//! - [`Module`]: the common layer interface (forward pass, named
//!   parameters, state dict load/save)
//! - [`PatchEmbedding`]: image → patch-token projection for ViTs

pub mod module;
pub mod patch_embedding;

pub use module::Module;
pub use patch_embedding::PatchEmbedding;
