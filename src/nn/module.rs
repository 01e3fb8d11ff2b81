//! Module defining the core `Module` trait for layers.

use crate::error::{Result, VitError};
use crate::tensor::{Parameter, StateDict};
use ndarray::ArrayD;
use std::collections::HashMap;

/// Common interface of every layer.
pub trait Module {
    /// Runs the layer on `input`.
    fn forward(&self, input: &ArrayD<f32>) -> Result<ArrayD<f32>>;

    /// Learnable parameters, in registration order.
    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    /// Mutable access to the same parameters, in the same order.
    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Parameter)>;

    /// String metadata stored alongside the weights when saving.
    fn metadata(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    /// Snapshot of the current parameter values.
    fn state_dict(&self) -> StateDict {
        self.named_parameters()
            .into_iter()
            .map(|(name, p)| (name, p.data().clone()))
            .collect()
    }

    /// Overwrites every parameter from `state`. Names must all be present
    /// and shapes must match; extra entries in `state` are ignored.
    fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        let mut params = self.named_parameters_mut();
        // Validate first so a failed load leaves the module untouched.
        for (name, param) in &params {
            let value = state
                .get(name)
                .ok_or_else(|| VitError::MissingParameter(name.clone()))?;
            if value.shape() != param.shape() {
                return Err(VitError::ShapeMismatch {
                    expected: param.shape().to_vec(),
                    actual: value.shape().to_vec(),
                });
            }
        }
        for (name, param) in params.iter_mut() {
            if let Some(value) = state.get(name) {
                param.assign(value.clone())?;
            }
        }
        Ok(())
    }

    fn num_parameters(&self) -> usize {
        self.named_parameters().iter().map(|(_, p)| p.data().len()).sum()
    }
}
