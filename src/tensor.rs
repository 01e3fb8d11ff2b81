//! Eager tensor helpers built on `ndarray`.
//!
//! A [`Parameter`] is an `ArrayD<f32>` tagged as trainable, and a
//! [`StateDict`] is the ordered name → tensor mapping a module exposes for
//! persistence. There is no autograd here: `requires_grad` only records
//! intent so that a training loop elsewhere knows what to optimize.

use crate::error::{Result, VitError};
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis, IxDyn};
use ndarray_rand::rand_distr::Distribution;
use ndarray_rand::RandomExt;
use rand::Rng;

/// A learnable tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    data: ArrayD<f32>,
    requires_grad: bool,
}

impl Parameter {
    /// Wraps `data` as a trainable parameter.
    pub fn new(data: ArrayD<f32>) -> Self {
        Self {
            data,
            requires_grad: true,
        }
    }

    /// A trainable parameter filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::new(ArrayD::ones(IxDyn(shape)))
    }

    /// A trainable parameter filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }

    /// A trainable parameter sampled from `distribution` using `rng`.
    pub fn random<D, R>(shape: &[usize], distribution: D, rng: &mut R) -> Self
    where
        D: Distribution<f32>,
        R: Rng + ?Sized,
    {
        Self::new(ArrayD::random_using(IxDyn(shape), distribution, rng))
    }

    /// Marks the parameter as trainable or frozen.
    pub fn requires_grad_(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// Replaces the value, keeping the shape.
    pub fn assign(&mut self, value: ArrayD<f32>) -> Result<()> {
        if value.shape() != self.data.shape() {
            return Err(VitError::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                actual: value.shape().to_vec(),
            });
        }
        self.data = value;
        Ok(())
    }

    pub fn into_inner(self) -> ArrayD<f32> {
        self.data
    }
}

/// Ordered mapping from parameter name to tensor value.
///
/// Insertion order is preserved; inserting an existing name replaces the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDict {
    entries: Vec<(String, ArrayD<f32>)>,
}

impl StateDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArrayD<f32>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<f32>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for StateDict {
    type Item = (String, ArrayD<f32>);
    type IntoIter = std::vec::IntoIter<(String, ArrayD<f32>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, ArrayD<f32>)> for StateDict {
    fn from_iter<I: IntoIterator<Item = (String, ArrayD<f32>)>>(iter: I) -> Self {
        let mut dict = StateDict::new();
        for (name, value) in iter {
            dict.insert(name, value);
        }
        dict
    }
}

/// Concatenates tensors along `axis`. All other axes must agree.
pub fn cat(tensors: &[ArrayViewD<'_, f32>], axis: usize) -> Result<ArrayD<f32>> {
    if let Some(first) = tensors.first() {
        for t in tensors {
            let compatible = t.ndim() == first.ndim()
                && axis < t.ndim()
                && t.shape()
                    .iter()
                    .zip(first.shape())
                    .enumerate()
                    .all(|(i, (a, b))| i == axis || a == b);
            if !compatible {
                return Err(VitError::ShapeMismatch {
                    expected: first.shape().to_vec(),
                    actual: t.shape().to_vec(),
                });
            }
        }
    }
    Ok(concatenate(Axis(axis), tensors)?)
}

/// Elementwise `lhs + rhs`, broadcasting `rhs` to the shape of `lhs`.
pub fn broadcast_add(lhs: &ArrayD<f32>, rhs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
    let rhs = rhs
        .broadcast(lhs.raw_dim())
        .ok_or_else(|| VitError::ShapeMismatch {
            expected: lhs.shape().to_vec(),
            actual: rhs.shape().to_vec(),
        })?;
    Ok(lhs + &rhs)
}
