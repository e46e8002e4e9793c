use super::ImageTensor;
use crate::error::{DatasetError, Result};
use std::fmt;
use std::sync::Arc;

/// A step applied to every image after it is decoded.
pub trait Transform: Send + Sync {
    fn apply(&self, image: ImageTensor) -> Result<ImageTensor>;
}

impl<F> Transform for F
where
    F: Fn(ImageTensor) -> Result<ImageTensor> + Send + Sync,
{
    fn apply(&self, image: ImageTensor) -> Result<ImageTensor> {
        self(image)
    }
}

/// Transforms applied in insertion order. Empty by default.
#[derive(Clone, Default)]
pub struct TransformPipeline {
    steps: Vec<Arc<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<T: Transform + 'static>(mut self, step: T) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, image: ImageTensor) -> Result<ImageTensor> {
        self.steps
            .iter()
            .try_fold(image, |image, step| step.apply(image))
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// `(x - mean) / std` on every pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalize {
    mean: f32,
    std: f32,
}

impl Normalize {
    pub fn new(mean: f32, std: f32) -> Result<Self> {
        if !(std.is_finite() && std > 0.0) || !mean.is_finite() {
            return Err(DatasetError::InvalidParameter(format!(
                "normalize needs a finite mean and a positive std, got mean={} std={}",
                mean, std
            )));
        }
        Ok(Self { mean, std })
    }
}

impl Transform for Normalize {
    fn apply(&self, image: ImageTensor) -> Result<ImageTensor> {
        Ok(image.mapv_into(|v| (v - self.mean) / self.std))
    }
}
