use std::path::Path;

use ndarray::Array4;
use thiserror::Error;
use tract_onnx::prelude::*;

use crate::classifier::preprocess::TARGET_SIZE;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to fetch model artifact: {0}")]
    Fetch(String),
    #[error("failed to load model: {0}")]
    Load(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// One forward pass; handles are shared across workers, so calls may be concurrent.
pub trait Model: Send + Sync {
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError>;
}

#[derive(Debug)]
pub struct OnnxModel {
    plan: TypedSimplePlan<TypedModel>,
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let size = TARGET_SIZE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| ModelError::Load(e.to_string()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3)),
            )
            .map_err(|e| ModelError::Load(e.to_string()))?
            .into_optimized()
            .map_err(|e| ModelError::Load(e.to_string()))?
            .into_runnable()
            .map_err(|e| ModelError::Load(e.to_string()))?;
        Ok(Self { plan })
    }
}

impl Model for OnnxModel {
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let size = TARGET_SIZE as usize;
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(&[1, size, size, 3], &data)
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| ModelError::Inference("model produced no outputs".to_string()))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        Ok(scores.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_rejects_garbage_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"this is not an onnx graph").unwrap();

        let err = OnnxModel::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::Load(_)));
    }

    #[test]
    fn load_rejects_missing_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.onnx");

        let err = OnnxModel::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::Load(_)));
    }
}
