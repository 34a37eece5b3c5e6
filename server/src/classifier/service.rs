use std::sync::Arc;

use crate::classifier::decode;
use crate::classifier::model::{Model, ModelError};
use crate::classifier::preprocess;
use crate::error::PredictError;

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub confidence: f32,
    pub label: Option<String>,
}

#[derive(Clone)]
pub struct InferenceService {
    model: Option<Arc<dyn Model>>,
    labels: Option<Vec<String>>,
}

impl InferenceService {
    pub fn new(model: Option<Arc<dyn Model>>, labels: Option<Vec<String>>) -> Self {
        Self { model, labels }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn handle(&self, upload: Option<UploadedFile>) -> Result<Prediction, PredictError> {
        // Availability gate runs before any input validation: a degraded
        // service answers 503 no matter what the request looks like.
        let model = self.model.as_ref().ok_or(PredictError::ModelUnavailable)?;

        let upload = upload.ok_or(PredictError::MissingFile)?;
        if upload.filename.is_empty() || upload.bytes.is_empty() {
            return Err(PredictError::MissingFile);
        }
        decode::check_extension(&upload.filename)?;

        let image = decode::decode_image(&upload.bytes)?;
        let tensor = preprocess::to_input_tensor(&image);
        let output = model.infer(&tensor)?;
        self.map_output(&output)
    }

    fn map_output(&self, output: &[f32]) -> Result<Prediction, PredictError> {
        if output.is_empty() {
            let err = ModelError::Inference("model produced an empty output vector".to_string());
            return Err(err.into());
        }
        if let Some(labels) = &self.labels {
            if labels.len() != output.len() {
                return Err(PredictError::LabelMismatch {
                    labels: labels.len(),
                    outputs: output.len(),
                });
            }
        }

        let mut index = 0;
        let mut best = f32::NEG_INFINITY;
        for (i, &value) in output.iter().enumerate() {
            if value > best {
                index = i;
                best = value;
            }
        }

        let label = self.labels.as_ref().map(|labels| labels[index].clone());
        Ok(Prediction {
            index,
            confidence: best.clamp(0.0, 1.0),
            label,
        })
    }
}
