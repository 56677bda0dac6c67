use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};

use super::encoder::FeatureVector;
use super::error::{DataLoadError, PredictionError};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A pre-trained probabilistic multi-class classifier.
///
/// `predict_proba` returns one probability per entry of `classes()`, in the
/// same order. Implementations are read-only after construction.
pub trait ClassifierModel: Send + Sync {
    /// Class labels in the classifier's native order.
    fn classes(&self) -> &[String];

    /// Probability of each class for the given features.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, PredictionError>;
}

/// A classifier exported to ONNX, executed with ONNX Runtime.
///
/// The graph takes a single float input of shape `[batch, n_features]` and
/// exposes class probabilities as a float tensor `[batch, n_classes]`
/// (for scikit-learn exports this means ZipMap disabled). Class labels come
/// from a JSON sidecar holding an array of strings.
#[derive(Debug)]
pub struct OnnxClassifier {
    pub model_path: PathBuf,
    session: Arc<Session>,
    input_name: String,
    probability_output: usize,
    classes: Arc<Vec<String>>,
    n_features: Option<usize>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxClassifier>();
    }
};

impl OnnxClassifier {
    /// Loads the ONNX graph and its class list.
    ///
    /// # Errors
    /// - `Missing` if either file does not exist
    /// - `Json` if the class list is not a JSON array of strings
    /// - `Model` if ONNX Runtime rejects the graph, it lacks a float32
    ///   probability output, or that output's class width differs from the
    ///   class list
    pub fn load(model_path: &Path, classes_path: &Path, config: &RuntimeConfig) -> Result<Self, DataLoadError> {
        if !model_path.exists() {
            return Err(DataLoadError::Missing(model_path.to_path_buf()));
        }
        let classes = load_class_labels(classes_path)?;

        info!("Loading classifier from {:?}", model_path);
        let session = create_session_builder(config)?.commit_from_file(model_path)?;
        let layout = Self::validate_model(&session)?;
        if let Some(n_classes) = layout.n_classes {
            if n_classes != classes.len() {
                return Err(DataLoadError::Model(format!(
                    "Model outputs {} class probabilities but {:?} lists {} classes",
                    n_classes,
                    classes_path,
                    classes.len()
                )));
            }
        }
        info!(
            "Classifier ready: {} classes, input '{}', probability output #{}",
            classes.len(),
            layout.input_name,
            layout.probability_output
        );

        Ok(Self {
            model_path: model_path.to_path_buf(),
            session: Arc::new(session),
            input_name: layout.input_name,
            probability_output: layout.probability_output,
            classes: Arc::new(classes),
            n_features: layout.n_features,
        })
    }

    /// Number of features the graph declares, when its input width is static.
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Checks the input/output structure and picks the tensors to use.
    ///
    /// Only float32 tensor outputs can carry probabilities; label outputs
    /// (int64) and ZipMap sequences are skipped. Returns the input name, the
    /// index of the probability output, the static feature width and the
    /// static class width when the graph declares them.
    fn validate_model(session: &Session) -> Result<ModelLayout, DataLoadError> {
        let inputs = &session.inputs;
        if inputs.len() != 1 {
            return Err(DataLoadError::Model(format!(
                "Model must have exactly 1 input (the feature matrix), found {}",
                inputs.len()
            )));
        }
        let input = &inputs[0];
        if input.input_type.tensor_type() != Some(TensorElementType::Float32) {
            return Err(DataLoadError::Model(format!(
                "Model input '{}' must be a float32 tensor, found {:?}",
                input.name, input.input_type
            )));
        }

        let outputs = &session.outputs;
        for output in outputs.iter() {
            debug!("Model output '{}': {:?}", output.name, output.output_type);
        }
        let float_outputs: Vec<(usize, &str)> = outputs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.output_type.tensor_type() == Some(TensorElementType::Float32))
            .map(|(i, o)| (i, o.name.as_str()))
            .collect();

        let probability_output = float_outputs
            .iter()
            .find(|(_, name)| name.to_lowercase().contains("prob"))
            .or_else(|| float_outputs.last())
            .map(|(i, _)| *i)
            .ok_or_else(|| {
                DataLoadError::Model(
                    "Model has no float32 tensor output for class probabilities (export without ZipMap)"
                        .to_string(),
                )
            })?;

        Ok(ModelLayout {
            input_name: input.name.clone(),
            probability_output,
            n_features: static_width(&input.input_type),
            n_classes: static_width(&outputs[probability_output].output_type),
        })
    }
}

struct ModelLayout {
    input_name: String,
    probability_output: usize,
    n_features: Option<usize>,
    n_classes: Option<usize>,
}

/// Last dimension of a tensor type, if it is fixed in the graph.
fn static_width(value_type: &ValueType) -> Option<usize> {
    value_type
        .tensor_dimensions()
        .and_then(|dims| dims.last().copied())
        .filter(|&d| d > 0)
        .map(|d| d as usize)
}

impl ClassifierModel for OnnxClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, PredictionError> {
        if let Some(expected) = self.n_features {
            if features.len() != expected {
                return Err(PredictionError::FeatureLength { expected, actual: features.len() });
            }
        }

        let batch = features.to_batch().into_dyn();
        let input = batch.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| PredictionError::Inference(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| PredictionError::Inference(format!("Failed to run model: {}", e)))?;
        let probabilities = outputs[self.probability_output]
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::Inference(format!("Failed to extract probabilities: {}", e)))?;

        // [1, n_classes] for a single-row batch; flatten defensively
        let row: Vec<f32> = probabilities.iter().copied().collect();
        if row.len() != self.classes.len() {
            return Err(PredictionError::ProbabilityCount {
                classes: self.classes.len(),
                probabilities: row.len(),
            });
        }
        Ok(row)
    }
}

/// Reads the class-label sidecar: a JSON array of strings in model order.
pub fn load_class_labels(path: &Path) -> Result<Vec<String>, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::Missing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|source| DataLoadError::Io { path: path.to_path_buf(), source })?;
    let classes: Vec<String> =
        serde_json::from_str(&raw).map_err(|source| DataLoadError::Json { path: path.to_path_buf(), source })?;
    if classes.is_empty() {
        return Err(DataLoadError::Model(format!("Class list {:?} is empty", path)));
    }
    Ok(classes)
}
