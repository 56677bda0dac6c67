use std::io;
use std::path::PathBuf;

use ort::Error as OrtError;

use crate::runtime::RuntimeError;

/// A selected symptom that is not part of the classifier's schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown symptom: '{symptom}'")]
pub struct UnknownSymptomError {
    pub symptom: String,
}

/// Caller-level policy on the symptom selection, checked before encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Select at least {required} symptoms ({selected} selected)")]
    TooFewSymptoms { selected: usize, required: usize },
}

/// Failures while loading any of the prediction inputs.
///
/// These disable the prediction feature only; the chat keeps working.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("Required file not found: {0:?}")]
    Missing(PathBuf),
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed table {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Malformed JSON {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid symptom schema: {0}")]
    InvalidSchema(String),
    #[error("Invalid disease info table: {0}")]
    InvalidInfoTable(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Build error: {0}")]
    Build(String),
}

impl From<OrtError> for DataLoadError {
    fn from(err: OrtError) -> Self {
        DataLoadError::Model(err.to_string())
    }
}

impl From<RuntimeError> for DataLoadError {
    fn from(err: RuntimeError) -> Self {
        DataLoadError::Model(err.to_string())
    }
}

/// Failures while scoring a feature vector.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Feature vector has length {actual}, classifier expects {expected}")]
    FeatureLength { expected: usize, actual: usize },
    #[error("Classifier returned {probabilities} probabilities for {classes} classes")]
    ProbabilityCount { classes: usize, probabilities: usize },
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl From<OrtError> for PredictionError {
    fn from(err: OrtError) -> Self {
        PredictionError::Inference(err.to_string())
    }
}

/// Everything that can go wrong for a single prediction request.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    UnknownSymptom(#[from] UnknownSymptomError),
    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),
}
