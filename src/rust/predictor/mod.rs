use std::path::PathBuf;

mod error;
mod encoder;
mod schema;
mod model;
mod ranker;
mod presenter;
pub mod builder;
#[allow(clippy::module_inception)]
mod predictor;

pub use error::{DataLoadError, PredictError, PredictionError, SelectionError, UnknownSymptomError};
pub use encoder::{encode, FeatureVector};
pub use schema::{SymptomSchema, TRAILING_COLUMNS};
pub use model::{load_class_labels, ClassifierModel, OnnxClassifier};
pub use ranker::{rank_top_k, DEFAULT_TOP_K};
pub use presenter::{image_filename, DiseaseInfo, RankedPrediction, ResultPresenter, IMAGE_EXTENSION, INFO_FALLBACK};
pub use builder::{PredictorBuilder, DEFAULT_MIN_SYMPTOMS};
pub use predictor::Predictor;

/// Information about a loaded predictor
#[derive(Debug, Clone)]
pub struct PredictorInfo {
    /// Path to the ONNX model file, if the classifier was loaded from disk
    pub model_path: Option<PathBuf>,
    /// Number of symptoms in the feature schema
    pub num_symptoms: usize,
    /// Number of diseases the classifier distinguishes
    pub num_classes: usize,
    /// Disease labels in classifier order
    pub class_labels: Vec<String>,
    /// How many of those diseases have a description
    pub described_diseases: usize,
    /// Candidates returned per prediction
    pub top_k: usize,
    /// Minimum distinct symptoms before predicting
    pub min_symptoms: usize,
}
