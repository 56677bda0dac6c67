use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use super::error::DataLoadError;
use super::model::{ClassifierModel, OnnxClassifier};
use super::predictor::Predictor;
use super::presenter::{DiseaseInfo, ResultPresenter};
use super::ranker::DEFAULT_TOP_K;
use super::schema::SymptomSchema;
use crate::artifacts::ArtifactStore;
use crate::runtime::RuntimeConfig;

/// Minimum number of distinct symptoms before a prediction is attempted.
pub const DEFAULT_MIN_SYMPTOMS: usize = 3;

/// A builder for constructing a [`Predictor`] with a fluent interface.
///
/// Components can come from an [`ArtifactStore`], from explicit file paths, or
/// be injected directly (useful for fixture classifiers in tests).
pub struct PredictorBuilder {
    model_path: Option<PathBuf>,
    schema: Option<SymptomSchema>,
    model: Option<Arc<dyn ClassifierModel>>,
    n_features: Option<usize>,
    info: Option<DiseaseInfo>,
    assets_dir: Option<PathBuf>,
    top_k: usize,
    min_symptoms: usize,
    runtime_config: RuntimeConfig,
}

impl Default for PredictorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredictorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorBuilder")
            .field("model_path", &self.model_path)
            .field("schema_len", &self.schema.as_ref().map(SymptomSchema::len))
            .field("has_model", &self.model.is_some())
            .field("assets_dir", &self.assets_dir)
            .field("top_k", &self.top_k)
            .field("min_symptoms", &self.min_symptoms)
            .finish()
    }
}

impl PredictorBuilder {
    /// Creates a new empty PredictorBuilder with default policy (top 3, at least 3 symptoms)
    pub fn new() -> Self {
        Self {
            model_path: None,
            schema: None,
            model: None,
            n_features: None,
            info: None,
            assets_dir: None,
            top_k: DEFAULT_TOP_K,
            min_symptoms: DEFAULT_MIN_SYMPTOMS,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the ONNX Runtime configuration. Must be called before loading a model.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads every component from the standard file layout of `store`.
    ///
    /// # Errors
    /// - Any component was already set
    /// - A file is missing or malformed
    pub fn with_artifacts(self, store: &ArtifactStore) -> Result<Self, DataLoadError> {
        let assets_dir = store.assets_dir();
        if !assets_dir.is_dir() {
            warn!("Assets directory {:?} not found; predictions will have no images", assets_dir);
        }
        self.with_files(
            &store.training_data_path(),
            &store.disease_info_path(),
            &store.model_path(),
            &store.classes_path(),
            Some(assets_dir),
        )
    }

    /// Loads every component from explicit paths.
    pub fn with_files(
        mut self,
        training_data: &Path,
        disease_info: &Path,
        model: &Path,
        classes: &Path,
        assets_dir: Option<PathBuf>,
    ) -> Result<Self, DataLoadError> {
        if self.model.is_some() || self.schema.is_some() {
            return Err(DataLoadError::Build("Schema and classifier already set".to_string()));
        }

        let schema = SymptomSchema::from_training_table(training_data)?;
        let info = DiseaseInfo::from_table(disease_info)?;
        let classifier = OnnxClassifier::load(model, classes, &self.runtime_config)?;

        self.n_features = classifier.n_features();
        self.model_path = Some(classifier.model_path.clone());
        self.model = Some(Arc::new(classifier));
        self.schema = Some(schema);
        self.info = Some(info);
        self.assets_dir = assets_dir;
        Ok(self)
    }

    pub fn with_schema(mut self, schema: SymptomSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Injects a classifier directly.
    pub fn with_model(mut self, model: Arc<dyn ClassifierModel>) -> Self {
        self.model = Some(model);
        self.n_features = None;
        self.model_path = None;
        self
    }

    pub fn with_disease_info(mut self, info: DiseaseInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Number of candidates returned per prediction.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Minimum distinct symptoms required before predicting.
    pub fn with_min_symptoms(mut self, min_symptoms: usize) -> Self {
        self.min_symptoms = min_symptoms;
        self
    }

    /// Builds and returns the final Predictor instance
    ///
    /// # Errors
    /// - No schema or classifier set
    /// - `top_k` is zero
    /// - The classifier declares a feature width different from the schema length
    /// - The classifier has no classes
    pub fn build(self) -> Result<Predictor, DataLoadError> {
        let schema = self
            .schema
            .ok_or_else(|| DataLoadError::Build("Symptom schema must be set".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| DataLoadError::Build("Classifier must be set".to_string()))?;

        if self.top_k == 0 {
            return Err(DataLoadError::Build("top_k must be at least 1".to_string()));
        }
        if model.classes().is_empty() {
            return Err(DataLoadError::Build("Classifier exposes no classes".to_string()));
        }
        if let Some(n_features) = self.n_features {
            if n_features != schema.len() {
                return Err(DataLoadError::Build(format!(
                    "Classifier expects {} features but the training table has {} symptoms",
                    n_features,
                    schema.len()
                )));
            }
        }

        let info = self.info.unwrap_or_default();
        let missing = model.classes().iter().filter(|c| info.get(c).is_none()).count();
        if missing > 0 {
            warn!("{} of {} diseases have no description", missing, model.classes().len());
        }
        info!(
            "Predictor built: {} symptoms, {} diseases, top {}",
            schema.len(),
            model.classes().len(),
            self.top_k
        );

        Ok(Predictor {
            model_path: self.model_path,
            schema: Arc::new(schema),
            model,
            presenter: Arc::new(ResultPresenter::new(info, self.assets_dir)),
            top_k: self.top_k,
            min_symptoms: self.min_symptoms,
        })
    }
}
