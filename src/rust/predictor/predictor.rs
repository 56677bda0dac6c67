use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use super::builder::PredictorBuilder;
use super::encoder::encode;
use super::error::{PredictError, SelectionError};
use super::model::ClassifierModel;
use super::presenter::{RankedPrediction, ResultPresenter};
use super::ranker::rank_top_k;
use super::schema::SymptomSchema;

/// Immutable prediction context: schema, classifier, info table and policy.
///
/// Built once at startup and shared by reference. All fields are behind `Arc`,
/// so the predictor is cheap to clone and `Send + Sync`.
///
/// ```rust
/// # use std::sync::Arc;
/// # use symptom_triage::{Predictor, SymptomSchema, ClassifierModel, FeatureVector, PredictionError};
/// # struct Fixed(Vec<String>);
/// # impl ClassifierModel for Fixed {
/// #     fn classes(&self) -> &[String] { &self.0 }
/// #     fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f32>, PredictionError> {
/// #         Ok(vec![0.6, 0.3, 0.1])
/// #     }
/// # }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let predictor = Predictor::builder()
///     .with_schema(SymptomSchema::new(vec!["fever", "cough", "fatigue", "rash"])?)
///     .with_model(Arc::new(Fixed(vec!["Flu".into(), "Cold".into(), "Allergy".into()])))
///     .build()?;
///
/// let results = predictor.predict(&["fever", "cough", "fatigue"])?;
/// assert_eq!(results[0].disease, "Flu");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Predictor {
    pub(crate) model_path: Option<PathBuf>,
    pub(crate) schema: Arc<SymptomSchema>,
    pub(crate) model: Arc<dyn ClassifierModel>,
    pub(crate) presenter: Arc<ResultPresenter>,
    pub(crate) top_k: usize,
    pub(crate) min_symptoms: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Predictor>();
    }
};

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("model_path", &self.model_path)
            .field("symptoms", &self.schema.len())
            .field("classes", &self.model.classes().len())
            .field("top_k", &self.top_k)
            .field("min_symptoms", &self.min_symptoms)
            .finish()
    }
}

impl Predictor {
    /// Creates a new PredictorBuilder for fluent construction
    pub fn builder() -> PredictorBuilder {
        PredictorBuilder::new()
    }

    /// Returns information about the predictor's configuration
    pub fn info(&self) -> super::PredictorInfo {
        super::PredictorInfo {
            model_path: self.model_path.clone(),
            num_symptoms: self.schema.len(),
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            described_diseases: self
                .model
                .classes()
                .iter()
                .filter(|c| self.presenter.info().get(c).is_some())
                .count(),
            top_k: self.top_k,
            min_symptoms: self.min_symptoms,
        }
    }

    pub fn schema(&self) -> &SymptomSchema {
        &self.schema
    }

    pub fn min_symptoms(&self) -> usize {
        self.min_symptoms
    }

    /// Checks the selection-size policy. Counts distinct names only.
    pub fn check_selection<S: AsRef<str>>(&self, selected: &[S]) -> Result<(), SelectionError> {
        let distinct: HashSet<&str> = selected.iter().map(|s| s.as_ref()).collect();
        if distinct.len() < self.min_symptoms {
            return Err(SelectionError::TooFewSymptoms {
                selected: distinct.len(),
                required: self.min_symptoms,
            });
        }
        Ok(())
    }

    /// Top-K `(disease, probability)` pairs for a selection, best first.
    ///
    /// The selection policy is checked before anything is encoded.
    pub fn rank<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<(String, f32)>, PredictError> {
        self.check_selection(selected)?;
        let features = encode(selected, &self.schema)?;
        debug!("Encoded {} symptoms into {} features", selected.len(), features.len());
        Ok(rank_top_k(self.model.as_ref(), &features, self.top_k)?)
    }

    /// Ranks a selection and attaches descriptions and illustrations.
    pub fn predict<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<RankedPrediction>, PredictError> {
        let ranked = self.rank(selected)?;
        if let Some((disease, probability)) = ranked.first() {
            info!("Top prediction: {} ({:.2}%)", disease, probability * 100.0);
        }
        Ok(self.presenter.present(ranked))
    }
}
