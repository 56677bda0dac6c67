//! Disease ranking from selected symptoms, plus a health chat assistant.
//!
//! A set of symptom names is one-hot encoded against the classifier's symptom
//! schema, scored by an ONNX classifier, and the top candidates are returned
//! with a description and an optional illustration.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use symptom_triage::{ArtifactStore, Predictor};
//!
//! let store = ArtifactStore::new("/srv/symptom-triage");
//! let predictor = Predictor::builder()
//!     .with_artifacts(&store)?
//!     .build()?;
//!
//! for result in predictor.predict(&["itching", "skin_rash", "nodal_skin_eruptions"])? {
//!     println!("{}: {}", result.caption(), result.about);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A [`Predictor`] is immutable after `build()` and can be shared across
//! threads; cloning it only bumps reference counts.

pub mod app;
pub mod artifacts;
pub mod assistant;
pub mod config;
pub mod predictor;
mod runtime;
pub mod shell;

pub use app::{render, App, AppState, Event, PredictionView};
pub use artifacts::ArtifactStore;
pub use assistant::{Assistant, AssistantError, ChatSession, GeminiAssistant, Message, Transcript};
pub use config::{AppConfig, ConfigError};
pub use predictor::{
    encode, rank_top_k, ClassifierModel, DataLoadError, DiseaseInfo, FeatureVector, OnnxClassifier, PredictError,
    PredictionError, Predictor, PredictorBuilder, PredictorInfo, RankedPrediction, SelectionError, SymptomSchema,
    UnknownSymptomError,
};
pub use runtime::{create_session_builder, RuntimeConfig, RuntimeError};

pub fn init_logger() {
    env_logger::init();
}
