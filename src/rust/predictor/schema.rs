use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use super::error::DataLoadError;

/// Number of trailing non-symptom columns in the training table (label + metadata).
pub const TRAILING_COLUMNS: usize = 2;

/// The ordered list of symptom names the classifier was trained on.
///
/// Position `i` in every [`FeatureVector`](super::FeatureVector) corresponds to
/// `names()[i]`. The schema is immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SymptomSchema {
    /// Builds a schema from symptom names in feature order.
    ///
    /// Names must be non-empty and unique.
    pub fn new(names: Vec<impl Into<String>>) -> Result<Self, DataLoadError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(DataLoadError::InvalidSchema("Schema has no symptoms".into()));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(DataLoadError::InvalidSchema(format!("Column {} has an empty name", i + 1)));
            }
            if positions.insert(name.clone(), i).is_some() {
                return Err(DataLoadError::InvalidSchema(format!("Duplicate symptom column '{}'", name)));
            }
        }

        Ok(Self { names, positions })
    }

    /// Derives the schema from a training table header: every column except the last two.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self, DataLoadError> {
        if header.len() <= TRAILING_COLUMNS {
            return Err(DataLoadError::InvalidSchema(format!(
                "Training table needs at least {} columns, found {}",
                TRAILING_COLUMNS + 1,
                header.len()
            )));
        }
        let symptoms = &header[..header.len() - TRAILING_COLUMNS];
        Self::new(symptoms.iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>())
    }

    /// Reads the header row of the training CSV and derives the schema from it.
    ///
    /// Only the header is parsed; the training rows are never loaded.
    pub fn from_training_table(path: &Path) -> Result<Self, DataLoadError> {
        if !path.exists() {
            return Err(DataLoadError::Missing(path.to_path_buf()));
        }
        info!("Loading symptom schema from {:?}", path);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|source| DataLoadError::Csv { path: path.to_path_buf(), source })?;
        let header = reader
            .headers()
            .map_err(|source| DataLoadError::Csv { path: path.to_path_buf(), source })?;
        let columns: Vec<&str> = header.iter().collect();
        debug!("Training table has {} columns", columns.len());

        let schema = Self::from_header(&columns)?;
        info!("Symptom schema loaded with {} symptoms", schema.len());
        Ok(schema)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Feature position of a symptom, if it is part of the schema.
    pub fn position(&self, symptom: &str) -> Option<usize> {
        self.positions.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.positions.contains_key(symptom)
    }
}
