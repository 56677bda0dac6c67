use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::DataLoadError;

/// Text shown when the info table has no entry for a disease.
pub const INFO_FALLBACK: &str = "Information not available.";

/// Extension of the per-disease illustration files.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Descriptive text per disease label, keyed by the exact label string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiseaseInfo {
    about: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct InfoRow {
    disease: String,
    about: String,
}

impl DiseaseInfo {
    pub fn new(about: HashMap<String, String>) -> Self {
        Self { about }
    }

    /// Loads a CSV table with `disease` and `about` columns.
    ///
    /// Other columns are ignored. If a disease appears twice the last row wins.
    /// A blank `about` cell counts as no description.
    pub fn from_table(path: &Path) -> Result<Self, DataLoadError> {
        if !path.exists() {
            return Err(DataLoadError::Missing(path.to_path_buf()));
        }
        info!("Loading disease info from {:?}", path);

        let csv_error = |source: csv::Error| DataLoadError::Csv { path: path.to_path_buf(), source };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
            .map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?;
        for required in ["disease", "about"] {
            if !headers.iter().any(|h| h == required) {
                return Err(DataLoadError::InvalidInfoTable(format!(
                    "{:?} has no '{}' column",
                    path, required
                )));
            }
        }

        let mut about = HashMap::new();
        for row in reader.deserialize::<InfoRow>() {
            let row = row.map_err(csv_error)?;
            if row.about.trim().is_empty() {
                about.remove(&row.disease);
            } else {
                about.insert(row.disease, row.about);
            }
        }
        info!("Loaded descriptions for {} diseases", about.len());
        Ok(Self { about })
    }

    /// The description for `disease`, if the table has one.
    pub fn get(&self, disease: &str) -> Option<&str> {
        self.about.get(disease).map(String::as_str)
    }

    /// The description for `disease`, or [`INFO_FALLBACK`].
    pub fn describe(&self, disease: &str) -> &str {
        self.get(disease).unwrap_or(INFO_FALLBACK)
    }

    pub fn len(&self) -> usize {
        self.about.len()
    }

    pub fn is_empty(&self) -> bool {
        self.about.is_empty()
    }
}

/// Illustration file name for a disease: the label with every space removed,
/// case preserved, plus `.jpg`. `"Common Cold"` becomes `CommonCold.jpg`.
pub fn image_filename(disease: &str) -> String {
    let stem: String = disease.chars().filter(|&c| c != ' ').collect();
    format!("{}.{}", stem, IMAGE_EXTENSION)
}

/// One explained candidate disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub disease: String,
    pub probability: f32,
    pub about: String,
    pub image: Option<PathBuf>,
}

impl RankedPrediction {
    /// Display caption, e.g. `Flu (60.00%)`.
    pub fn caption(&self) -> String {
        format!("{} ({:.2}%)", self.disease, self.probability * 100.0)
    }
}

/// Attaches descriptions and illustrations to ranked labels.
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    info: DiseaseInfo,
    assets_dir: Option<PathBuf>,
}

impl ResultPresenter {
    pub fn new(info: DiseaseInfo, assets_dir: Option<PathBuf>) -> Self {
        Self { info, assets_dir }
    }

    pub fn info(&self) -> &DiseaseInfo {
        &self.info
    }

    /// Path of the illustration for `disease`, if the file exists.
    pub fn image_for(&self, disease: &str) -> Option<PathBuf> {
        let path = self.assets_dir.as_ref()?.join(image_filename(disease));
        if path.is_file() {
            Some(path)
        } else {
            debug!("No illustration for '{}' at {:?}", disease, path);
            None
        }
    }

    pub fn present(&self, ranked: Vec<(String, f32)>) -> Vec<RankedPrediction> {
        ranked
            .into_iter()
            .map(|(disease, probability)| RankedPrediction {
                about: self.info.describe(&disease).to_string(),
                image: self.image_for(&disease),
                disease,
                probability,
            })
            .collect()
    }
}
