use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::predictor::DataLoadError;

pub const TRAINING_DATA_FILE: &str = "training_data.csv";
pub const DISEASE_INFO_FILE: &str = "dis_info.csv";
pub const MODEL_FILE: &str = "model.onnx";
pub const CLASSES_FILE: &str = "classes.json";
pub const ASSETS_DIR: &str = "static";
pub const CHECKSUMS_FILE: &str = "checksums.json";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SYMPTOM_TRIAGE_DATA";

/// Locates the prediction inputs inside one data directory and checks their integrity.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates an ArtifactStore rooted at the default data directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_data_dir())
    }

    /// Returns the default data directory path
    pub fn get_default_data_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(DATA_DIR_ENV) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("symptom-triage");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("symptom-triage");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("symptom-triage")
    }

    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn training_data_path(&self) -> PathBuf {
        self.data_dir.join(TRAINING_DATA_FILE)
    }

    pub fn disease_info_path(&self) -> PathBuf {
        self.data_dir.join(DISEASE_INFO_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(MODEL_FILE)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.data_dir.join(CLASSES_FILE)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join(ASSETS_DIR)
    }

    pub fn checksums_path(&self) -> PathBuf {
        self.data_dir.join(CHECKSUMS_FILE)
    }

    /// Required files that do not exist. Images are optional and never listed.
    pub fn missing_artifacts(&self) -> Vec<PathBuf> {
        [
            self.training_data_path(),
            self.disease_info_path(),
            self.model_path(),
            self.classes_path(),
        ]
        .into_iter()
        .filter(|path| !path.exists())
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        let missing = self.missing_artifacts();
        log::info!("Checking data directory {:?}:", self.data_dir);
        for path in &missing {
            log::info!("  Missing: {:?}", path);
        }
        missing.is_empty()
    }

    fn hash_file(path: &Path) -> Result<String, DataLoadError> {
        let bytes = fs::read(path).map_err(|source| DataLoadError::Io { path: path.to_path_buf(), source })?;
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Compares the SHA-256 of `path` with `expected_hash` (lowercase hex).
    pub fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, DataLoadError> {
        log::info!("Verifying file: {:?}", path);
        let hash = Self::hash_file(path)?;
        log::debug!("Calculated hash: {}", hash);
        log::debug!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash.trim()))
    }

    /// Verifies every file listed in `checksums.json` (file name → SHA-256).
    ///
    /// Returns the number of files checked; `0` when there is no manifest.
    ///
    /// # Errors
    /// - `Missing` if a listed file does not exist
    /// - `HashMismatch` on the first file whose digest differs
    pub fn verify_checksums(&self) -> Result<usize, DataLoadError> {
        let manifest_path = self.checksums_path();
        if !manifest_path.exists() {
            log::info!("No checksum manifest at {:?}, skipping verification", manifest_path);
            return Ok(0);
        }

        let raw = fs::read_to_string(&manifest_path)
            .map_err(|source| DataLoadError::Io { path: manifest_path.clone(), source })?;
        let manifest: BTreeMap<String, String> = serde_json::from_str(&raw)
            .map_err(|source| DataLoadError::Json { path: manifest_path.clone(), source })?;

        for (file, expected) in &manifest {
            let path = self.data_dir.join(file);
            if !path.exists() {
                log::error!("File listed in checksum manifest is missing: {:?}", path);
                return Err(DataLoadError::Missing(path));
            }
            let actual = Self::hash_file(&path)?;
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                log::error!("{} hash mismatch: expected {}, got {}", file, expected, actual);
                return Err(DataLoadError::HashMismatch {
                    file: file.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        log::info!("Verified {} files against {:?}", manifest.len(), manifest_path);
        Ok(manifest.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_layout() {
        let store = ArtifactStore::new("/data/triage");
        assert_eq!(store.training_data_path(), PathBuf::from("/data/triage/training_data.csv"));
        assert_eq!(store.disease_info_path(), PathBuf::from("/data/triage/dis_info.csv"));
        assert_eq!(store.model_path(), PathBuf::from("/data/triage/model.onnx"));
        assert_eq!(store.classes_path(), PathBuf::from("/data/triage/classes.json"));
        assert_eq!(store.assets_dir(), PathBuf::from("/data/triage/static"));
    }

    #[test]
    fn test_missing_artifacts() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.missing_artifacts().len(), 4);

        fs::write(store.training_data_path(), "a,b,c,prognosis,\n")?;
        fs::write(store.classes_path(), "[\"Flu\"]")?;
        assert_eq!(store.missing_artifacts(), vec![store.disease_info_path(), store.model_path()]);
        assert!(!store.is_complete());
        Ok(())
    }

    #[test]
    fn test_verify_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("model.onnx");
        fs::write(&path, "hello")?;

        assert!(store.verify_file(&path, HELLO_SHA256)?);
        fs::write(&path, "corrupted data")?;
        assert!(!store.verify_file(&path, HELLO_SHA256)?);
        Ok(())
    }

    #[test]
    fn test_verify_checksums() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.verify_checksums()?, 0);

        fs::write(dir.path().join("model.onnx"), "hello")?;
        fs::write(store.checksums_path(), format!("{{\"model.onnx\": \"{}\"}}", HELLO_SHA256))?;
        assert_eq!(store.verify_checksums()?, 1);

        fs::write(dir.path().join("model.onnx"), "tampered")?;
        assert!(matches!(store.verify_checksums(), Err(DataLoadError::HashMismatch { .. })));

        fs::write(store.checksums_path(), "{\"classes.json\": \"00\"}")?;
        assert!(matches!(store.verify_checksums(), Err(DataLoadError::Missing(_))));
        Ok(())
    }

    #[test]
    fn test_default_data_dir() {
        // Test with environment variable
        env::set_var(DATA_DIR_ENV, "/tmp/test-triage-data");
        let path = ArtifactStore::get_default_data_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-triage-data"));
        env::remove_var(DATA_DIR_ENV);

        // Test without environment variable
        let path = ArtifactStore::get_default_data_dir();
        assert!(path.to_string_lossy().contains("symptom-triage"));
    }
}
