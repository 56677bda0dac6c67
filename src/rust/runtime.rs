use std::fmt::Display;
use std::sync::OnceLock;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;

/// Outcome of the one-time ONNX Runtime environment setup, kept for every later caller.
static INIT: OnceLock<Result<(), String>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("ONNX Runtime initialization failed: {0}")]
    Init(String),

    #[error(transparent)]
    Ort(#[from] ort::Error),
}

/// ONNX Runtime execution settings for the disease classifier.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl RuntimeConfig {
    /// Settings for a single-session interactive process: intra-op threads only.
    pub fn with_intra_threads(intra_threads: usize) -> Self {
        Self {
            intra_threads,
            ..Self::default()
        }
    }
}

fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

fn init_onnx_environment() -> ort::Result<()> {
    ort::init().with_name("symptom-triage").commit()?;
    Ok(())
}

/// Runs `init` the first time and replays its outcome on every call.
fn initialize_once<E, F>(cell: &OnceLock<Result<(), String>>, init: F) -> Result<(), RuntimeError>
where
    E: Display,
    F: FnOnce() -> Result<(), E>,
{
    cell.get_or_init(|| init().map_err(|e| e.to_string()))
        .clone()
        .map_err(RuntimeError::Init)
}

pub fn ensure_initialized() -> Result<(), RuntimeError> {
    initialize_once(&INIT, init_onnx_environment)
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, RuntimeError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    // Configure threading
    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }

    builder = builder.with_optimization_level(copy_level(&config.optimization_level))?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_initialization() {
        assert!(ensure_initialized().is_ok());
        assert!(ensure_initialized().is_ok()); // Second call should be fine
    }

    #[test]
    fn test_failed_initialization_is_remembered() {
        let cell = OnceLock::new();
        let first = initialize_once(&cell, || Err("no runtime library"));
        assert!(matches!(&first, Err(RuntimeError::Init(msg)) if msg == "no runtime library"));

        let mut ran_again = false;
        let second = initialize_once(&cell, || {
            ran_again = true;
            Ok::<(), String>(())
        });
        assert!(matches!(second, Err(RuntimeError::Init(_))));
        assert!(!ran_again);
    }

    #[test]
    fn test_intra_threads_config() {
        let config = RuntimeConfig::with_intra_threads(2);
        assert_eq!(config.intra_threads, 2);
        assert_eq!(config.inter_threads, 0);
        let cloned = config.clone();
        assert!(matches!(cloned.optimization_level, GraphOptimizationLevel::Level3));
    }

    #[test]
    fn test_session_builder_config() {
        let config = RuntimeConfig {
            inter_threads: 2,
            intra_threads: 2,
            optimization_level: GraphOptimizationLevel::Level1,
        };
        let builder = create_session_builder(&config);
        assert!(builder.is_ok());
    }
}
