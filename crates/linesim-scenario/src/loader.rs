//! Reads scenario files: format detection (RON/TOML/JSON) and
//! deserialization into a validated [`ScenarioConfig`].

use linesim_core::graph::GraphError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ScenarioConfig;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a scenario or assembling its line.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A parameter is out of range.
    #[error("invalid parameter {field}: {detail}")]
    InvalidParameter { field: &'static str, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The assembled graph or one of its trees was rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported scenario file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, ScenarioError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ScenarioError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `origin` only labels errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, ScenarioError> {
    let parse_error = |detail: String| ScenarioError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, ScenarioError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Load and validate a scenario file.
pub fn load_config(path: &Path) -> Result<ScenarioConfig, ScenarioError> {
    let config: ScenarioConfig = deserialize_file(path)?;
    config.validate()?;
    info!(file = %path.display(), seed = config.simulation.seed, "scenario loaded");
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "linesim_scenario_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("line.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("line.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("line.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["line.yaml", "line"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(ScenarioError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // load_config
    // -----------------------------------------------------------------------

    #[test]
    fn load_partial_toml_keeps_defaults() {
        let dir = make_test_dir("toml");
        let path = dir.join("line.toml");
        fs::write(
            &path,
            "[simulation]\nseed = 7\n\n[boat]\ncapacity = 1500.0\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.boat.capacity, 1500.0);
        assert_eq!(config.train, ScenarioConfig::default().train);

        cleanup(&dir);
    }

    #[test]
    fn load_ron() {
        let dir = make_test_dir("ron");
        let path = dir.join("line.ron");
        fs::write(&path, "(train: (wagons: 6), mine: (constant_yield: Some(30.0)))").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.train.wagons, 6);
        assert_eq!(config.mine.constant_yield, Some(30.0));

        cleanup(&dir);
    }

    #[test]
    fn load_json() {
        let dir = make_test_dir("json");
        let path = dir.join("line.json");
        fs::write(&path, r#"{"shipment": {"speed_per_hour": 200.0}}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.shipment.speed_per_hour, 200.0);

        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_file() {
        let dir = make_test_dir("parse_error");
        let path = dir.join("line.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(&path).unwrap_err();
        match err {
            ScenarioError::Parse { file, .. } => assert_eq!(file, path),
            other => panic!("expected a parse error, got {other:?}"),
        }

        cleanup(&dir);
    }

    #[test]
    fn invalid_values_rejected_after_parse() {
        let dir = make_test_dir("invalid");
        let path = dir.join("line.toml");
        fs::write(&path, "[treatment]\nspeed_per_hour = -5.0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::InvalidParameter { field: "treatment.speed_per_hour", .. }
        ));

        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/linesim/line.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
