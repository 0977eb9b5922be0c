use log::warn;
use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

use crate::error::{Connect4Error, Result};
use crate::search::{Algorithm, SearchConfig};

/// Search settings used when the command line doesn't give any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub algorithm: Algorithm,
    pub depth: usize,
    pub trace_depth: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        SearchSection {
            algorithm: Algorithm::AlphaBeta,
            depth: 5,
            trace_depth: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory that comparison artifacts and snapshots are written to
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        OutputSection {
            dir: PathBuf::from("outputs"),
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchSection,
    pub output: OutputSection,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Connect4Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.dir.as_os_str().is_empty() {
            return Err(Connect4Error::invalid_config("output.dir must not be empty"));
        }
        self.search_config().validate()
    }

    /// The configured search, tracing down to `search.trace_depth`
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search.algorithm, self.search.depth)
            .with_trace(self.search.trace_depth)
    }

    /// A TOML string with all default values, for writing a starter config file.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&AppConfig::default())
            .map_err(|err| Connect4Error::invalid_config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.search_config().trace_depth, Some(3));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[search]
algorithm = "minimax"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search.algorithm, Algorithm::Minimax);
        assert_eq!(config.search.depth, 5);
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_algorithm_is_a_parse_error() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
[search]
algorithm = "negamax"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let mut config = AppConfig::default();
        config.search.depth = 0;
        config.search.trace_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(Connect4Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validation_rejects_deep_trace() {
        let mut config = AppConfig::default();
        config.search.trace_depth = config.search.depth + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_output_dir() {
        let mut config = AppConfig::default();
        config.output.dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[search]
depth = 7
trace_depth = 2

[output]
dir = "artifacts"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.search.depth, 7);
        assert_eq!(config.search.trace_depth, 2);
        assert_eq!(config.search.algorithm, Algorithm::AlphaBeta);
        assert_eq!(config.output.dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[search]\ndepth = 2\ntrace_depth = 4\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(Connect4Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_load_reports_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[search\ndepth = ").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(Connect4Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
