use std::path::PathBuf;

/// Errors produced by the board model, the search engine and the artifact writers.
#[derive(Debug, thiserror::Error)]
pub enum Connect4Error {
    #[error("illegal move in column {column}: {reason}")]
    IllegalMove { column: usize, reason: &'static str },

    #[error("could not parse '{0}' as a valid move")]
    Parse(char),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Connect4Error {
    pub(crate) fn invalid_config<S: Into<String>>(message: S) -> Self {
        Connect4Error::InvalidConfiguration(message.into())
    }
}

pub type Result<T, E = Connect4Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_move_display() {
        let err = Connect4Error::IllegalMove {
            column: 3,
            reason: "column is full",
        };
        assert_eq!(err.to_string(), "illegal move in column 3: column is full");
    }

    #[test]
    fn test_invalid_configuration_display() {
        let err = Connect4Error::invalid_config("depth must be >= 1");
        assert_eq!(
            err.to_string(),
            "invalid configuration: depth must be >= 1"
        );
    }

    #[test]
    fn test_io_display_names_path() {
        let err = Connect4Error::Io {
            path: PathBuf::from("outputs/tree.dot"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write outputs/tree.dot: denied");
    }
}
