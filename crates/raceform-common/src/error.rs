use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaceformError {
    /// The race record itself is unusable (no runners, anonymous runner).
    /// Ranking cannot produce a partial result from a broken record.
    #[error("invalid race record: {0}")]
    InvalidRace(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RaceformError>;
