use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no platform configuration directory is available")]
    ConfigDirUnavailable,

    #[error("preferences i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file {path} is not valid json: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("preferences file {0} must contain a json object of strings")]
    NotAnObject(PathBuf),

    #[error("preferences serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("preferences lock was poisoned")]
    Poisoned,
}
