use thiserror::Error;

#[derive(Error, Debug)]
pub enum LakeError {
    #[error("unable to bind {endpoint} endpoint on {addr}: {source}")]
    Bind {
        endpoint: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lake is already running")]
    AlreadyRunning,
    #[error("cannot start when shutting down")]
    ShuttingDown,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, LakeError>;
