use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobfillError {
    #[error("config error: {0}")]
    Config(String),

    #[error("profile error: {0}")]
    Profile(String),

    #[error("unknown profile field path: {0}")]
    UnknownFieldPath(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
