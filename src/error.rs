use thiserror::Error;

#[derive(Error, Debug)]
pub enum TixError {
    #[error("Jira API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal initialization failed: {0}")]
    Init(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TixError>;
