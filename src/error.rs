use thiserror::Error;

#[derive(Error, Debug)]
pub enum RooftopError {
    #[error("account '{0}' not found")]
    AccountNotFound(String),

    #[error("invalid stage '{0}'")]
    InvalidStage(String),

    #[error("illegal sub-stage transition from '{0}' to '{1}'")]
    IllegalTransition(String, String),

    #[error("unknown patch field '{0}'")]
    UnknownPatchField(String),

    #[error("invalid patch value for '{field}': {message}")]
    InvalidPatchValue { field: String, message: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("selection is not homogeneous: {0}")]
    MixedSelection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RooftopError>;
