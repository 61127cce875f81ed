use thiserror::Error;

pub type Result<T> = std::result::Result<T, PixframeError>;

#[derive(Error, Debug)]
pub enum PixframeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WiFi join failed: {0}")]
    Connectivity(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("free memory below the 10 KiB floor")]
    ResourceExhausted,
    #[error("Decode or render error: {0}")]
    DecodeOrRender(String),
    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for PixframeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<image::ImageError> for PixframeError {
    fn from(e: image::ImageError) -> Self {
        Self::DecodeOrRender(e.to_string())
    }
}

impl From<serde_json::Error> for PixframeError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConfigValidation(e.to_string())
    }
}
