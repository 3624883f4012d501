use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Counter(#[from] crate::counter::CounterError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("could not open audio output stream: {0}")]
    AudioBuild(#[from] cpal::BuildStreamError),

    #[error("could not start audio output stream: {0}")]
    AudioPlay(#[from] cpal::PlayStreamError),

    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("{tool}: {message}")]
    Tool { tool: &'static str, message: String },

    #[error("unsupported wav layout: {0}")]
    UnsupportedWav(String),

    #[error("{0}")]
    Config(String),
}

impl DeckError {
    pub fn tool(tool: &'static str, message: impl Into<String>) -> Self {
        Self::Tool {
            tool,
            message: message.into(),
        }
    }
}
