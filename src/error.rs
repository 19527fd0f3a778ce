use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open audio file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to probe audio format: {path}")]
    Probe {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("failed to decode audio: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("no audio tracks found: {path}")]
    NoAudioTrack { path: PathBuf },

    #[error("unknown sample rate: {path}")]
    UnknownSampleRate { path: PathBuf },

    #[error("resampling from {from} Hz to {to} Hz failed: {message}")]
    Resample { from: u32, to: u32, message: String },

    /// Silent or constant signal, the envelope cannot be normalised.
    #[error("degenerate signal: envelope has no dynamic range")]
    DegenerateSignal,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write WAV file '{path}'")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
