use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by a streaming sink. Carried through [`Error::Sink`] with
/// the original error preserved as the source.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by chat and embedding calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The request payload could not be built from the prompt.
    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Network failure, malformed HTTP response, or an error body that could
    /// not itself be decoded.
    #[error("transport: {0}")]
    Transport(String),

    /// The backend reported an error, either via an in-band `error` field or
    /// an HTTP error status with a decodable error body.
    #[error("provider error: {message}")]
    Provider {
        /// HTTP status when the error came from the status band. In-band
        /// error frames carry no status.
        status: Option<StatusCode>,
        message: String,
    },

    /// The caller's cancellation token fired before completion.
    #[error("cancelled")]
    Cancelled,

    /// The caller-supplied sink returned an error; streaming stopped at that
    /// chunk and no further frames were delivered.
    #[error("sink: {0}")]
    Sink(#[source] SinkError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
