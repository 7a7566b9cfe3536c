use shared::error::{ErrorKind, ErrorReport, InputError};
use thiserror::Error;

/// Alert text shown when the service cannot be reached at all.
pub const PREDICTION_FAILED_ALERT: &str = "Error predicting price. Make sure API is running.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error: {status}")]
    Server { status: u16 },
    #[error("malformed response: {0}")]
    Shape(String),
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::Transport(_) => ErrorKind::Network,
            PredictionError::Server { .. } => ErrorKind::Server,
            PredictionError::Shape(_) => ErrorKind::Shape,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PredictionError::Server { status } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        PredictionError::Transport(err.to_string())
    }

    /// Errors raised while reading a 2xx body: decode failures are shape errors,
    /// anything else means the connection broke mid-body.
    pub(crate) fn from_body(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PredictionError::Shape(err.to_string())
        } else {
            PredictionError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("submission {ticket} was superseded by a newer submission")]
    Superseded { ticket: u64 },
    #[error("form controller is closed")]
    Closed,
}

impl SubmitError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SubmitError::Input(_) => Some(ErrorKind::Input),
            SubmitError::Prediction(err) => Some(err.kind()),
            SubmitError::Superseded { .. } | SubmitError::Closed => None,
        }
    }
}

/// User-facing alert raised by a failed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    kind: ErrorKind,
    message: String,
}

impl Alert {
    pub fn for_prediction_error(err: &PredictionError) -> Self {
        let message = match err {
            PredictionError::Transport(_) => PREDICTION_FAILED_ALERT.to_string(),
            PredictionError::Server { status } => {
                format!("Error predicting price: the API responded with status {status}.")
            }
            PredictionError::Shape(_) => {
                "Error predicting price: the API sent a response that could not be read."
                    .to_string()
            }
        };
        Self {
            kind: err.kind(),
            message,
        }
    }

    pub fn for_input_error(err: &InputError) -> Self {
        Self {
            kind: ErrorKind::Input,
            message: format!("Check the {} field: {err}.", err.field().label()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&Alert> for ErrorReport {
    fn from(value: &Alert) -> Self {
        ErrorReport::new(value.kind, value.message.clone())
    }
}
