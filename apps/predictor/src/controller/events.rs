//! Backend-to-terminal events and error modeling for the front end.

use client_core::{Alert, ControllerEvent, FormView};
use shared::{domain::SubmissionStatus, error::ErrorKind};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    StatusChanged(SubmissionStatus),
    PredictionCleared,
    PredictionUpdated(f64),
    ModelVersionLoaded(String),
    View(FormView),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Info(_) => "info",
            UiEvent::Error(_) => "error",
            UiEvent::StatusChanged(_) => "status_changed",
            UiEvent::PredictionCleared => "prediction_cleared",
            UiEvent::PredictionUpdated(_) => "prediction_updated",
            UiEvent::ModelVersionLoaded(_) => "model_version_loaded",
            UiEvent::View(_) => "view",
        }
    }
}

impl From<ControllerEvent> for UiEvent {
    fn from(value: ControllerEvent) -> Self {
        match value {
            ControllerEvent::StatusChanged(status) => UiEvent::StatusChanged(status),
            ControllerEvent::PredictionCleared => UiEvent::PredictionCleared,
            ControllerEvent::PredictionUpdated(price) => UiEvent::PredictionUpdated(price),
            ControllerEvent::ModelVersionLoaded(version) => UiEvent::ModelVersionLoaded(version),
            ControllerEvent::Alert(alert) => UiEvent::Error(UiError::from_alert(&alert)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Input,
    Network,
    Server,
    Shape,
    Unknown,
}

impl From<ErrorKind> for UiErrorCategory {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Input => UiErrorCategory::Input,
            ErrorKind::Network => UiErrorCategory::Network,
            ErrorKind::Server => UiErrorCategory::Server,
            ErrorKind::Shape => UiErrorCategory::Shape,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Submit,
    General,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Input => "input",
        UiErrorCategory::Network => "network",
        UiErrorCategory::Server => "server",
        UiErrorCategory::Shape => "response",
        UiErrorCategory::Unknown => "error",
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            category: alert.kind().into(),
            context: UiErrorContext::Submit,
            message: alert.message().to_string(),
        }
    }

    /// Classifies free-form failures (startup, config) by their text.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("unsupported")
            || message_lower.contains("must")
        {
            UiErrorCategory::Input
        } else if message_lower.contains("api error")
            || message_lower.contains("status")
        {
            UiErrorCategory::Server
        } else if message_lower.contains("malformed") || message_lower.contains("decode") {
            UiErrorCategory::Shape
        } else if message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("dns")
            || message_lower.contains("transport")
            || message_lower.contains("unreachable")
        {
            UiErrorCategory::Network
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use client_core::PredictionError;

    use super::*;

    #[test]
    fn alert_kind_selects_category() {
        let alert = Alert::for_prediction_error(&PredictionError::Server { status: 500 });
        let err = UiError::from_alert(&alert);
        assert_eq!(err.category(), UiErrorCategory::Server);
        assert_eq!(err.context(), UiErrorContext::Submit);
        assert!(err.message().contains("500"));
    }

    #[test]
    fn classifies_startup_messages() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "invalid api url 'htp//nowhere'",
        );
        assert_eq!(err.category(), UiErrorCategory::Input);

        let err = UiError::from_message(UiErrorContext::General, "connection refused");
        assert_eq!(err.category(), UiErrorCategory::Network);
        assert_eq!(err_label(err.category()), "network");
    }

    #[test]
    fn controller_alerts_become_ui_errors() {
        let alert = Alert::for_prediction_error(&PredictionError::Transport("dns".into()));
        match UiEvent::from(ControllerEvent::Alert(alert)) {
            UiEvent::Error(err) => assert_eq!(err.category(), UiErrorCategory::Network),
            _ => panic!("expected an error event"),
        }
    }
}
