use client_core::FormState;
use crossbeam_channel::Receiver;
use shared::domain::SubmissionStatus;

use crate::controller::events::{err_label, UiErrorContext, UiEvent};

pub const HELP: &str = "Enter `<size> <bedrooms> <age>` to predict a price (e.g. `1500 3 10`).\n\
Commands: `show` prints the form, `help` prints this text, `quit` exits.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Submit(FormState),
    Show,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Splits a line on whitespace or commas. Values stay raw text; the form
/// controller decides whether they are valid numbers.
pub fn parse_input_line(line: &str) -> InputLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Empty;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return InputLine::Quit,
        "show" => return InputLine::Show,
        "help" | "?" => return InputLine::Help,
        _ => {}
    }

    let parts: Vec<&str> = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        [size, bedrooms, age] => InputLine::Submit(FormState::new(*size, *bedrooms, *age)),
        _ => InputLine::Invalid(format!(
            "expected three values (size bedrooms age), got {}",
            parts.len()
        )),
    }
}

pub fn render_event(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::Info(message) => Some(message.clone()),
        UiEvent::Error(err) if err.context() == UiErrorContext::BackendStartup => Some(format!(
            "[{}] backend unavailable: {}",
            err_label(err.category()),
            err.message()
        )),
        UiEvent::Error(err) => Some(format!("[{}] {}", err_label(err.category()), err.message())),
        UiEvent::StatusChanged(SubmissionStatus::Submitting) => Some("Predicting...".to_string()),
        UiEvent::StatusChanged(SubmissionStatus::Idle) | UiEvent::PredictionCleared => None,
        UiEvent::PredictionUpdated(price) => Some(format!("Predicted Price: ${price}")),
        UiEvent::ModelVersionLoaded(version) => Some(format!("Model Version: {version}")),
        UiEvent::View(view) => Some(view.to_string().trim_end().to_string()),
    }
}

/// Prints events until the backend side of the queue is gone.
pub fn render_events(ui_rx: Receiver<UiEvent>) {
    for event in ui_rx.iter() {
        if let Some(line) = render_event(&event) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::UiError;

    #[test]
    fn parses_space_and_comma_separated_values() {
        assert_eq!(
            parse_input_line(" 1500 3 10 "),
            InputLine::Submit(FormState::new("1500", "3", "10"))
        );
        assert_eq!(
            parse_input_line("1500,3, 10"),
            InputLine::Submit(FormState::new("1500", "3", "10"))
        );
    }

    #[test]
    fn keeps_non_numeric_values_for_the_controller_to_reject() {
        assert_eq!(
            parse_input_line("big 3 10"),
            InputLine::Submit(FormState::new("big", "3", "10"))
        );
    }

    #[test]
    fn recognizes_commands_and_bad_arity() {
        assert_eq!(parse_input_line("QUIT"), InputLine::Quit);
        assert_eq!(parse_input_line("show"), InputLine::Show);
        assert_eq!(parse_input_line(""), InputLine::Empty);
        assert!(matches!(parse_input_line("1500 3"), InputLine::Invalid(_)));
    }

    #[test]
    fn renders_prediction_and_errors() {
        assert_eq!(
            render_event(&UiEvent::PredictionUpdated(250000.0)).as_deref(),
            Some("Predicted Price: $250000")
        );
        assert_eq!(render_event(&UiEvent::PredictionCleared), None);
        let rendered = render_event(&UiEvent::Error(UiError::from_message(
            UiErrorContext::General,
            "connection refused",
        )))
        .expect("rendered");
        assert_eq!(rendered, "[network] connection refused");
    }
}
