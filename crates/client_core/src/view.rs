use std::fmt;

use shared::domain::{FormField, SubmissionStatus};

use crate::form::FormState;

pub const SUBMIT_LABEL: &str = "Predict Price";
pub const SUBMITTING_LABEL: &str = "Predicting...";

/// What the rendering surface draws for one controller snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub model_version_label: Option<String>,
    pub app_version_label: Option<String>,
    pub fields: Vec<(FormField, String)>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub result_label: Option<String>,
}

impl FormView {
    pub(crate) fn new(
        form: &FormState,
        model_version: Option<&str>,
        app_version: Option<&str>,
        status: SubmissionStatus,
        prediction: Option<f64>,
        form_ready: bool,
    ) -> Self {
        let label = |prefix: &str, value: Option<&str>| {
            value
                .filter(|value| !value.is_empty())
                .map(|value| format!("{prefix}: {value}"))
        };

        Self {
            model_version_label: label("Model Version", model_version),
            app_version_label: label("Frontend Version", app_version),
            fields: FormField::ALL
                .iter()
                .map(|field| (*field, form.get(*field).to_string()))
                .collect(),
            submit_label: if status.is_loading() {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            submit_enabled: form_ready && !status.is_loading(),
            result_label: prediction.map(|price| format!("Predicted Price: ${price}")),
        }
    }
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "House Price Predictor")?;
        for label in [&self.model_version_label, &self.app_version_label]
            .into_iter()
            .flatten()
        {
            writeln!(f, "  {label}")?;
        }
        for (field, value) in &self.fields {
            writeln!(f, "  {}: {value}", field.label())?;
        }
        let state = if self.submit_enabled { "" } else { " (disabled)" };
        writeln!(f, "  [{}]{state}", self.submit_label)?;
        if let Some(result) = &self.result_label {
            writeln!(f, "  {result}")?;
        }
        Ok(())
    }
}
