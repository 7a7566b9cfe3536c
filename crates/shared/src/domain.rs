use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Size,
    Bedrooms,
    Age,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Size, FormField::Bedrooms, FormField::Age];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Size => "Size (sq ft)",
            FormField::Bedrooms => "Bedrooms",
            FormField::Age => "Age (years)",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::Size => "size",
            FormField::Bedrooms => "bedrooms",
            FormField::Age => "age",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
}

impl SubmissionStatus {
    pub fn is_loading(self) -> bool {
        self == SubmissionStatus::Submitting
    }
}
