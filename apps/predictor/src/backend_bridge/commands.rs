//! Backend commands queued from the terminal to the backend worker.

use client_core::FormState;

pub enum BackendCommand {
    Submit { form: FormState },
    ShowForm,
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Submit { .. } => "submit",
            BackendCommand::ShowForm => "show_form",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
