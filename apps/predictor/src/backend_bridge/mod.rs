//! Bridge between the terminal front end and the async backend worker.

pub mod commands;
pub mod runtime;
