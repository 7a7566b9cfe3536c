//! Terminal rendering surface: input parsing and event output.

pub mod terminal;
