//! Terminal front end for the task list: argument parsing, logging setup,
//! and the interactive shell.

pub mod cli;
pub mod error;
pub mod shell;
pub mod telemetry;

pub use error::AppError;
pub use shell::{Command, Flow, Shell};
