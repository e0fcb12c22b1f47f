//! Validators that decide whether a generated artifact is usable.

mod command;
mod file_size;

pub use command::{CommandValidator, CommandValidatorConfig};
pub use file_size::FileSizeValidator;
