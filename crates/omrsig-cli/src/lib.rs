//! omrsig CLI library
//!
//! This module contains the core CLI logic for the omrsig page interpreter.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use omrsig::{PageInterpreter, SigError};

/// Run the omrsig CLI application
///
/// This function reads the page description, interprets every region and
/// writes the survivor report to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SigError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid page descriptions
/// - Report rendering errors
pub fn run(args: &Args) -> Result<(), SigError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing page"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let interpreter = PageInterpreter::new(app_config);
    let sheet = interpreter.parse(&source)?;
    let result = interpreter.process(&sheet)?;
    let report = interpreter.report(&sheet, &result).to_toml()?;

    fs::write(&args.output, report)?;

    info!(output_file = args.output; "Report exported successfully");

    Ok(())
}
