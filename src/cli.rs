//! CLI argument parsing via clap.

use clap::Parser;

use aic::build_info;

/// Terminal chat assistant backed by a local language model.
///
/// Reads prompts from standard input until `exit` or end-of-input. Working
/// instructions live in ~/.aiCodeAssistant/workingInstructions.md.
#[derive(Debug, Parser)]
#[command(
    name = "aic",
    version = build_info::VERSION,
    long_version = build_info::LONG_VERSION,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {}
