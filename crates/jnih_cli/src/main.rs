// jnih CLI entry point
use clap::Parser;
use jnih_build::ConfigError;
use jnih_cli::{init_logging, normalize_legacy_args, run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_legacy_args(std::env::args_os()));
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            for failure in &report.failures {
                eprintln!("error: {}: {}", failure.class, failure.error);
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("error: {:#}", error);
            match error.downcast_ref::<ConfigError>() {
                Some(ConfigError::AmbiguousOutputTarget) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
