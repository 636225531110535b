// jnih_cli - command line front end (library interface for testing)
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use jnih_build::{ClassRequest, GenerationReport, GeneratorConfig, HeaderGenerator};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jnih")]
#[command(version)]
#[command(about = "Generate JNI C headers from compiled Java classes")]
pub struct Cli {
    /// Classes to process: `a.b.C`, `a/b/C` or `module/a.b.C`
    #[arg(required = true, value_name = "CLASSES")]
    pub classes: Vec<String>,

    /// Write every header into this single file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write one header per class into this directory
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Classpath entries; may be repeated or separator-joined
    #[arg(
        long = "class-path",
        visible_aliases = ["classpath", "cp"],
        value_name = "PATH"
    )]
    pub class_path: Vec<String>,

    /// Directories of jmods or modular jars
    #[arg(short = 'p', long = "module-path", value_name = "PATH")]
    pub module_path: Vec<String>,

    /// Do not search the JDK standard library
    #[arg(long)]
    pub no_runtime: bool,

    /// JDK used for standard library lookups
    #[arg(long, value_name = "DIR")]
    pub java_home: Option<PathBuf>,

    /// TOML configuration file; command line flags take precedence
    #[arg(long, value_name = "FILE", env = "JNIH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Rewrites the single-dash spellings the JDK tools accept into their
/// clap equivalents. Arguments after `--` are left alone.
pub fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let replacement = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some("-cp") | Some("-classpath") => Some("--class-path"),
                Some("-version") => Some("--version"),
                Some("-help") | Some("-?") => Some("--help"),
                _ => None,
            };
            replacement.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

/// Installs the stderr subscriber. `-v` flags win over `RUST_LOG`.
pub fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Layers command line flags over the configuration file (if any).
pub fn resolve_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if !cli.class_path.is_empty() {
        config.classpath = cli.class_path.clone();
    }
    if config.classpath.is_empty() {
        config.classpath.push(".".to_string());
    }
    if !cli.module_path.is_empty() {
        config.module_path = cli.module_path.clone();
    }
    if cli.no_runtime {
        config.use_runtime = false;
    }
    if let Some(java_home) = &cli.java_home {
        config.java_home = Some(java_home.clone());
    }
    if cli.output.is_some() || cli.directory.is_some() {
        config.output_file = cli.output.clone();
        config.output_dir = cli.directory.clone();
    }
    Ok(config)
}

/// Each argument names a class, or is the path of an existing class file.
pub fn parse_class_names(inputs: &[String]) -> Result<Vec<ClassRequest>> {
    inputs
        .iter()
        .map(|input| {
            ClassRequest::parse(input)
                .with_context(|| format!("invalid class name '{}'", input))
        })
        .collect()
}

/// Runs one generation. Per-class failures are returned in the report;
/// anything that prevents the run from starting is an error.
pub fn run(cli: &Cli) -> Result<GenerationReport> {
    let config = resolve_config(cli)?;
    // Checked before any classpath entry is opened.
    let target = config.output_target()?;
    let requests = parse_class_names(&cli.classes)?;

    let mut generator = HeaderGenerator::new(&config).context("failed to open search roots")?;
    let report = generator.generate(&requests, &target)?;
    Ok(report)
}

#[cfg(test)]
mod tests;
