use super::*;
use jnih_build::{ConfigError, OutputTarget};
use std::fs;
use test_case::test_case;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["jnih"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(normalize_legacy_args(argv)).expect("valid arguments")
}

#[test_case(&["-cp", "lib"], &["--class-path", "lib"] ; "short classpath")]
#[test_case(&["-classpath", "lib"], &["--class-path", "lib"] ; "long classpath")]
#[test_case(&["-version"], &["--version"] ; "version")]
#[test_case(&["-help"], &["--help"] ; "help")]
#[test_case(&["-?"], &["--help"] ; "question mark help")]
#[test_case(&["-d", "out", "a.B"], &["-d", "out", "a.B"] ; "modern flags untouched")]
#[test_case(&["--", "-cp"], &["--", "-cp"] ; "after terminator")]
fn legacy_arguments(input: &[&str], expected: &[&str]) {
    let normalized = normalize_legacy_args(input.iter().copied());
    let expected: Vec<OsString> = expected.iter().map(OsString::from).collect();
    assert_eq!(normalized, expected);
}

#[test]
fn classpath_aliases_accumulate() {
    let cli = parse(&["-cp", "a", "--classpath", "b", "--cp", "c", "--class-path", "d", "x.Y"]);
    assert_eq!(cli.class_path, vec!["a", "b", "c", "d"]);
    assert_eq!(cli.classes, vec!["x.Y"]);
}

#[test]
fn verbosity_counts() {
    assert_eq!(parse(&["-vv", "x.Y"]).verbose, 2);
    assert_eq!(parse(&["x.Y"]).verbose, 0);
}

#[test]
fn classes_are_required() {
    assert!(Cli::try_parse_from(["jnih", "-d", "out"]).is_err());
}

#[test]
fn default_classpath_is_current_directory() {
    let config = resolve_config(&parse(&["x.Y"])).unwrap();
    assert_eq!(config.classpath, vec!["."]);
    assert!(config.use_runtime);
    assert_eq!(
        config.output_target().unwrap(),
        OutputTarget::PerClass(PathBuf::from("."))
    );
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("jnih.toml");
    fs::write(
        &path,
        "classpath = [\"from-file\"]\nmodule-path = [\"mods\"]\noutput-file = \"all.h\"\n",
    )
    .unwrap();
    let config_arg = path.display().to_string();

    let from_file = resolve_config(&parse(&["--config", &config_arg, "x.Y"])).unwrap();
    assert_eq!(from_file.classpath, vec!["from-file"]);
    assert_eq!(from_file.module_path, vec!["mods"]);
    assert_eq!(
        from_file.output_target().unwrap(),
        OutputTarget::SingleFile(PathBuf::from("all.h"))
    );

    let overridden = resolve_config(&parse(&[
        "--config",
        &config_arg,
        "--cp",
        "cli",
        "-d",
        "include",
        "--no-runtime",
        "x.Y",
    ]))
    .unwrap();
    assert_eq!(overridden.classpath, vec!["cli"]);
    assert!(!overridden.use_runtime);
    assert_eq!(
        overridden.output_target().unwrap(),
        OutputTarget::PerClass(PathBuf::from("include"))
    );
}

#[test]
fn output_and_directory_conflict() {
    let cli = parse(&["-o", "all.h", "-d", "include", "x.Y"]);
    let error = run(&cli).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ConfigError>(),
        Some(ConfigError::AmbiguousOutputTarget)
    ));
}

#[test]
fn invalid_class_names_are_reported() {
    let error = parse_class_names(&["a;b".to_string()]).unwrap_err();
    assert_eq!(error.to_string(), "invalid class name 'a;b'");
}
