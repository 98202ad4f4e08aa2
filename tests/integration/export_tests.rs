use clap::Parser;
use imgdedupe::cli::Cli;
use imgdedupe::error::ExitCode;
use imgdedupe::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

use super::fixtures::{relative_lines, save_garbage, save_image};

/// Run `imgdedupe -q --config <none> scan <input> -o <work>/output.txt <extra...>`.
fn run(work: &TempDir, input: &Path, extra: &[&str]) -> anyhow::Result<ExitCode> {
    run_to(work, input, &work.path().join("output.txt"), extra)
}

fn run_to(
    work: &TempDir,
    input: &Path,
    output: &Path,
    extra: &[&str],
) -> anyhow::Result<ExitCode> {
    let no_config = work.path().join("no-config.toml");
    let mut args = vec![
        "imgdedupe".to_string(),
        "-q".to_string(),
        "--config".to_string(),
        no_config.to_string_lossy().into_owned(),
        "scan".to_string(),
        input.to_string_lossy().into_owned(),
        "-o".to_string(),
        output.to_string_lossy().into_owned(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    run_app(Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_run_writes_report() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    save_image(&input.join("a.png"), 1);
    save_image(&input.join("b.png"), 2);
    save_image(&input.join("c.png"), 1);
    save_image(&input.join("sub/d.png"), 2);

    let code = run(&work, &input, &[]).unwrap();

    assert_eq!(code, ExitCode::Success);
    let report = fs::read_to_string(work.path().join("output.txt")).unwrap();
    assert_eq!(relative_lines(&report, &input), vec!["c.png", "sub/d.png"]);
}

#[test]
fn test_run_empty_directory_writes_empty_report() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    fs::create_dir(&input).unwrap();

    let code = run(&work, &input, &[]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        fs::read_to_string(work.path().join("output.txt")).unwrap(),
        ""
    );
}

#[test]
fn test_run_overwrites_previous_report() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    save_image(&input.join("only.png"), 3);
    fs::write(work.path().join("output.txt"), "old/line.png\n").unwrap();

    run(&work, &input, &[]).unwrap();

    assert_eq!(
        fs::read_to_string(work.path().join("output.txt")).unwrap(),
        ""
    );
}

#[test]
fn test_run_json_export() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    save_image(&input.join("a.png"), 4);
    save_image(&input.join("b.png"), 4);
    save_garbage(&input.join("c.png"));
    let json_path = work.path().join("report.json");

    run(&work, &input, &["--json", json_path.to_str().unwrap()]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let groups = parsed["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0]["kept"].as_str().unwrap().ends_with("a.png"));
    assert_eq!(groups[0]["redundant"].as_array().unwrap().len(), 1);
    assert!(parsed["skipped"][0]["path"]
        .as_str()
        .unwrap()
        .ends_with("c.png"));
    assert_eq!(parsed["summary"]["total_records"], 3);
    assert_eq!(parsed["summary"]["exit_code"], 0);
}

#[test]
fn test_run_missing_input_is_error() {
    let work = tempdir().unwrap();
    let missing = work.path().join("missing");

    let err = run(&work, &missing, &[]).unwrap_err();

    assert!(format!("{err:#}").contains("not found"));
    assert!(!work.path().join("output.txt").exists());
}

#[test]
fn test_run_unwritable_output_is_error() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    save_image(&input.join("a.png"), 5);
    let bad_output = work.path().join("no/such/dir/out.txt");

    let err = run_to(&work, &input, &bad_output, &[]).unwrap_err();

    assert!(format!("{err:#}").contains("Failed to write report"));
    assert!(!bad_output.exists());
}

#[test]
fn test_run_malformed_config_is_error() {
    let work = tempdir().unwrap();
    let input = work.path().join("input");
    fs::create_dir(&input).unwrap();
    let config = work.path().join("bad.toml");
    fs::write(&config, "hash_size = \"eight\"").unwrap();

    let cli = Cli::try_parse_from([
        "imgdedupe",
        "-q",
        "--config",
        config.to_str().unwrap(),
        "scan",
        input.to_str().unwrap(),
        "-o",
        work.path().join("out.txt").to_str().unwrap(),
    ])
    .unwrap();
    let err = run_app(cli).unwrap_err();

    assert!(format!("{err:#}").contains("Failed to load configuration"));
}
