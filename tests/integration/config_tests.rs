use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use imgdedupe::cli::Cli;
use imgdedupe::config::Config;
use imgdedupe::scanner::PerceptualAlgorithm;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use clap::Parser;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.algorithm, PerceptualAlgorithm::Phash);
    assert_eq!(config.hash_size, 8);
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.output, PathBuf::from("output.txt"));
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
algorithm = "blockhash"
hash_size = 16
io_threads = 2
extensions = ["png", "webp"]
ignore_patterns = ["thumbs/"]
follow_symlinks = true
output = "dupes.txt"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.algorithm, PerceptualAlgorithm::Blockhash);
    assert_eq!(config.hash_size, 16);
    assert_eq!(config.io_threads, 2);
    assert_eq!(config.extensions, vec!["png", "webp"]);
    assert_eq!(config.ignore_patterns, vec!["thumbs/"]);
    assert!(config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert_eq!(config.output, PathBuf::from("dupes.txt"));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"md5\"").unwrap();

    // Figment should return error on an unknown algorithm
    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let result: Result<Config, _> = figment.extract();
    assert!(result.is_err());
}

#[test]
fn test_cli_flags_override_config_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"dhash\"\nhash_size = 16\n").unwrap();

    let cli = Cli::try_parse_from([
        "imgdedupe",
        "--config",
        config_path.to_str().unwrap(),
        "scan",
        "--hash-size",
        "4",
    ])
    .unwrap();

    let mut config: Config = Config::figment(cli.config.as_deref()).extract().unwrap();
    let imgdedupe::cli::Commands::Scan(args) = cli.command;
    args.apply_to(&mut config);

    // File value survives where no flag was given
    assert_eq!(config.algorithm, PerceptualAlgorithm::Dhash);
    assert_eq!(config.hash_size, 4);
}

#[test]
fn test_env_overrides_config_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "algorithm = \"ahash\"\nskip_hidden = false")?;
        jail.set_env("IMGDEDUPE_SKIP_HIDDEN", "true");
        jail.set_env("IMGDEDUPE_IO_THREADS", "16");

        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;

        assert_eq!(config.algorithm, PerceptualAlgorithm::Ahash);
        assert!(config.skip_hidden);
        assert_eq!(config.io_threads, 16);
        Ok(())
    });
}

#[test]
fn test_missing_explicit_config_is_skipped() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&missing))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_file_hash_size_out_of_range_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    for value in ["1", "65"] {
        fs::write(&config_path, format!("hash_size = {value}\n")).unwrap();
        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("hash_size"), "{err}");
    }
}
