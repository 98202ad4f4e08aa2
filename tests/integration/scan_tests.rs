use imgdedupe::config::Config;
use imgdedupe::duplicates::FailureReason;
use imgdedupe::find_duplicates;
use imgdedupe::output::ListOutput;
use imgdedupe::scanner::PerceptualAlgorithm;
use std::fs;
use tempfile::tempdir;

use super::fixtures::{block_image, relative_lines, save_garbage, save_image};

fn scenario_config() -> Config {
    let mut config = Config::default();
    config.extensions.push("heic".to_string());
    config
}

#[test]
fn test_scan_mixed_scenario() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    save_image(&root.join("a.png"), 1);
    save_image(&root.join("b.bmp"), 2);
    save_image(&root.join("c.png"), 1);
    save_garbage(&root.join("d.heic"));
    save_image(&root.join("e.png"), 2);

    let grouping = find_duplicates(root, &scenario_config(), None).unwrap();

    let groups: Vec<Vec<String>> = grouping
        .groups()
        .iter()
        .map(|g| {
            g.paths()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect();
    assert_eq!(groups, vec![vec!["a.png", "c.png"], vec!["b.bmp", "e.png"]]);

    assert_eq!(grouping.skipped().len(), 1);
    assert!(grouping.skipped()[0].path.ends_with("d.heic"));
    assert!(matches!(
        grouping.skipped()[0].reason,
        FailureReason::Unsupported(_) | FailureReason::Decode(_)
    ));

    let report = grouping.report();
    let text = ListOutput::new(&report).to_text();
    assert_eq!(relative_lines(&text, root), vec!["c.png", "e.png"]);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_scan_all_unique() {
    let dir = tempdir().unwrap();
    for seed in 0..5 {
        save_image(&dir.path().join(format!("img_{seed}.png")), seed + 10);
    }

    let grouping = find_duplicates(dir.path(), &Config::default(), None).unwrap();

    assert_eq!(grouping.groups().len(), 5);
    assert_eq!(grouping.unique().count(), 5);
    assert!(grouping.skipped().is_empty());

    let report = grouping.report();
    assert!(report.is_empty());
    assert_eq!(ListOutput::new(&report).to_text(), "");
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let grouping = find_duplicates(dir.path(), &Config::default(), None).unwrap();

    assert!(grouping.is_empty());
    assert_eq!(grouping.stats().total_records, 0);
}

#[test]
fn test_scan_head_is_first_in_path_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    // Written out of order; discovery order is by full path
    save_image(&root.join("z/late.png"), 3);
    save_image(&root.join("a/z.png"), 3);
    save_image(&root.join("a.png"), 3);

    let grouping = find_duplicates(root, &Config::default(), None).unwrap();

    let group = &grouping.groups()[0];
    assert!(group.kept().ends_with("a.png"));
    assert_eq!(group.kept().parent().unwrap(), root);

    let report = grouping.report();
    assert_eq!(
        relative_lines(&ListOutput::new(&report).to_text(), root),
        vec!["a/z.png", "z/late.png"]
    );
}

#[test]
fn test_scan_ignores_non_image_files() {
    let dir = tempdir().unwrap();
    save_image(&dir.path().join("one.png"), 4);
    fs::write(dir.path().join("notes.txt"), "text").unwrap();
    fs::write(dir.path().join("Makefile"), "all:").unwrap();

    let grouping = find_duplicates(dir.path(), &Config::default(), None).unwrap();

    assert_eq!(grouping.stats().total_records, 1);
    assert!(grouping.skipped().is_empty());
}

#[test]
fn test_scan_partial_failure_keeps_duplicates() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    save_image(&root.join("a.png"), 5);
    save_image(&root.join("b.png"), 5);
    save_garbage(&root.join("broken.png"));
    fs::write(root.join("empty.jpg"), b"").unwrap();

    let grouping = find_duplicates(root, &Config::default(), None).unwrap();

    assert_eq!(grouping.skipped().len(), 2);
    assert_eq!(grouping.duplicates().count(), 1);
    let report = grouping.report();
    assert_eq!(
        relative_lines(&ListOutput::new(&report).to_text(), root),
        vec!["b.png"]
    );
}

#[test]
fn test_scan_is_deterministic() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    for i in 0..12u64 {
        save_image(&root.join(format!("d{}/f{i}.png", i % 3)), i % 4);
    }

    let first = find_duplicates(root, &Config::default(), None).unwrap();
    let single_thread = Config {
        io_threads: 1,
        ..Config::default()
    };
    let second = find_duplicates(root, &single_thread, None).unwrap();

    let text = |g: &imgdedupe::duplicates::Grouping| ListOutput::new(&g.report()).to_text();
    assert_eq!(text(&first), text(&second));
    assert_eq!(first.stats().redundant_files, 8);
}

#[test]
fn test_scan_lossless_formats_share_group() {
    let dir = tempdir().unwrap();
    let img = block_image(6);
    img.save(dir.path().join("photo.png")).unwrap();
    img.save(dir.path().join("photo.bmp")).unwrap();
    img.save(dir.path().join("photo.tiff")).unwrap();

    let grouping = find_duplicates(dir.path(), &Config::default(), None).unwrap();

    assert_eq!(grouping.groups().len(), 1);
    assert_eq!(grouping.groups()[0].len(), 3);
    assert!(grouping.groups()[0].kept().ends_with("photo.bmp"));
}

#[test]
fn test_scan_with_each_algorithm() {
    let dir = tempdir().unwrap();
    save_image(&dir.path().join("x.png"), 7);
    save_image(&dir.path().join("y.png"), 7);

    for algorithm in [
        PerceptualAlgorithm::Phash,
        PerceptualAlgorithm::Dhash,
        PerceptualAlgorithm::Ahash,
        PerceptualAlgorithm::Blockhash,
    ] {
        let config = Config {
            algorithm,
            ..Config::default()
        };
        let grouping = find_duplicates(dir.path(), &config, None).unwrap();
        assert_eq!(grouping.duplicates().count(), 1, "algorithm {algorithm}");
    }
}

#[test]
fn test_scan_mislabeled_image_is_recovered() {
    let dir = tempdir().unwrap();
    let img = block_image(8);
    img.save(dir.path().join("real.png")).unwrap();
    img.save_with_format(dir.path().join("fake.jpg"), image::ImageFormat::Png)
        .unwrap();

    let grouping = find_duplicates(dir.path(), &Config::default(), None).unwrap();

    assert!(grouping.skipped().is_empty());
    assert_eq!(grouping.duplicates().count(), 1);
}
