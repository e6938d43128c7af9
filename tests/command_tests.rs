use sr3d::cli::build_app;
use sr3d::commands;
use sr3d::config_file::TestOptionsFile;
use tempfile::TempDir;

#[path = "test_helpers.rs"]
mod test_helpers;
use test_helpers::*;

// Installs the global subscriber, so this binary holds a single test.
#[test]
fn test_run_failure_reaches_log_file() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    let options_path = dir.path().join("options.toml");

    let mut options = TestOptionsFile::generate_default();
    options.run.results_root = dir.path().join("results");
    options.run.log_dir = Some(log_dir.clone());
    let dataset = assert_some(options.datasets.get_mut("test_1"), "default dataset");
    dataset.dataroot_lr = Some(dir.path().join("absent_LR.h5"));
    dataset.dataroot_hr = None;
    assert_ok(options.to_toml_file(&options_path), "writing options");

    let matches = assert_ok(
        build_app().get_matches_from_safe(vec![
            "sr3d",
            "test",
            "--opt",
            options_path.to_str().unwrap(),
            "--no-progress",
        ]),
        "parsing arguments",
    );
    let sub_m = assert_some(matches.subcommand_matches("test"), "test subcommand");

    assert_err(commands::test(sub_m), "running with a missing LR file");

    let log = assert_ok(std::fs::read_to_string(log_dir.join("test.log")), "reading test.log");
    assert!(log.contains("Error: File not found"), "log was: {}", log);
    assert!(log.contains("absent_LR.h5"));
}
