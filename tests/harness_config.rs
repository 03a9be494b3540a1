//! ---
//! otr_section: "15-testing-qa-runbook"
//! otr_subsection: "integration-tests"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Harness configuration loading and its effect on a runtime."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs;
use std::time::{Duration, Instant};

use otr_common::{HarnessConfig, LogFormat};
use otr_runtime::{TestRuntime, WaitError};

#[test]
fn config_file_drives_runtime_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes");
    fs::create_dir_all(classes.join("com/acme")).unwrap();
    fs::write(classes.join("com/acme/Widget.class"), [0xCA, 0xFE]).unwrap();
    fs::write(classes.join("settings.properties"), "a=1\n").unwrap();

    let config_path = dir.path().join("otr.toml");
    fs::write(
        &config_path,
        format!(
            "classpath = [{:?}]\n\n[wait]\npoll_interval = 50\nmax_time = 1\nfail_on_timeout = true\n",
            classes.display().to_string()
        ),
    )
    .unwrap();

    let config = HarnessConfig::load(&[config_path]).unwrap();
    assert_eq!(config.wait.poll_interval, Duration::from_millis(50));
    let runtime = TestRuntime::with_config(config);

    let bundle = runtime.create_bundle("configured");
    assert_eq!(
        bundle.resource("/settings.properties"),
        Some(classes.join("settings.properties"))
    );
    let class = bundle.load_class("com.acme.Widget").unwrap();
    assert_eq!(class.location, classes.join("com/acme/Widget.class"));
    assert!(bundle.load_class("com.acme.Missing").is_err());

    let started = Instant::now();
    let err = runtime.hold().whilst(|| true).go().unwrap_err();
    let WaitError::TimedOut { polls, .. } = err;
    assert_eq!(polls, 21);
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[test]
fn missing_candidates_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = HarnessConfig::load(&[dir.path().join("absent.toml")]).unwrap();
    assert!(config.maven_repository.is_none());
    assert!(config.classpath.is_empty());
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.wait.max_time, Duration::from_secs(5));
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "classpath = not-a-list\n").unwrap();

    let err = HarnessConfig::load(&[&path]).unwrap_err();
    assert!(
        format!("{err:#}").contains("broken.toml"),
        "error should name the config file: {err:#}"
    );
}

#[test]
fn blank_project_marker_is_rejected() {
    let err = "project_marker = \"  \"\n"
        .parse::<HarnessConfig>()
        .unwrap_err();
    assert!(err.to_string().contains("project_marker"));
}

#[test]
fn maven_repository_defaults_under_home() {
    let config = HarnessConfig::default();
    if let Ok(repo) = config.maven_repository() {
        assert!(repo.ends_with(".m2/repository"), "{}", repo.display());
    }
}
