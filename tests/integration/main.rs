//! Integration tests for sitesync

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Binary with config and state confined to `home`
    fn sitesync(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("sitesync");
        cmd.env("HOME", home)
            .env("XDG_CONFIG_HOME", home.join("config"))
            .env("XDG_STATE_HOME", home.join("state"))
            .env("CI", "1")
            .env_remove("SITESYNC_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--no-local");
        cmd
    }

    fn write_config(home: &Path, content: &str) -> PathBuf {
        let path = home.join("sitesync.conf.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental static site deploys"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sitesync"));
    }

    #[test]
    fn config_path_uses_config_dir() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sitesync").and(predicate::str::contains("config.toml")));
    }

    #[test]
    fn config_show_defaults() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[deploy]"))
            .stdout(predicate::str::contains("sitesync/default"));
    }

    #[test]
    fn config_show_redacts_secrets() {
        let home = TempDir::new().unwrap();
        let config = write_config(
            home.path(),
            "[s3]\nbucket = \"www.example.com\"\naccess_key_id = \"AKIDEXAMPLE\"\nsecret_access_key = \"wJalrXUtnFEMI\"\n",
        );

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("AKIDEXAMPLE"))
            .stdout(predicate::str::contains("<redacted>"))
            .stdout(predicate::str::contains("wJalrXUtnFEMI").not());
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("set.toml");

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "set", "s3.bucket", "www.example.com"])
            .assert()
            .success();

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("www.example.com"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["config", "set", "s3.acl", "private"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let home = TempDir::new().unwrap();
        let config = write_config(home.path(), "[deploy]\nconcurrency = \"lots\"\n");

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .args(["cache", "info"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn deploy_without_bucket_fails_with_hint() {
        let home = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();

        sitesync(home.path())
            .arg("deploy")
            .arg(site.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("s3.bucket"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn deploy_missing_directory_is_a_noop() {
        let home = TempDir::new().unwrap();
        let config = write_config(home.path(), "[s3]\nbucket = \"www.example.com\"\n");

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .arg("deploy")
            .arg(home.path().join("no-such-site"))
            .assert()
            .success()
            .stdout(predicate::str::contains("not a directory"));

        sitesync(home.path())
            .arg("--config")
            .arg(&config)
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("records:").and(predicate::str::contains("0")));
    }

    #[test]
    fn cache_info_for_namespace() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["cache", "info", "--namespace", "site/prod"])
            .assert()
            .success()
            .stdout(predicate::str::contains("site/prod"))
            .stdout(predicate::str::contains(".jsonl"));
    }

    #[test]
    fn cache_clear_empty_namespace() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("has no records"));
    }

    #[test]
    fn invalidate_without_distribution() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["invalidate", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No CloudFront distribution configured"));
    }

    #[test]
    fn deploy_help() {
        let home = TempDir::new().unwrap();
        sitesync(home.path())
            .args(["deploy", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--namespace"));
    }
}
