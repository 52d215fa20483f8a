//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SiteSyncError, SiteSyncResult};
use crate::ui::{self, UiContext};

/// Keys accepted by `sitesync config set`
const KEYS: &[&str] = &[
    "general.log_format",
    "general.history_log",
    "deploy.namespace",
    "deploy.concurrency",
    "deploy.timeout_secs",
    "deploy.redirects_file",
    "s3.bucket",
    "s3.region",
    "s3.access_key_id",
    "s3.secret_access_key",
    "s3.profile",
    "s3.remote_path",
    "s3.cache_control",
    "cloudfront.distribution_id",
    "cloudfront.region",
    "cloudfront.access_key_id",
    "cloudfront.secret_access_key",
    "cloudfront.profile",
    "cloudfront.max_paths_to_invalidate",
];

const REDACTED: &str = "<redacted>";

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> SiteSyncResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SiteSyncResult<()> {
    let mut shown = config.clone();
    for secret in [
        &mut shown.s3.secret_access_key,
        &mut shown.cloudfront.secret_access_key,
    ] {
        // env: references are not secret themselves
        if secret.as_deref().is_some_and(|s| !s.starts_with("env:")) {
            *secret = Some(REDACTED.to_string());
        }
    }

    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> SiteSyncResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Update one key in the file at `manager.path()` only, never the merged view,
/// so project-local values are not copied into the global file.
async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> SiteSyncResult<()> {
    let ctx = UiContext::detect();
    let mut config = manager.load().await?;

    apply(&mut config, key, value)?;
    manager.save(&config).await?;

    let shown = if key.ends_with("secret_access_key") && !value.starts_with("env:") {
        REDACTED
    } else {
        value
    };
    ui::step_ok(&ctx, &format!("Set {} = {}", key, shown));
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> SiteSyncResult<()> {
    // Empty string clears optional values
    let text = || (!value.is_empty()).then(|| value.to_string());

    match key {
        "general.log_format" => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(SiteSyncError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },
        "general.history_log" => config.general.history_log = parse_bool(value)?,

        "deploy.namespace" => {
            if value.is_empty() {
                return Err(SiteSyncError::User("Namespace cannot be empty".to_string()));
            }
            config.deploy.namespace = value.to_string();
        }
        "deploy.concurrency" => config.deploy.concurrency = parse_number(value)?,
        "deploy.timeout_secs" => config.deploy.timeout_secs = parse_number(value)?,
        "deploy.redirects_file" => config.deploy.redirects_file = text().map(Into::into),

        "s3.bucket" => config.s3.bucket = text(),
        "s3.region" => config.s3.region = text(),
        "s3.access_key_id" => config.s3.access_key_id = text(),
        "s3.secret_access_key" => config.s3.secret_access_key = text(),
        "s3.profile" => config.s3.profile = text(),
        "s3.remote_path" => config.s3.remote_path = text(),
        "s3.cache_control" => config.s3.cache_control = text(),

        "cloudfront.distribution_id" => config.cloudfront.distribution_id = text(),
        "cloudfront.region" => config.cloudfront.region = text(),
        "cloudfront.access_key_id" => config.cloudfront.access_key_id = text(),
        "cloudfront.secret_access_key" => config.cloudfront.secret_access_key = text(),
        "cloudfront.profile" => config.cloudfront.profile = text(),
        "cloudfront.max_paths_to_invalidate" => {
            config.cloudfront.max_paths_to_invalidate = parse_number(value)?
        }

        _ => {
            return Err(SiteSyncError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> SiteSyncResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SiteSyncError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> SiteSyncResult<T> {
    value
        .parse()
        .map_err(|_| SiteSyncError::User(format!("Invalid number: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn every_listed_key_is_settable() {
        for key in KEYS {
            let mut config = Config::default();
            let value = match *key {
                "general.log_format" => "json",
                "general.history_log" => "false",
                k if k.ends_with("concurrency")
                    || k.ends_with("timeout_secs")
                    || k.ends_with("max_paths_to_invalidate") =>
                {
                    "8"
                }
                _ => "value",
            };
            assert!(apply(&mut config, key, value).is_ok(), "{}", key);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        let err = apply(&mut config, "s3.acl", "private").unwrap_err();
        assert!(err.to_string().contains("s3.bucket"));
    }

    #[test]
    fn empty_value_clears_option() {
        let mut config = Config::default();
        apply(&mut config, "s3.profile", "deploy").unwrap();
        assert_eq!(config.s3.profile.as_deref(), Some("deploy"));

        apply(&mut config, "s3.profile", "").unwrap();
        assert!(config.s3.profile.is_none());
    }

    #[test]
    fn numbers_are_validated() {
        let mut config = Config::default();
        apply(&mut config, "cloudfront.max_paths_to_invalidate", "25").unwrap();
        assert_eq!(config.cloudfront.max_paths_to_invalidate, 25);
        assert!(apply(&mut config, "deploy.concurrency", "many").is_err());
    }

    #[tokio::test]
    async fn set_writes_only_target_file() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml"));

        set_value(&manager, "s3.bucket", "www.example.com").await.unwrap();
        set_value(&manager, "cloudfront.max_paths_to_invalidate", "10")
            .await
            .unwrap();

        let config = manager.load().await.unwrap();
        assert_eq!(config.s3.bucket.as_deref(), Some("www.example.com"));
        assert_eq!(config.cloudfront.max_paths_to_invalidate, 10);
    }
}
