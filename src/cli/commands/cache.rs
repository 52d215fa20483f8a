//! Cache command - inspect or reset the deploy cache

use crate::cache::{DeployCache, FileDeployCache};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::Config;
use crate::error::SiteSyncResult;
use crate::ui::{self, UiContext};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SiteSyncResult<()> {
    let cache = FileDeployCache::open_default().await?;

    match args.action {
        CacheAction::Info { namespace } => {
            let namespace = namespace.unwrap_or_else(|| config.deploy.namespace.clone());
            show_info(&cache, &namespace).await
        }
        CacheAction::Clear { namespace, yes } => {
            let namespace = namespace.unwrap_or_else(|| config.deploy.namespace.clone());
            clear(&cache, &namespace, yes).await
        }
    }
}

async fn show_info(cache: &FileDeployCache, namespace: &str) -> SiteSyncResult<()> {
    let ctx = UiContext::detect();
    let count = cache.count(namespace).await?;

    ui::key_value(&ctx, "namespace", namespace);
    ui::key_value(&ctx, "records", &count.to_string());
    ui::key_value(
        &ctx,
        "ledger",
        &cache.ledger_path(namespace).display().to_string(),
    );

    Ok(())
}

async fn clear(cache: &FileDeployCache, namespace: &str, yes: bool) -> SiteSyncResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let count = cache.count(namespace).await?;

    if count == 0 {
        ui::step_info(&ctx, &format!("Namespace {} has no records", namespace));
        return Ok(());
    }

    let question = format!(
        "Forget {} deployed records in {}? The next deploy uploads everything.",
        count, namespace
    );
    if !ui::confirm(&ctx, &question, false).await? {
        ui::remark(&ctx, "Cancelled");
        return Ok(());
    }

    cache.clear(namespace).await?;
    ui::step_ok(&ctx, &format!("Cleared {} records from {}", count, namespace));
    Ok(())
}
