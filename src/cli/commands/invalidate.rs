//! Invalidate command - flush the whole CDN distribution

use crate::cdn::CloudFrontInvalidator;
use crate::cli::args::InvalidateArgs;
use crate::config::Config;
use crate::credentials::{ClientSettings, StoredSecrets};
use crate::deploy::{invalidate_everything, InvalidationOutcome};
use crate::error::SiteSyncResult;
use crate::history::{DeployHistory, CDN_INVALIDATED};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the invalidate command
pub async fn execute(args: InvalidateArgs, config: &Config) -> SiteSyncResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let Some(distribution) = config.cloudfront.distribution_id.as_deref() else {
        ui::step_warn_hint(
            &ctx,
            "No CloudFront distribution configured",
            "Run: sitesync config set cloudfront.distribution_id <id>",
        );
        return Ok(());
    };

    let question = format!("Invalidate every path of distribution {}?", distribution);
    if !ui::confirm(&ctx, &question, false).await? {
        ui::remark(&ctx, "Cancelled");
        return Ok(());
    }

    let settings = ClientSettings::for_cloudfront(&config.cloudfront, &StoredSecrets)?;
    let cdn = CloudFrontInvalidator::connect(&settings).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Creating invalidation for /*...");
    let cancel = super::cancellation(config.deploy.timeout_secs);
    let outcome = invalidate_everything(&cdn, distribution, &cancel).await;
    cancel.cancel();

    DeployHistory::new(config)
        .record(
            CDN_INVALIDATED,
            &serde_json::json!({ "distribution": distribution, "outcome": outcome }),
        )
        .await;

    match outcome {
        InvalidationOutcome::All { id } => spinner.stop(&format!("Invalidation {} created", id)),
        InvalidationOutcome::Failed { reason } => {
            spinner.stop_error(&format!("Invalidation failed: {}", reason))
        }
        _ => spinner.stop_warn("No invalidation issued"),
    }

    Ok(())
}
