//! Deploy command - upload a site directory

use crate::cache::FileDeployCache;
use crate::cdn::CloudFrontInvalidator;
use crate::cli::args::DeployArgs;
use crate::config::Config;
use crate::credentials::{ClientSettings, StoredSecrets};
use crate::deploy::{DeployReport, DeploySettings, Deployer, InvalidationOutcome, RedirectsFile};
use crate::error::SiteSyncResult;
use crate::history::{DeployHistory, DEPLOY_COMPLETED};
use crate::store::S3ObjectStore;
use crate::ui::{self, TaskSpinner, UiContext, UploadProgress};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Execute the deploy command
pub async fn execute(args: DeployArgs, config: &Config) -> SiteSyncResult<()> {
    let ctx = UiContext::detect();

    let mut settings = DeploySettings::from_config(config)?;
    if let Some(namespace) = args.namespace {
        settings.namespace = namespace;
    }

    if !args.path.is_dir() {
        ui::step_warn_hint(
            &ctx,
            &format!("{} is not a directory", args.path.display()),
            "nothing deployed",
        );
        return Ok(());
    }

    ui::intro(&ctx, "sitesync deploy");
    ui::key_value(&ctx, "source", &args.path.display().to_string());
    ui::key_value(&ctx, "bucket", &settings.bucket);
    ui::key_value(&ctx, "namespace", &settings.namespace);

    let deployer = build_deployer(&ctx, settings, args.redirects, config).await?;
    let cancel = super::cancellation(config.deploy.timeout_secs);

    let deployer = deployer.with_progress(Arc::new(UploadProgress::new(&ctx)));
    let report = deployer.deploy(&args.path, &cancel).await;
    cancel.cancel();
    let report = report?;

    DeployHistory::new(config)
        .record(
            DEPLOY_COMPLETED,
            &serde_json::json!({
                "source": args.path.display().to_string(),
                "bucket": deployer.settings().bucket,
                "namespace": deployer.settings().namespace,
                "changed": report.changed(),
                "report": report,
            }),
        )
        .await;

    print_summary(&ctx, &report);
    Ok(())
}

/// Wire up the S3 store, deploy cache, CDN client and redirect source
async fn build_deployer(
    ctx: &UiContext,
    settings: DeploySettings,
    redirects: Option<PathBuf>,
    config: &Config,
) -> SiteSyncResult<Deployer> {
    let secrets = StoredSecrets;
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Connecting to AWS...");

    let s3 = match S3ObjectStore::connect(&ClientSettings::for_s3(&config.s3, &secrets)?).await {
        Ok(store) => store,
        Err(e) => {
            spinner.stop_error("Could not build S3 client");
            return Err(e);
        }
    };

    let cdn = if settings.distribution_id.is_some() {
        let cdn_settings = ClientSettings::for_cloudfront(&config.cloudfront, &secrets)?;
        match CloudFrontInvalidator::connect(&cdn_settings).await {
            Ok(cdn) => Some(cdn),
            Err(e) => {
                spinner.stop_error("Could not build CloudFront client");
                return Err(e);
            }
        }
    } else {
        None
    };
    spinner.stop("Connected");

    let cache = FileDeployCache::open_default().await?;
    let mut deployer = Deployer::new(settings, Arc::new(s3), Arc::new(cache));

    if let Some(cdn) = cdn {
        deployer = deployer.with_invalidator(Arc::new(cdn));
    }

    if let Some(path) = redirects.or_else(|| config.deploy.redirects_file.clone()) {
        debug!("Using redirect rules from {}", path.display());
        deployer = deployer.with_redirects(Arc::new(RedirectsFile::new(path)));
    }

    Ok(deployer)
}

fn print_summary(ctx: &UiContext, report: &DeployReport) {
    ui::step_ok(
        ctx,
        &format!("{} uploaded, {} unchanged", report.uploaded, report.cached),
    );

    if report.redirects_deployed + report.redirects_cached + report.redirects_failed > 0 {
        ui::step_ok(
            ctx,
            &format!(
                "{} redirects deployed, {} unchanged",
                report.redirects_deployed, report.redirects_cached
            ),
        );
    }

    if report.unresolvable > 0 {
        ui::step_warn(
            ctx,
            &format!("{} entries could not be resolved and were skipped", report.unresolvable),
        );
    }

    match &report.invalidation {
        InvalidationOutcome::NotConfigured => {
            ui::remark(ctx, "No CloudFront distribution configured")
        }
        InvalidationOutcome::NothingChanged => ui::step_info(ctx, "Nothing to invalidate"),
        InvalidationOutcome::Paths { count, id } => {
            ui::step_ok_detail(ctx, &format!("Invalidated {} path(s)", count), id)
        }
        InvalidationOutcome::All { id } => ui::step_ok_detail(ctx, "Invalidated /*", id),
        InvalidationOutcome::Failed { reason } => ui::step_warn_hint(
            ctx,
            &format!("Invalidation failed: {}", reason),
            "run: sitesync invalidate",
        ),
    }

    if report.is_complete() {
        ui::outro_success(ctx, "Deploy complete");
    } else {
        ui::outro_warn(
            ctx,
            &format!(
                "{} uploads failed; re-run to retry them",
                report.failed + report.redirects_failed
            ),
        );
    }
}
