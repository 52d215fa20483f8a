//! Confirmation prompts with CI fallback

use super::context::UiContext;
use crate::error::{SiteSyncError, SiteSyncResult};

/// Ask a yes/no question.
///
/// `--yes` answers true; without a terminal the default is returned.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> SiteSyncResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| SiteSyncError::User(format!("Prompt task failed: {}", e)))?
    .map_err(|e| SiteSyncError::User(format!("Prompt failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_yes_approves() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Clear cache?", false).await.unwrap());
    }

    #[tokio::test]
    async fn non_interactive_uses_default() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Continue?", true).await.unwrap());
        assert!(!confirm(&ctx, "Continue?", false).await.unwrap());
    }
}
