//! Spinners and upload progress with CI fallback

use super::context::UiContext;
use crate::deploy::DeployProgress;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A cliclack spinner, or plain lines when not on a terminal
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    pub fn stop_warn(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(style(message).yellow()),
            None => println!("{} {}", style("[WARN]").yellow(), message),
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Upload progress bar fed by the deployer.
///
/// Draws an indicatif bar on a terminal and stays silent otherwise; the
/// command prints a summary when the run ends.
pub struct UploadProgress {
    bar: Option<ProgressBar>,
}

impl UploadProgress {
    pub fn new(ctx: &UiContext) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(0);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("  {spinner:.blue} Deploying  {bar:24.blue/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
            {
                bar.set_style(
                    bar_style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar
        });
        Self { bar }
    }
}

impl DeployProgress for UploadProgress {
    fn begin(&self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
            bar.enable_steady_tick(Duration::from_millis(120));
        }
    }

    fn advance(&self, cache_key: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(shorten(cache_key, 48));
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

/// Keep the tail of long keys, which is the part that differs.
fn shorten(key: &str, max: usize) -> String {
    let chars = key.chars().count();
    if chars <= max {
        return key.to_string();
    }
    let tail: String = key.chars().skip(chars - (max - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Deploying...");
        spinner.stop("Done");
    }

    #[test]
    fn upload_progress_is_silent_without_terminal() {
        let progress = UploadProgress::new(&UiContext::non_interactive());
        assert!(progress.bar.is_none());
        progress.begin(3);
        progress.advance("/index.html");
        progress.finish();
    }

    #[test]
    fn shorten_keeps_tail() {
        assert_eq!(shorten("/index.html", 48), "/index.html");
        let long = format!("/assets/{}/app.js", "x".repeat(60));
        let short = shorten(&long, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.starts_with("..."));
        assert!(short.ends_with("/app.js"));
    }
}
