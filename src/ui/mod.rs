//! Terminal output for the CLI
//!
//! Uses `cliclack` for framed output, spinners and prompts on a terminal,
//! and falls back to plain `[OK]`/`[WARN]` lines in CI or when piped.
//!
//! ```rust,ignore
//! use sitesync::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! ui::intro(&ctx, "sitesync invalidate");
//! if ui::confirm(&ctx, "Invalidate every path?", false).await? {
//!     let mut spinner = TaskSpinner::new(&ctx);
//!     spinner.start("Invalidating...");
//!     spinner.stop("Invalidation created");
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, remark, step_info, step_ok, step_ok_detail,
    step_warn, step_warn_hint,
};
pub use progress::{TaskSpinner, UploadProgress};
pub use prompts::confirm;
pub use theme::{init_theme, SiteSyncTheme};
