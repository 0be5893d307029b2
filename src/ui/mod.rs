//! Terminal presentation for the CLI
//!
//! Uses `cliclack` framing and `indicatif` bars on a terminal, and falls
//! back to plain lines when output is piped or running under CI.
//!
//! ```rust,ignore
//! use mushaf::ui::{self, TaskSpinner, UiContext};
//!
//! let ctx = UiContext::detect();
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Loading surah index...");
//! spinner.stop("Loaded 114 surahs");
//! ui::key_value(&ctx, "cached", "1");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, remark, section, step_error, step_ok, step_ok_detail,
    step_warn, step_warn_hint,
};
pub use progress::{BatchProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, MushafTheme};
