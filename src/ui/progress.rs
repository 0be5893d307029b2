//! Spinners and progress bars with a plain fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner around a single slow step
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

    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Counted progress over a batch of loads
///
/// Draws an indicatif bar when interactive, otherwise prints nothing
/// until [`BatchProgress::finish`].
pub struct BatchProgress {
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    pub fn new(ctx: &UiContext, total: u64, label: &str) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(total);
            let template = ProgressStyle::default_bar()
                .template("  {spinner:.green} {prefix} {bar:24.green/dim} {pos}/{len} {msg:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(template.progress_chars("━╸─"));
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });
        Self { bar }
    }

    /// Count one finished item
    pub fn advance(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_plain_mode() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Loading surah index...");
        spinner.stop("Loaded");
        spinner.stop_error("not started, prints only");
    }

    #[test]
    fn batch_progress_plain_mode_has_no_bar() {
        let progress = BatchProgress::new(&UiContext::non_interactive(), 3, "surahs");
        assert!(progress.bar.is_none());
        progress.advance("1");
        progress.finish();
    }
}
