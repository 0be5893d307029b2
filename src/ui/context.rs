//! Terminal detection for the CLI

use std::io::IsTerminal;

/// Variables set by common CI providers
const CI_VARS: &[&str] = &["CI", "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE", "TF_BUILD"];

/// How the CLI should present itself
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
    assume_yes: bool,
}

impl UiContext {
    /// Interactive only when both ends are a TTY outside CI
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        let ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            interactive: tty && !ci,
            assume_yes: false,
        }
    }

    /// Plain output, prompts answered with their defaults
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            assume_yes: false,
        }
    }

    /// Answer every confirmation with yes
    pub fn with_assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }

    /// Spinners and cliclack framing
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_has_plain_output() {
        let ctx = UiContext::non_interactive();
        assert!(!ctx.is_interactive());
        assert!(!ctx.use_fancy_output());
        assert!(!ctx.assume_yes());
    }

    #[test]
    fn assume_yes_is_sticky() {
        assert!(UiContext::non_interactive().with_assume_yes(true).assume_yes());
    }
}
