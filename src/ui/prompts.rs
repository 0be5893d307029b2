//! Confirmation prompt with a non-interactive fallback

use super::context::UiContext;
use crate::error::{MushafError, MushafResult};

/// Ask a yes/no question
///
/// Returns `true` under `--yes`, `default` when not on a terminal.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> MushafResult<bool> {
    if ctx.assume_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| MushafError::Internal(format!("prompt task failed: {e}")))?
    .map_err(|e| MushafError::io("reading confirmation", e))
}
