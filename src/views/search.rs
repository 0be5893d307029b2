//! Search prompt and free-text answers

use super::home_row;
use crate::app::AppContext;
use crate::error::{MushafError, MushafResult};
use crate::nav::{Dispatch, NavigationIntent, ViewHandler, ViewKind};
use crate::split::split;
use crate::transport::{Reply, ReplyChannel, UserId};
use async_trait::async_trait;
use tracing::{info, warn};

/// Asks the user to type a query
pub struct SearchPrompt;

#[async_trait]
impl ViewHandler for SearchPrompt {
    async fn render(
        &self,
        _: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        if !ctx.search().is_enabled() {
            return Err(MushafError::FeatureDisabled("search".to_string()));
        }
        Ok(Reply::text(format!(
            "Search the Quran\n\nType a word or phrase (at least {} characters).",
            ctx.config().search.min_query_chars
        ))
        .row(home_row(ctx)?))
    }
}

/// Answer a free-text message as a search query
///
/// Long answers go out as several messages; only the last one carries
/// buttons.
pub async fn answer(ctx: &AppContext, query: &str, channel: &dyn ReplyChannel) -> Dispatch {
    match build_replies(ctx, query.trim()).await {
        Ok(replies) => {
            for reply in replies {
                if let Err(err) = channel.send(reply).await {
                    warn!(error = %err, "Sending search results failed");
                    return Dispatch::Fallback(err.notice());
                }
            }
            Dispatch::Handled(ViewKind::Search)
        }
        Err(err) => {
            warn!(error = %err, "Search failed");
            ctx.router().fallback(&err, channel).await
        }
    }
}

async fn build_replies(ctx: &AppContext, query: &str) -> MushafResult<Vec<Reply>> {
    if !ctx.search().is_enabled() {
        return Err(MushafError::FeatureDisabled("search".to_string()));
    }

    let min_chars = ctx.config().search.min_query_chars;
    if query.chars().count() < min_chars {
        return Ok(vec![Reply::text(format!(
            "Enter at least {min_chars} characters to search."
        ))
        .button(ctx.button("Search", NavigationIntent::search())?)
        .row(home_row(ctx)?)]);
    }

    info!(chars = query.chars().count(), "Searching");
    let text = ctx.search().search(query).await?;

    let header = format!("Results for \"{query}\"\n\n");
    let budget = ctx.max_chunk_bytes().saturating_sub(header.len()).max(1);
    let chunks = split(&text, budget);
    let last = chunks.len() - 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let reply = Reply::text(format!("{header}{}", chunk.text));
            if i == last {
                Ok(reply
                    .button(ctx.button("New search", NavigationIntent::search())?)
                    .row(home_row(ctx)?))
            } else {
                Ok(reply)
            }
        })
        .collect()
}
