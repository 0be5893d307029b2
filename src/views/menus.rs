//! Main menu, subscription and juz views

use super::{field, home_row, page_index, pager_row};
use crate::app::AppContext;
use crate::error::{MushafError, MushafResult};
use crate::nav::{Field, NavigationIntent, ViewHandler};
use crate::paginate::paginate;
use crate::transport::{Button, Reply, UserId};
use async_trait::async_trait;
use tracing::debug;

/// Surah buttons per row in the juz view
const SURAHS_PER_ROW: usize = 4;

fn main_menu(ctx: &AppContext, heading: &str) -> MushafResult<Reply> {
    Ok(Reply::text(format!("{heading}\n\nChoose a section:"))
        .button(ctx.button("Read the mushaf", NavigationIntent::surah_index(0))?)
        .button(ctx.button("Mushaf pages", NavigationIntent::surah_images(1))?)
        .button(ctx.button("Search", NavigationIntent::search())?)
        .button(ctx.button("Browse by juz", NavigationIntent::juz_index(0))?)
        .button(ctx.button("Recitations", NavigationIntent::audio_index(0))?))
}

/// Prompt shown to users who have not joined the channel yet
pub fn subscription_prompt(ctx: &AppContext) -> Reply {
    let reply = Reply::text(
        "Please subscribe to the channel to use the bot, then press \"Check subscription\".",
    );
    match ctx.button("Check subscription", NavigationIntent::check_subscription()) {
        Ok(button) => reply.button(button),
        Err(_) => reply,
    }
}

pub struct MainMenu;

#[async_trait]
impl ViewHandler for MainMenu {
    async fn render(
        &self,
        _: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        main_menu(ctx, "Main menu")
    }
}

/// Re-run the subscription check after the user says they joined
pub struct CheckSubscription;

#[async_trait]
impl ViewHandler for CheckSubscription {
    async fn render(
        &self,
        _: &NavigationIntent,
        user: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        if ctx.is_subscribed(user).await {
            debug!(user, "Subscription confirmed");
            main_menu(ctx, "Subscription confirmed. Welcome!")
        } else {
            Ok(subscription_prompt(ctx))
        }
    }
}

pub struct JuzIndex;

#[async_trait]
impl ViewHandler for JuzIndex {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let juz = ctx.catalog().juz();
        let page = paginate(juz.len(), ctx.page_size(), page_index(intent));

        let mut reply = Reply::text(format!("Juz list\nPage {}", page.label()));
        for entry in page.slice(&juz) {
            reply = reply.button(ctx.button(
                format!("{} (from surah {}:{})", entry.name, entry.start_surah, entry.start_verse),
                NavigationIntent::juz(entry.number),
            )?);
        }
        Ok(reply
            .row(pager_row(ctx, &page, NavigationIntent::juz_index)?)
            .row(home_row(ctx)?))
    }
}

/// One juz: where it begins and the surahs it covers
pub struct JuzDetail;

#[async_trait]
impl ViewHandler for JuzDetail {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let number = field(intent, Field::Primary)?;
        let juz = ctx.catalog().juz();
        let entry = number
            .checked_sub(1)
            .and_then(|i| juz.get(i as usize))
            .ok_or_else(|| MushafError::NotFound(format!("juz {number}")))?;

        // Names are a nicety; numbers are enough when the index is unavailable
        let index = ctx.catalog().surah_index().await.into_option();
        let label = |surah: u32| {
            index
                .as_ref()
                .and_then(|list| list.iter().find(|s| s.number == surah))
                .map(|s| format!("{surah}. {}", s.english_name))
                .unwrap_or_else(|| format!("Surah {surah}"))
        };

        let mut reply = Reply::text(format!(
            "{}\nBegins at surah {}, verse {}\nSurahs {} to {}",
            entry.name, entry.start_surah, entry.start_verse, entry.start_surah, entry.end_surah
        ));

        let buttons: Vec<Button> = entry
            .surahs()
            .map(|surah| ctx.button(label(surah), NavigationIntent::surah(surah)))
            .collect::<MushafResult<_>>()?;
        for row in buttons.chunks(SURAHS_PER_ROW) {
            reply = reply.row(row.to_vec());
        }

        let back_page = (number as usize - 1) / ctx.page_size();
        Ok(reply
            .button(ctx.button("Juz list", NavigationIntent::juz_index(back_page as u32))?)
            .row(home_row(ctx)?))
    }
}
