//! Recitation views

use super::{field, home_row, page_index, pager_row, surah_number};
use crate::app::AppContext;
use crate::error::MushafResult;
use crate::nav::{Field, NavigationIntent, ViewHandler};
use crate::paginate::paginate;
use crate::transport::{Reply, UserId};
use async_trait::async_trait;
use tracing::info;

/// Paged surah list leading to reciters
pub struct AudioIndex;

#[async_trait]
impl ViewHandler for AudioIndex {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let index = ctx.catalog().surah_index().await.or_unavailable("surah index")?;
        let page = paginate(index.len(), ctx.page_size(), page_index(intent));

        let mut reply = Reply::text(format!(
            "Recitations\nPage {}\n\nChoose a surah to listen to:",
            page.label()
        ));
        for surah in page.slice(&index) {
            reply = reply.button(ctx.button(
                format!("{}. {}", surah.number, surah.name),
                NavigationIntent::reciters(surah.number, 0),
            )?);
        }
        Ok(reply
            .row(pager_row(ctx, &page, NavigationIntent::audio_index)?)
            .row(home_row(ctx)?))
    }
}

/// Paged reciters for one surah
pub struct Reciters;

#[async_trait]
impl ViewHandler for Reciters {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let surah = surah_number(field(intent, Field::Primary)?)?;
        let reciters = ctx.catalog().reciters().await.or_unavailable("reciter list")?;
        let page = paginate(reciters.len(), ctx.page_size(), page_index(intent));

        let mut reply = Reply::text(format!(
            "Choose a reciter\nSurah: {surah}\nPage {}",
            page.label()
        ));
        for reciter in page.slice(&reciters) {
            reply = reply.button(ctx.button(
                reciter.name.clone(),
                NavigationIntent::play_audio(reciter.id, surah),
            )?);
        }
        Ok(reply
            .row(pager_row(ctx, &page, |p| NavigationIntent::reciters(surah, p))?)
            .row(home_row(ctx)?))
    }
}

/// Audio of one surah by one reciter
pub struct PlayAudio;

#[async_trait]
impl ViewHandler for PlayAudio {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let reciter_id = field(intent, Field::Primary)?;
        let surah = surah_number(field(intent, Field::Secondary)?)?;

        let reciter = ctx.catalog().reciter(reciter_id).await?;
        let url = ctx.catalog().audio_url(reciter_id, surah).await?;
        let surah_name = ctx
            .catalog()
            .surah_index()
            .await
            .into_option()
            .and_then(|index| index.iter().find(|s| s.number == surah).map(|s| s.name.clone()))
            .unwrap_or_else(|| surah.to_string());

        info!(reciter_id, surah, "Serving recitation");
        Ok(Reply::audio(
            url,
            format!("Surah {surah_name} - {}", reciter.name),
            reciter.name.clone(),
        )
        .button(ctx.button("Other reciters", NavigationIntent::reciters(surah, 0))?)
        .row(home_row(ctx)?))
    }
}
