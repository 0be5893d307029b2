//! Mushaf page image views

use super::{field, home_row, surah_number};
use crate::app::AppContext;
use crate::catalog::{surah_pages, TOTAL_PAGES};
use crate::error::{MushafError, MushafResult};
use crate::nav::{Field, NavigationIntent, ViewHandler};
use crate::transport::{Reply, UserId};
use async_trait::async_trait;

/// Page `page` of the mushaf, navigable within `surah`'s page span
async fn page_reply(ctx: &AppContext, page: u32, surah: u32) -> MushafResult<Reply> {
    let range = surah_pages(surah).ok_or_else(|| MushafError::NotFound(format!("surah {surah}")))?;
    let position = range
        .position(page)
        .ok_or_else(|| MushafError::NotFound(format!("page {page} in surah {surah}")))?;

    let payload = ctx.catalog().page_image(page).await?;

    let mut nav = Vec::new();
    if page > range.first {
        nav.push(ctx.button("Previous page", NavigationIntent::page_image(page - 1, surah))?);
    }
    if page < range.last {
        nav.push(ctx.button("Next page", NavigationIntent::page_image(page + 1, surah))?);
    }

    Ok(Reply::image(
        payload,
        format!(
            "Page {page} of {TOTAL_PAGES}\nPage {position} of {} in this surah",
            range.len()
        ),
    )
    .row(nav)
    .button(ctx.button("Surah", NavigationIntent::surah(surah))?)
    .row(home_row(ctx)?))
}

/// First page of a surah
pub struct SurahImages;

#[async_trait]
impl ViewHandler for SurahImages {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let surah = surah_number(field(intent, Field::Primary)?)?;
        let first = surah_pages(surah)
            .map(|range| range.first)
            .ok_or_else(|| MushafError::NotFound(format!("surah {surah}")))?;
        page_reply(ctx, first, surah).await
    }
}

/// A specific page while browsing a surah
pub struct PageImage;

#[async_trait]
impl ViewHandler for PageImage {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let page = field(intent, Field::Primary)?;
        let surah = surah_number(field(intent, Field::Secondary)?)?;
        page_reply(ctx, page, surah).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, press, tokens};
    use crate::error::Notice;
    use crate::fetch::testing::RoutedTransport;
    use crate::nav::{Dispatch, ViewKind};
    use crate::transport::Content;

    #[tokio::test]
    async fn surah_images_open_on_first_page() {
        let ctx = context(RoutedTransport::new().route("quran-pages/002.png", 200, "P2"));
        let (outcome, reply) = press(&ctx, "imgs:2").await;

        assert_eq!(outcome, Dispatch::Handled(ViewKind::SurahImages));
        match &reply.content {
            Content::Image { payload, caption } => {
                assert_eq!(&payload[..], b"P2");
                assert!(caption.contains("Page 1 of 48"));
            }
            other => panic!("expected an image, got {other:?}"),
        }
        assert_eq!(tokens(&reply), vec!["page:3:2", "sura:2", "menu"]);
    }

    #[tokio::test]
    async fn last_page_of_surah_has_no_next() {
        let ctx = context(RoutedTransport::new().route("quran-pages/049.png", 200, "P49"));
        let (_, reply) = press(&ctx, "page:49:2").await;
        assert_eq!(tokens(&reply), vec!["page:48:2", "sura:2", "menu"]);
    }

    #[tokio::test]
    async fn single_page_surah_has_no_page_navigation() {
        let ctx = context(RoutedTransport::new().route("quran-pages/001.png", 200, "P1"));
        let (_, reply) = press(&ctx, "imgs:1").await;
        assert_eq!(tokens(&reply), vec!["sura:1", "menu"]);
    }

    #[tokio::test]
    async fn page_outside_surah_is_not_found() {
        let ctx = context(RoutedTransport::new());
        let (outcome, _) = press(&ctx, "page:300:2").await;
        assert_eq!(outcome, Dispatch::Fallback(Notice::NotFound));
    }

    #[tokio::test]
    async fn image_download_failure_is_try_again() {
        let ctx = context(RoutedTransport::new().route("quran-pages/002.png", 404, ""));
        let (outcome, _) = press(&ctx, "imgs:2").await;
        assert_eq!(outcome, Dispatch::Fallback(Notice::TryAgain));
    }
}
