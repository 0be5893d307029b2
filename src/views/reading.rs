//! Surah index, surah detail and reading views

use super::{field, home_row, page_index, pager_row, surah_number};
use crate::app::AppContext;
use crate::catalog::model::SURAH_COUNT;
use crate::catalog::SurahText;
use crate::error::{MushafError, MushafResult};
use crate::nav::{Field, NavigationIntent, ViewHandler, ViewKind};
use crate::paginate::paginate;
use crate::split::{next_chunk, ResumeMarker};
use crate::transport::{Button, Reply, UserId};
use async_trait::async_trait;

const BASMALA: &str = "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ";

/// Paged list of every surah
pub struct SurahIndex;

#[async_trait]
impl ViewHandler for SurahIndex {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let index = ctx.catalog().surah_index().await.or_unavailable("surah index")?;
        let page = paginate(index.len(), ctx.page_size(), page_index(intent));

        let mut reply = Reply::text(format!(
            "The Holy Quran\nPage {}\nSurahs {} - {}\n\nChoose a surah:",
            page.label(),
            page.start_index + 1,
            page.end_index
        ));
        for surah in page.slice(&index) {
            reply = reply.button(ctx.button(
                format!("{}. {} ({} verses)", surah.number, surah.name, surah.number_of_ayahs),
                NavigationIntent::surah(surah.number),
            )?);
        }
        Ok(reply
            .row(pager_row(ctx, &page, NavigationIntent::surah_index)?)
            .row(home_row(ctx)?))
    }
}

/// Previous/next surah buttons, clamped to the first and last surah
fn neighbour_row(ctx: &AppContext, number: u32) -> MushafResult<Vec<Button>> {
    Ok(vec![
        ctx.button("Previous surah", NavigationIntent::surah(number.saturating_sub(1).max(1)))?,
        ctx.button("Next surah", NavigationIntent::surah((number + 1).min(SURAH_COUNT)))?,
    ])
}

/// Surah summary with reading, page and audio actions
pub struct SurahDetail;

#[async_trait]
impl ViewHandler for SurahDetail {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let number = surah_number(field(intent, Field::Primary)?)?;
        let surah = ctx.catalog().surah(number).await.or_unavailable("surah")?;

        Ok(Reply::text(format!(
            "Surah {} ({})\n\nNumber: {}\nVerses: {}\nRevelation: {}",
            surah.name_arabic, surah.name, number, surah.verse_count, surah.revelation_type
        ))
        .button(ctx.button("Read the surah", NavigationIntent::read_surah(number))?)
        .button(ctx.button("Mushaf pages", NavigationIntent::surah_images(number))?)
        .button(ctx.button("Recitations", NavigationIntent::reciters(number, 0))?)
        .row(neighbour_row(ctx, number)?)
        .row(home_row(ctx)?))
    }
}

/// Full display text of a surah: header, basmala, then numbered verses
pub fn surah_body(surah: &SurahText) -> String {
    let mut text = format!("Surah {} ({})\n\n", surah.name_arabic, surah.name);
    if surah.opens_with_basmala() {
        text.push_str(BASMALA);
        text.push_str("\n\n");
    }
    let verses: Vec<String> = surah.formatted_verses().collect();
    text.push_str(&verses.join("\n\n"));
    text
}

/// Appended to every chunk that has a "Continue" button
const CONTINUE_SUFFIX: &str = "\n\n...";

/// Surah text, one message-sized chunk per press
///
/// Serves both `read:<surah>` (from the start) and
/// `cont:<surah>:<offset>` (from a resume marker).
pub struct ReadSurah;

#[async_trait]
impl ViewHandler for ReadSurah {
    async fn render(
        &self,
        intent: &NavigationIntent,
        _: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply> {
        let number = surah_number(field(intent, Field::Primary)?)?;
        let offset = match intent.view {
            ViewKind::ContinueReading => field(intent, Field::Secondary)? as usize,
            _ => 0,
        };

        let surah = ctx.catalog().surah(number).await.or_unavailable("surah text")?;
        let body = surah_body(&surah);
        if offset > 0 && (offset >= body.len() || !body.is_char_boundary(offset)) {
            return Err(MushafError::NotFound(format!(
                "reading position {offset} in surah {number}"
            )));
        }

        // Every chunk is cut to the same budget so resume markers stay stable
        let budget = ctx.max_chunk_bytes().saturating_sub(CONTINUE_SUFFIX.len()).max(1);
        let chunk = next_chunk(&body, budget, ResumeMarker(offset), 0);
        match chunk.resume_marker {
            Some(marker) => {
                let next = u32::try_from(marker.offset())
                    .map_err(|_| MushafError::Internal("reading offset overflow".to_string()))?;
                Ok(Reply::text(format!("{}{CONTINUE_SUFFIX}", chunk.text))
                    .row(vec![
                        ctx.button("Back", NavigationIntent::surah(number))?,
                        ctx.button("Continue", NavigationIntent::continue_reading(number, next))?,
                    ])
                    .row(home_row(ctx)?))
            }
            None => Ok(Reply::text(chunk.text)
                .row(neighbour_row(ctx, number)?)
                .row(home_row(ctx)?)),
        }
    }
}
