//! View handlers
//!
//! Each handler turns a [`NavigationIntent`] into one [`Reply`]. Everything
//! a view needs comes from the intent and the [`AppContext`] caches, never
//! from per-user state.
//!
//! [`Reply`]: crate::transport::Reply

pub mod audio;
pub mod images;
pub mod menus;
pub mod reading;
pub mod search;

use crate::app::AppContext;
use crate::catalog::model::SURAH_COUNT;
use crate::error::{MushafError, MushafResult};
use crate::nav::{Field, NavigationCodec, NavigationIntent, Router, ViewKind};
use crate::paginate::Page;
use crate::transport::Button;

/// Router with a handler for every view
pub fn router(codec: NavigationCodec) -> Router {
    Router::new(codec)
        .register(ViewKind::MainMenu, menus::MainMenu)
        .register(ViewKind::CheckSubscription, menus::CheckSubscription)
        .register(ViewKind::JuzIndex, menus::JuzIndex)
        .register(ViewKind::Juz, menus::JuzDetail)
        .register(ViewKind::SurahIndex, reading::SurahIndex)
        .register(ViewKind::Surah, reading::SurahDetail)
        .register(ViewKind::ReadSurah, reading::ReadSurah)
        .register(ViewKind::ContinueReading, reading::ReadSurah)
        .register(ViewKind::SurahImages, images::SurahImages)
        .register(ViewKind::PageImage, images::PageImage)
        .register(ViewKind::AudioIndex, audio::AudioIndex)
        .register(ViewKind::Reciters, audio::Reciters)
        .register(ViewKind::PlayAudio, audio::PlayAudio)
        .register(ViewKind::Search, search::SearchPrompt)
}

/// A field the view requires
fn field(intent: &NavigationIntent, field: Field) -> MushafResult<u32> {
    intent.get(field).ok_or_else(|| MushafError::InvalidIntent {
        view: intent.view.tag().to_string(),
        reason: format!("missing {}", field.name()),
    })
}

/// Page index of a paged view, 0 when absent
fn page_index(intent: &NavigationIntent) -> usize {
    intent.page.unwrap_or(0) as usize
}

/// Surah number in 1..=114
fn surah_number(value: u32) -> MushafResult<u32> {
    if (1..=SURAH_COUNT).contains(&value) {
        Ok(value)
    } else {
        Err(MushafError::NotFound(format!("surah {value}")))
    }
}

fn home_row(ctx: &AppContext) -> MushafResult<Vec<Button>> {
    Ok(vec![ctx.button("Main menu", NavigationIntent::main_menu())?])
}

/// Previous/next buttons for a paged listing
fn pager_row(
    ctx: &AppContext,
    page: &Page,
    to: impl Fn(u32) -> NavigationIntent,
) -> MushafResult<Vec<Button>> {
    let mut row = Vec::new();
    if page.has_prev {
        row.push(ctx.button("Previous page", to(page.index as u32 - 1))?);
    }
    if page.has_next {
        row.push(ctx.button("Next page", to(page.index as u32 + 1))?);
    }
    Ok(row)
}
