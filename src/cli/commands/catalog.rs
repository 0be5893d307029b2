//! Catalog command - warm a remote catalog and summarise it

use crate::app::AppContext;
use crate::catalog::model::SURAH_COUNT;
use crate::catalog::{Catalog, CatalogKey};
use crate::cli::args::{CatalogArgs, CatalogKind};
use crate::config::Config;
use crate::error::{MushafError, MushafResult};
use crate::ui::{self, BatchProgress, TaskSpinner, UiContext};
use futures_util::stream::{self, StreamExt};
use std::time::Instant;
use tracing::debug;

/// Entries printed per catalog
const PREVIEW: usize = 5;

pub async fn execute(args: CatalogArgs, config: &Config) -> MushafResult<()> {
    let ui = UiContext::detect();
    let ctx = AppContext::from_config(config.clone())?;
    let key = match args.kind {
        CatalogKind::Surahs => CatalogKey::SurahIndex,
        CatalogKind::Reciters => CatalogKey::Reciters,
        CatalogKind::Juz => CatalogKey::Juz,
    };

    let mut spinner = TaskSpinner::new(&ui);
    spinner.start(&format!("Loading {key}..."));
    let started = Instant::now();
    let catalog = match ctx.catalog().load(key).await.into_option() {
        Some(catalog) => catalog,
        None => {
            spinner.stop_error(&format!("Could not load {key}"));
            return Err(MushafError::unavailable(key.name()));
        }
    };
    spinner.stop(&format!(
        "Loaded {} entries in {}ms",
        catalog.len(),
        started.elapsed().as_millis()
    ));

    ui::section(&ui, key.name());
    for line in preview(&catalog) {
        ui::remark(&ui, &line);
    }
    if catalog.len() > PREVIEW {
        ui::remark(&ui, &format!("... and {} more", catalog.len() - PREVIEW));
    }

    if args.prefetch {
        prefetch_surahs(&ui, &ctx, args.concurrency.max(1)).await;
    }

    let stats = ctx.cache_stats();
    ui::section(&ui, "Cache");
    ui::key_value(&ui, "entries", &stats.size.to_string());
    ui::key_value(&ui, "hit rate", &format!("{:.2}", stats.hit_rate));
    Ok(())
}

fn preview(catalog: &Catalog) -> Vec<String> {
    match catalog {
        Catalog::Surahs(items) => items
            .iter()
            .take(PREVIEW)
            .map(|s| {
                format!(
                    "{:>3}. {} ({}, {} verses)",
                    s.number, s.english_name, s.name, s.number_of_ayahs
                )
            })
            .collect(),
        Catalog::Reciters(items) => items
            .iter()
            .take(PREVIEW)
            .map(|r| format!("{:>4}  {} [{}]", r.id, r.name, r.short_name))
            .collect(),
        Catalog::Juz(items) => items
            .iter()
            .take(PREVIEW)
            .map(|j| {
                format!(
                    "{:>2}. surah {}:{} to surah {}",
                    j.number, j.start_surah, j.start_verse, j.end_surah
                )
            })
            .collect(),
    }
}

/// Fetch every surah text, `concurrency` at a time
async fn prefetch_surahs(ui: &UiContext, ctx: &AppContext, concurrency: usize) {
    let progress = BatchProgress::new(ui, u64::from(SURAH_COUNT), "surahs");

    let mut failed: Vec<u32> = stream::iter(1..=SURAH_COUNT)
        .map(|number| async move { (number, ctx.catalog().surah(number).await.is_available()) })
        .buffer_unordered(concurrency)
        .filter_map(|(number, ok)| {
            progress.advance(&number.to_string());
            debug!(number, ok, "Prefetched surah");
            async move { (!ok).then_some(number) }
        })
        .collect()
        .await;
    progress.finish();
    failed.sort_unstable();

    if failed.is_empty() {
        ui::step_ok(ui, &format!("Prefetched all {SURAH_COUNT} surahs"));
    } else {
        let list: Vec<String> = failed.iter().map(u32::to_string).collect();
        ui::step_warn(
            ui,
            &format!("{} surahs unavailable: {}", failed.len(), list.join(", ")),
        );
    }
}
