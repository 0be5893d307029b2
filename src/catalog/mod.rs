//! Cached loaders for the reference collections
//!
//! Each loader checks its [`ExpiringCache`] first. On a miss it fetches
//! through the [`ResilientFetcher`], validates the response shape and
//! stores the normalised value. Failures come back as
//! [`Availability::Unavailable`] and are never cached, so the next call
//! goes back to the network.

pub mod model;
pub mod pages;

pub use model::{AudioTrack, JuzSummary, Reciter, SurahSummary, SurahText};
pub use pages::{surah_pages, PageRange, TOTAL_PAGES};

use crate::cache::{ExpiringCache, Lookup, Metrics, Payload, ResourceCache};
use crate::config::schema::{CacheConfig, EndpointsConfig};
use crate::error::{MushafError, MushafResult};
use crate::fetch::{FetchRequest, ResilientFetcher};
use model::{AudioListResponse, Envelope, RecitersResponse, WireSurah};
use serde::de::DeserializeOwned;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Explicit "have it" / "could not get it now" result of a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability<T> {
    Available(T),
    Unavailable,
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Available(value) => Availability::Available(f(value)),
            Self::Unavailable => Availability::Unavailable,
        }
    }

    /// Turn `Unavailable` into a retryable error naming `what`
    pub fn or_unavailable(self, what: impl Into<String>) -> MushafResult<T> {
        match self {
            Self::Available(value) => Ok(value),
            Self::Unavailable => Err(MushafError::unavailable(what)),
        }
    }
}

/// Keys of the whole-collection catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    SurahIndex,
    Reciters,
    Juz,
}

impl CatalogKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SurahIndex => "surah_index",
            Self::Reciters => "reciters",
            Self::Juz => "juz",
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A loaded whole-collection catalog
#[derive(Debug, Clone)]
pub enum Catalog {
    Surahs(Arc<Vec<SurahSummary>>),
    Reciters(Arc<Vec<Reciter>>),
    Juz(Arc<Vec<JuzSummary>>),
}

impl Catalog {
    pub fn len(&self) -> usize {
        match self {
            Self::Surahs(items) => items.len(),
            Self::Reciters(items) => items.len(),
            Self::Juz(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replace `{name}` placeholders in an endpoint template
pub fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |url, (name, value)| {
            url.replace(&format!("{{{name}}}"), value)
        })
}

/// Loads and caches every remote collection the views need
pub struct CatalogLoader {
    fetcher: ResilientFetcher,
    endpoints: EndpointsConfig,
    timeout: Duration,
    metrics: Arc<Metrics>,
    index: ExpiringCache<CatalogKey, Arc<Vec<SurahSummary>>>,
    surahs: ExpiringCache<u32, Arc<SurahText>>,
    reciters: ExpiringCache<CatalogKey, Arc<Vec<Reciter>>>,
    audio: ExpiringCache<u32, Arc<Vec<AudioTrack>>>,
    juz: Arc<Vec<JuzSummary>>,
    images: ResourceCache,
}

impl CatalogLoader {
    pub fn new(
        fetcher: ResilientFetcher,
        endpoints: EndpointsConfig,
        cache: &CacheConfig,
        timeout: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        let ttl = cache.ttl();
        let bound = cache.max_cache_entries;
        Self {
            fetcher,
            endpoints,
            timeout,
            metrics,
            index: ExpiringCache::new(ttl, bound),
            surahs: ExpiringCache::new(ttl, bound),
            reciters: ExpiringCache::new(ttl, bound),
            audio: ExpiringCache::new(ttl, bound),
            juz: Arc::new(model::juz_list()),
            images: ResourceCache::new(cache.max_image_entries),
        }
    }

    /// Load a whole-collection catalog by key
    pub async fn load(&self, key: CatalogKey) -> Availability<Catalog> {
        match key {
            CatalogKey::SurahIndex => self.surah_index().await.map(Catalog::Surahs),
            CatalogKey::Reciters => self.reciters().await.map(Catalog::Reciters),
            CatalogKey::Juz => Availability::Available(Catalog::Juz(self.juz())),
        }
    }

    /// Index of all surahs
    pub async fn surah_index(&self) -> Availability<Arc<Vec<SurahSummary>>> {
        let url = format!("{}/surah", self.endpoints.text_api.trim_end_matches('/'));
        let request = FetchRequest::get(CatalogKey::SurahIndex.name(), url, self.timeout);

        self.cached(
            &self.index,
            CatalogKey::SurahIndex,
            &request,
            Envelope::<Vec<SurahSummary>>::into_valid,
        )
        .await
    }

    /// Full text of one surah
    pub async fn surah(&self, number: u32) -> Availability<Arc<SurahText>> {
        let url = format!(
            "{}/surah/{}/{}",
            self.endpoints.text_api.trim_end_matches('/'),
            number,
            self.endpoints.text_edition
        );
        let request = FetchRequest::get(format!("surah_{number}"), url, self.timeout);

        self.cached(&self.surahs, number, &request, |envelope: Envelope<WireSurah>| {
            envelope.into_valid().map(SurahText::from)
        })
        .await
    }

    /// All reciters
    pub async fn reciters(&self) -> Availability<Arc<Vec<Reciter>>> {
        let request = FetchRequest::get(
            CatalogKey::Reciters.name(),
            self.endpoints.reciters.clone(),
            self.timeout,
        );

        self.cached(
            &self.reciters,
            CatalogKey::Reciters,
            &request,
            |response: RecitersResponse| {
                Some(response.reciters.into_iter().map(Reciter::from).collect())
            },
        )
        .await
    }

    /// Recordings published by one reciter
    pub async fn reciter_audio(&self, reciter_id: u32) -> Availability<Arc<Vec<AudioTrack>>> {
        let url = fill_template(
            &self.endpoints.reciter_audio,
            &[("reciter_id", reciter_id.to_string())],
        );
        let request = FetchRequest::get("reciter_audio", url, self.timeout);

        self.cached(&self.audio, reciter_id, &request, |response: AudioListResponse| {
            Some(response.audio_urls)
        })
        .await
    }

    /// The static juz list
    pub fn juz(&self) -> Arc<Vec<JuzSummary>> {
        self.juz.clone()
    }

    /// Look up one reciter by id
    pub async fn reciter(&self, reciter_id: u32) -> MushafResult<Reciter> {
        let reciters = self.reciters().await.or_unavailable("reciter list")?;
        reciters
            .iter()
            .find(|r| r.id == reciter_id)
            .cloned()
            .ok_or_else(|| MushafError::NotFound(format!("reciter {reciter_id}")))
    }

    /// Audio URL for a reciter and surah
    ///
    /// Prefers the reciter's published track list and falls back to the
    /// templated per-surah URL when the list is missing or lacks the surah.
    pub async fn audio_url(&self, reciter_id: u32, surah: u32) -> MushafResult<String> {
        let reciter = self.reciter(reciter_id).await?;

        if let Availability::Available(tracks) = self.reciter_audio(reciter_id).await {
            if let Some(track) = tracks.iter().find(|t| t.surah_id == surah) {
                return Ok(track.audio_url.clone());
            }
        }

        debug!(reciter_id, surah, "Using templated audio URL");
        Ok(fill_template(
            &self.endpoints.surah_audio,
            &[
                ("reciter", reciter.short_name),
                ("surah", surah.to_string()),
            ],
        ))
    }

    /// Page image bytes, served from the image cache when possible
    pub async fn page_image(&self, page: u32) -> MushafResult<Payload> {
        if !pages::is_valid_page(page) {
            return Err(MushafError::NotFound(format!("page {page}")));
        }

        let started = Instant::now();
        let (payload, lookup) = self
            .images
            .get_or_load_traced(page, |page| self.download_page(page))
            .await
            .inspect_err(|_| self.metrics.record_error("page_image"))?;

        match lookup {
            Lookup::Hit => self.metrics.record_hit(),
            Lookup::Miss => {
                self.metrics.record_miss();
                self.metrics.record_request("page_image", started.elapsed());
            }
        }
        Ok(payload)
    }

    async fn download_page(&self, page: u32) -> MushafResult<Vec<u8>> {
        let url = fill_template(&self.endpoints.page_image, &[("page", format!("{page:03}"))]);
        let request = FetchRequest::get("page_image", url, self.timeout);

        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| MushafError::ResourceLoad {
                id: page,
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(MushafError::ResourceLoad {
                id: page,
                reason: format!("HTTP {}", response.status),
            });
        }
        Ok(response.body)
    }

    /// Entries held across all catalog and image caches
    pub fn cached_entries(&self) -> usize {
        self.index.len()
            + self.surahs.len()
            + self.reciters.len()
            + self.audio.len()
            + self.images.len()
    }

    /// Drop expired catalog entries
    pub fn sweep(&self) -> usize {
        self.index.sweep() + self.surahs.sweep() + self.reciters.sweep() + self.audio.sweep()
    }

    /// Forget everything cached
    pub fn clear(&self) {
        self.index.clear();
        self.surahs.clear();
        self.reciters.clear();
        self.audio.clear();
        self.images.clear();
    }

    /// Serve `key` from `cache`, or fetch, normalise and store it
    async fn cached<K, T, W>(
        &self,
        cache: &ExpiringCache<K, Arc<T>>,
        key: K,
        request: &FetchRequest,
        normalise: impl FnOnce(W) -> Option<T>,
    ) -> Availability<Arc<T>>
    where
        K: Eq + Hash + Clone,
        W: DeserializeOwned,
    {
        if let Some(hit) = cache.get(&key) {
            self.metrics.record_hit();
            return Availability::Available(hit);
        }

        self.metrics.record_miss();
        let started = Instant::now();

        let endpoint = request.endpoint.as_str();
        let loaded = self
            .fetcher
            .fetch_json::<W>(request)
            .await
            .map(|wire| wire.and_then(normalise));

        match loaded {
            Ok(Some(value)) => {
                let value = Arc::new(value);
                cache.set(key, value.clone());
                self.metrics.record_request(endpoint, started.elapsed());
                Availability::Available(value)
            }
            Ok(None) => {
                self.metrics.record_error(endpoint);
                warn!(endpoint, "Response missing expected data");
                Availability::Unavailable
            }
            Err(err) => {
                self.metrics.record_error(endpoint);
                warn!(endpoint, error = %err, "Loading failed");
                Availability::Unavailable
            }
        }
    }
}
