//! Application context
//!
//! One [`AppContext`] owns every process-wide structure: the catalog
//! caches, metrics, the router and the external collaborators. Handlers
//! receive it by reference; nothing is reached through globals.

use crate::cache::{CacheStats, EndpointStats, Metrics};
use crate::catalog::CatalogLoader;
use crate::config::Config;
use crate::error::{MushafResult, Notice};
use crate::fetch::{HttpTransport, ResilientFetcher, RetryPolicy, UreqTransport};
use crate::nav::{Dispatch, NavigationCodec, NavigationIntent, NavigationToken, Router, ViewKind};
use crate::search::{self, DisabledSearch, RemoteSearch, SearchResolver};
use crate::transport::{AllowAll, Button, Event, EventKind, ReplyChannel, SubscriptionCheck, UserId};
use crate::views;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Shared state behind every event
pub struct AppContext {
    config: Config,
    metrics: Arc<Metrics>,
    catalog: CatalogLoader,
    router: Router,
    search: Arc<dyn SearchResolver>,
    subscription: Arc<dyn SubscriptionCheck>,
    started_at: DateTime<Utc>,
}

impl AppContext {
    /// Build the production context: `ureq` transport, remote search when a
    /// key is available, no subscription gate
    pub fn from_config(config: Config) -> MushafResult<Self> {
        let agent_timeout = config
            .fetch
            .timeout()
            .max(Duration::from_secs(config.search.timeout_secs));
        let transport: Arc<dyn HttpTransport> = Arc::new(UreqTransport::new(agent_timeout));

        let context = Self::with_transport(config, transport.clone())?;
        let api_key = search::resolve_api_key(&context.config.search);
        let search: Arc<dyn SearchResolver> = match api_key {
            Some(key) => Arc::new(RemoteSearch::new(
                ResilientFetcher::new(transport, RetryPolicy::from_config(&context.config.fetch)),
                &context.config.search,
                key,
            )),
            None => {
                info!("No search API key configured, search is disabled");
                Arc::new(DisabledSearch)
            }
        };
        Ok(context.with_search(search))
    }

    /// Build a context over an arbitrary transport, with search disabled
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> MushafResult<Self> {
        config.validate()?;

        let metrics = Arc::new(Metrics::new());
        let fetcher = ResilientFetcher::new(transport, RetryPolicy::from_config(&config.fetch));
        let catalog = CatalogLoader::new(
            fetcher,
            config.endpoints.clone(),
            &config.cache,
            config.fetch.timeout(),
            metrics.clone(),
        );
        let router = views::router(NavigationCodec::new(config.navigation.max_token_bytes));

        Ok(Self {
            config,
            metrics,
            catalog,
            router,
            search: Arc::new(DisabledSearch),
            subscription: Arc::new(AllowAll),
            started_at: Utc::now(),
        })
    }

    pub fn with_search(mut self, search: Arc<dyn SearchResolver>) -> Self {
        self.search = search;
        self
    }

    pub fn with_subscription(mut self, check: Arc<dyn SubscriptionCheck>) -> Self {
        self.subscription = check;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogLoader {
        &self.catalog
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn codec(&self) -> &NavigationCodec {
        self.router.codec()
    }

    pub fn search(&self) -> &dyn SearchResolver {
        self.search.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn page_size(&self) -> usize {
        self.config.navigation.page_size
    }

    pub fn max_chunk_bytes(&self) -> usize {
        self.config.navigation.max_chunk_bytes
    }

    pub async fn is_subscribed(&self, user: UserId) -> bool {
        self.subscription.is_subscribed(user).await
    }

    /// Encode `intent` with the configured size limit
    pub fn token(&self, intent: &NavigationIntent) -> MushafResult<NavigationToken> {
        self.codec().encode(intent)
    }

    /// A button navigating to `intent`
    pub fn button(
        &self,
        label: impl Into<String>,
        intent: NavigationIntent,
    ) -> MushafResult<Button> {
        Ok(Button::new(label, self.token(&intent)?))
    }

    /// Entries cached and the overall hit rate
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            size: self.catalog.cached_entries(),
            hit_rate: self.metrics.hit_rate(),
        }
    }

    /// Failed loads per endpoint
    pub fn error_counts(&self) -> BTreeMap<String, u64> {
        self.metrics.error_counts()
    }

    pub fn endpoint_stats(&self) -> BTreeMap<String, EndpointStats> {
        self.metrics.endpoint_stats()
    }

    /// Drop expired entries every `cache.sweep_interval_secs`
    ///
    /// Returns `None` when sweeping is disabled. The task ends once the
    /// context is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let secs = self.config.cache.sweep_interval_secs;
        if secs == 0 {
            return None;
        }

        let context: Weak<Self> = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(context) = context.upgrade() else {
                    break;
                };
                let removed = context.catalog.sweep();
                if removed > 0 {
                    debug!(removed, "Swept expired cache entries");
                }
            }
        }))
    }

    /// Handle one inbound interaction end to end
    pub async fn handle_event(&self, event: Event, channel: &dyn ReplyChannel) -> Dispatch {
        match event.kind {
            EventKind::Button(raw) => self.router.dispatch(&raw, event.user, self, channel).await,
            EventKind::Command(command) => self.handle_command(&command, event.user, channel).await,
            EventKind::Text(text) => {
                let span = info_span!(
                    "event",
                    event_id = %Uuid::new_v4(),
                    user = event.user,
                    view = ViewKind::Search.tag()
                );
                views::search::answer(self, &text, channel)
                    .instrument(span)
                    .await
            }
        }
    }

    async fn handle_command(
        &self,
        command: &str,
        user: UserId,
        channel: &dyn ReplyChannel,
    ) -> Dispatch {
        let name = command.split_whitespace().next().unwrap_or_default();
        match name {
            "/start" | "/menu" => {
                if !self.is_subscribed(user).await {
                    let reply = views::menus::subscription_prompt(self);
                    return match channel.send(reply).await {
                        Ok(()) => Dispatch::Fallback(Notice::SubscriptionRequired),
                        Err(err) => Dispatch::Fallback(err.notice()),
                    };
                }
                self.router
                    .dispatch_intent(&NavigationIntent::main_menu(), user, self, channel)
                    .await
            }
            _ => {
                self.router.send_notice(Notice::NotAvailableYet, channel).await;
                Dispatch::Fallback(Notice::NotAvailableYet)
            }
        }
    }
}
