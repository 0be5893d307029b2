//! Liveness and health read surface
//!
//! A [`HealthReport`] is a point-in-time snapshot of the context's
//! counters. It is read-only: building one never touches the network.

use crate::app::AppContext;
use crate::cache::{CacheStats, EndpointStats};
use crate::error::MushafResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall status derived from recent failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No load has failed since startup
    Ok,
    /// Some loads failed; cached data is still being served
    Degraded,
}

/// Snapshot served by the status surface
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    pub cache: CacheStats,
    pub errors: BTreeMap<String, u64>,
    pub endpoints: BTreeMap<String, EndpointStats>,
    pub search_enabled: bool,
    pub views: Vec<&'static str>,
}

impl HealthReport {
    pub fn collect(ctx: &AppContext) -> Self {
        let now = Utc::now();
        let errors = ctx.error_counts();
        let status = if errors.values().any(|&n| n > 0) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };

        let mut views: Vec<&'static str> = ctx
            .router()
            .registered()
            .into_iter()
            .map(|view| view.tag())
            .collect();
        views.sort_unstable();

        Self {
            status,
            timestamp: now,
            started_at: ctx.started_at(),
            uptime_secs: (now - ctx.started_at()).num_seconds().max(0),
            cache: ctx.cache_stats(),
            errors,
            endpoints: ctx.endpoint_stats(),
            search_enabled: ctx.search().is_enabled(),
            views,
        }
    }

    /// Pretty-printed JSON body
    pub fn to_json(&self) -> MushafResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::testing::RoutedTransport;
    use crate::nav::ViewKind;
    use std::sync::Arc;

    fn context(transport: RoutedTransport) -> AppContext {
        AppContext::with_transport(Config::default(), Arc::new(transport)).unwrap()
    }

    #[test]
    fn fresh_context_is_ok() {
        let report = HealthReport::collect(&context(RoutedTransport::new()));

        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.cache.size, 0);
        assert!(report.errors.is_empty());
        assert!(!report.search_enabled);
        assert_eq!(report.views.len(), ViewKind::ALL.len());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_loads_degrade_status() {
        let ctx = context(RoutedTransport::new().route("/surah", 503, ""));
        assert!(!ctx.catalog().surah_index().await.is_available());

        let report = HealthReport::collect(&ctx);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.errors.get("surah_index"), Some(&1));
    }

    #[test]
    fn json_carries_cache_stats() {
        let json = HealthReport::collect(&context(RoutedTransport::new()))
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "ok");
        assert_eq!(value["cache"]["size"], 0);
        assert!(value["cache"]["hit_rate"].is_number());
        assert!(value["views"].as_array().unwrap().contains(&"menu".into()));
    }
}
