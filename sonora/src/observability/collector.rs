//! Prometheus-style counters and histograms.
//!
//! A [`Metrics`] value owns its own recorder instead of installing a process-wide one, so the
//! HTTP layer, the stores and the tests each get exactly the registry they were handed.
//! Every update goes through [`metrics::with_local_recorder`], and the exporter's storage is
//! atomic, so a clone can be shared across request tasks freely.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use thiserror::Error;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const DB_QUERIES_TOTAL: &str = "db_queries_total";
pub const DB_QUERY_DURATION_SECONDS: &str = "db_query_duration_seconds";
pub const USER_ACTIONS_TOTAL: &str = "user_actions_total";
pub const SONGS_PLAYED_TOTAL: &str = "songs_played_total";
pub const PLAYLISTS_CREATED_TOTAL: &str = "playlists_created_total";
pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
pub const ERRORS_TOTAL: &str = "errors_total";

/// Content type of the text exposition format returned by [`Metrics::render`].
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const HTTP_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const DB_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to build metrics recorder: {0}")]
    Build(#[from] BuildError),
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

#[derive(Clone)]
pub struct Metrics {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                HTTP_BUCKETS,
            )?
            .set_buckets_for_metric(
                Matcher::Full(DB_QUERY_DURATION_SECONDS.to_string()),
                DB_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let metrics = Self {
            inner: Arc::new(Inner { recorder, handle }),
        };
        metrics.describe();
        Ok(metrics)
    }

    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        metrics::with_local_recorder(&self.inner.recorder, f)
    }

    fn describe(&self) {
        self.with(|| {
            describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
            describe_histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "Duration of HTTP requests in seconds"
            );
            describe_counter!(DB_QUERIES_TOTAL, "Total number of database queries");
            describe_histogram!(
                DB_QUERY_DURATION_SECONDS,
                "Duration of database queries in seconds"
            );
            describe_counter!(USER_ACTIONS_TOTAL, "Total number of user actions");
            describe_counter!(SONGS_PLAYED_TOTAL, "Total number of songs played");
            describe_counter!(PLAYLISTS_CREATED_TOTAL, "Total number of playlists created");
            describe_counter!(CACHE_HITS_TOTAL, "Total number of cache hits");
            describe_counter!(CACHE_MISSES_TOTAL, "Total number of cache misses");
            describe_counter!(ERRORS_TOTAL, "Total number of errors");
        });
    }

    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        let labels = [
            ("method", method.to_string()),
            ("route", route.to_string()),
            ("status_code", status.to_string()),
        ];
        self.with(|| {
            counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
            histogram!(HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration.as_secs_f64());
        });
    }

    pub fn record_db_query(&self, operation: &str, table: &str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };
        let counter_labels = [
            ("operation", operation.to_string()),
            ("table", table.to_string()),
            ("status", status.to_string()),
        ];
        let duration_labels = [
            ("operation", operation.to_string()),
            ("table", table.to_string()),
        ];
        self.with(|| {
            counter!(DB_QUERIES_TOTAL, &counter_labels).increment(1);
            histogram!(DB_QUERY_DURATION_SECONDS, &duration_labels)
                .record(duration.as_secs_f64());
        });
    }

    pub fn record_user_action(&self, action: &str, user_type: &str) {
        let labels = [
            ("action", action.to_string()),
            ("user_type", user_type.to_string()),
        ];
        self.with(|| counter!(USER_ACTIONS_TOTAL, &labels).increment(1));
    }

    pub fn record_song_played(&self, genre: &str, source: &str) {
        let labels = [("genre", genre.to_string()), ("source", source.to_string())];
        self.with(|| counter!(SONGS_PLAYED_TOTAL, &labels).increment(1));
    }

    pub fn record_playlist_created(&self, user_type: &str) {
        let labels = [("user_type", user_type.to_string())];
        self.with(|| counter!(PLAYLISTS_CREATED_TOTAL, &labels).increment(1));
    }

    pub fn record_cache_hit(&self, cache_type: &str) {
        let labels = [("cache_type", cache_type.to_string())];
        self.with(|| counter!(CACHE_HITS_TOTAL, &labels).increment(1));
    }

    pub fn record_cache_miss(&self, cache_type: &str) {
        let labels = [("cache_type", cache_type.to_string())];
        self.with(|| counter!(CACHE_MISSES_TOTAL, &labels).increment(1));
    }

    pub fn record_error(&self, error_type: &str, component: &str) {
        let labels = [
            ("error_type", error_type.to_string()),
            ("component", component.to_string()),
        ];
        self.with(|| counter!(ERRORS_TOTAL, &labels).increment(1));
    }

    /// Renders every registered metric in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }
}
