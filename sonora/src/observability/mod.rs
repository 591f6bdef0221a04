mod collector;

pub use collector::{
    CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, CONTENT_TYPE, DB_QUERIES_TOTAL,
    DB_QUERY_DURATION_SECONDS, ERRORS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
    Metrics, MetricsError, PLAYLISTS_CREATED_TOTAL, SONGS_PLAYED_TOTAL, USER_ACTIONS_TOTAL,
};
