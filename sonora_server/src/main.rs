use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sonora::{AppConfig, Database, Metrics};
use sonora_axum::{AppState, app_router};

mod server;

use crate::server::{TlsPaths, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Install default CryptoProvider for rustls to prevent:
    // "no process-level CryptoProvider available -- call CryptoProvider::install_default() before this point"
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install default CryptoProvider");

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing(
        config.dev_mode,
        std::env::var("RUST_LOG").ok(),
        std::env::var("LOG_LEVEL").ok(),
    );

    let metrics = Metrics::new()?;
    let db = Database::connect(&config, metrics)?;
    sonora::init(&db).await?;
    tracing::info!(
        database = ?config.database_kind,
        table_prefix = %config.table_prefix,
        google_enabled = config.google.is_some(),
        dev_mode = config.dev_mode,
        "Sonora initialized"
    );

    let port = config.port;
    let state = AppState::new(config, db)?;
    serve(port, app_router(state), TlsPaths::from_env()).await
}

/// `RUST_LOG` wins over `LOG_LEVEL`; both unset means `info`.
fn filter_directive(rust_log: Option<String>, log_level: Option<String>) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or(log_level.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "info".to_string())
}

fn init_tracing(dev_mode: bool, rust_log: Option<String>, log_level: Option<String>) {
    let filter = EnvFilter::try_new(filter_directive(rust_log, log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if dev_mode {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_precedence() {
        assert_eq!(filter_directive(None, None), "info");
        assert_eq!(filter_directive(None, Some("warn".into())), "warn");
        assert_eq!(
            filter_directive(Some("sonora=debug".into()), Some("warn".into())),
            "sonora=debug"
        );
        assert_eq!(filter_directive(Some("  ".into()), Some("error".into())), "error");
    }
}
