use std::{net::SocketAddr, path::PathBuf, time::Duration};

use axum::Router;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use tokio::signal;

/// Certificate and key for serving HTTPS directly.
#[derive(Clone, Debug)]
pub(crate) struct TlsPaths {
    pub(crate) cert: PathBuf,
    pub(crate) key: PathBuf,
}

impl TlsPaths {
    /// Reads `TLS_CERT_PATH` and `TLS_KEY_PATH`; plain HTTP unless both are set.
    pub(crate) fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var("TLS_CERT_PATH").ok(),
            std::env::var("TLS_KEY_PATH").ok(),
        )
    }

    fn from_values(cert: Option<String>, key: Option<String>) -> Option<Self> {
        match (cert, key) {
            (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Some(Self {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            _ => None,
        }
    }
}

/// Serves `app` on `port` until SIGINT or SIGTERM, then drains open connections.
pub(crate) async fn serve(
    port: u16,
    app: Router,
    tls: Option<TlsPaths>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    match tls {
        Some(paths) => {
            let config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
            tracing::info!(%addr, "HTTPS server listening");
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(service)
                .await?;
        }
        None => {
            tracing::info!(%addr, "HTTP server listening");
            axum_server::bind(addr).handle(handle).serve(service).await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls_needs_both_paths() {
        assert!(TlsPaths::from_values(None, None).is_none());
        assert!(TlsPaths::from_values(Some("cert.pem".into()), None).is_none());
        assert!(TlsPaths::from_values(Some(String::new()), Some("key.pem".into())).is_none());

        let paths = TlsPaths::from_values(Some("cert.pem".into()), Some("key.pem".into())).unwrap();
        assert_eq!(paths.cert, PathBuf::from("cert.pem"));
        assert_eq!(paths.key, PathBuf::from("key.pem"));
    }
}
