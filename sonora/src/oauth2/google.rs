use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::oauth2::{
    config::GoogleOAuthConfig,
    errors::OAuth2Error,
    idtoken::decode_google_id_token,
    provider::{IdentityProvider, code_challenge},
    types::{IdTokenClaims, OidcTokenResponse, OidcTokens},
};

/// [`IdentityProvider`] for Google accounts.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    config: GoogleOAuthConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, OAuth2Error> {
        Url::parse(&config.auth_url)
            .map_err(|e| OAuth2Error::Config(format!("auth_url: {e}")))?;
        Url::parse(&config.token_url)
            .map_err(|e| OAuth2Error::Config(format!("token_url: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| OAuth2Error::Config(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(
        &self,
        state: &str,
        code_verifier: &str,
        scopes: &[&str],
    ) -> Result<String, OAuth2Error> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| OAuth2Error::Config(format!("auth_url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &scopes.join(" "))
            .append_pair("state", state)
            .append_pair("code_challenge", &code_challenge(code_verifier))
            .append_pair("code_challenge_method", "S256");
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<OidcTokens, OAuth2Error> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "Token endpoint rejected the authorization code");
            return Err(OAuth2Error::TokenExchange(status.to_string()));
        }

        let body: OidcTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        tracing::debug!(
            token_type = ?body.token_type,
            scope = ?body.scope,
            expires_in = ?body.expires_in,
            "Token exchange succeeded"
        );

        let id_token = body.id_token.ok_or_else(|| {
            OAuth2Error::TokenExchange("ID token not present in response".to_string())
        })?;

        Ok(OidcTokens {
            access_token: body.access_token,
            id_token,
            expires_in: body.expires_in,
            refresh_token: body.refresh_token,
        })
    }

    fn decode_id_token(&self, id_token: &str) -> Result<IdTokenClaims, OAuth2Error> {
        decode_google_id_token(id_token, &self.config.client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth2::config::GOOGLE_SCOPES;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(token_url: &str) -> GoogleOAuthConfig {
        let mut config = GoogleOAuthConfig::new(
            "client-123",
            "shh",
            "http://localhost:3000/login/google/callback",
        );
        config.token_url = token_url.to_string();
        config
    }

    /// Serves exactly one HTTP response and hands back the raw request it received.
    async fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];
            // Read until the headers and the full form body have arrived
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                received.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some((head, rest)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if rest.len() >= length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });
        (format!("http://{addr}/token"), handle)
    }

    #[test]
    fn test_authorization_url_carries_pkce_and_state() {
        let provider = GoogleProvider::new(config("https://oauth2.googleapis.com/token")).unwrap();

        let url = provider
            .authorization_url("st4te", "verifier-abc", &GOOGLE_SCOPES)
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let query: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert_eq!(query["state"], "st4te");
        assert_eq!(query["scope"], "openid profile email");
        assert_eq!(query["code_challenge"], code_challenge("verifier-abc"));
        assert_eq!(query["code_challenge_method"], "S256");
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["response_type"], "code");
    }

    #[test]
    fn test_invalid_endpoint_rejected_at_construction() {
        assert!(matches!(
            GoogleProvider::new(config("not a url")),
            Err(OAuth2Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_code_posts_form_and_reads_tokens() {
        let (url, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"access_token":"at","id_token":"it","token_type":"Bearer","expires_in":3599}"#,
        )
        .await;
        let provider = GoogleProvider::new(config(&url)).unwrap();

        let tokens = provider.exchange_code("auth-code", "verifier").await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.id_token, "it");
        assert_eq!(tokens.expires_in, Some(3599));
        assert!(request.starts_with("POST /token"));
        assert!(request.contains("grant_type=authorization_code"));
        assert!(request.contains("code_verifier=verifier"));
    }

    #[tokio::test]
    async fn test_exchange_code_error_status() {
        let (url, _server) =
            one_shot_server("HTTP/1.1 400 Bad Request", r#"{"error":"invalid_grant"}"#).await;
        let provider = GoogleProvider::new(config(&url)).unwrap();

        let result = provider.exchange_code("bad", "verifier").await;

        assert!(matches!(result, Err(OAuth2Error::TokenExchange(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_without_id_token() {
        let (url, _server) =
            one_shot_server("HTTP/1.1 200 OK", r#"{"access_token":"at"}"#).await;
        let provider = GoogleProvider::new(config(&url)).unwrap();

        let err = provider.exchange_code("code", "verifier").await.unwrap_err();

        assert_eq!(
            err,
            OAuth2Error::TokenExchange("ID token not present in response".to_string())
        );
    }
}
