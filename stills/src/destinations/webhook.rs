//! Webhook destination: announces a still to an HTTP endpoint.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::pipeline::{Destination, PublishOptions, PublishResponse};
use crate::utils::http_client::install_rustls_provider;
use crate::{Error, Result};

fn default_name() -> String {
    "webhook".to_string()
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub url: String,
    /// POST or PUT.
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            url: url.into(),
            method: default_method(),
            headers: Vec::new(),
            bearer_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

pub struct WebhookDestination {
    config: WebhookConfig,
    client: Client,
}

impl WebhookDestination {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        reqwest::Url::parse(&config.url)
            .map_err(|e| Error::config(format!("Invalid webhook url {:?}: {e}", config.url)))?;

        install_rustls_provider();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.config.headers {
            if let (Ok(name), Ok(value)) = (name.parse::<HeaderName>(), value.parse::<HeaderValue>())
            {
                headers.insert(name, value);
            } else {
                warn!(header = %name, "Skipping invalid webhook header");
            }
        }
        if let Some(token) = &self.config.bearer_token
            && let Ok(value) = format!("Bearer {token}").parse()
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn build_payload(artifact: &Path, options: &PublishOptions) -> serde_json::Value {
        json!({
            "file": artifact.to_string_lossy(),
            "tags": options.tags,
            "text": options.text,
        })
    }
}

#[async_trait]
impl Destination for WebhookDestination {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn publish(
        &self,
        artifact: &Path,
        options: &PublishOptions,
    ) -> Result<Option<PublishResponse>> {
        let request = match self.config.method.to_uppercase().as_str() {
            "PUT" => self.client.put(&self.config.url),
            _ => self.client.post(&self.config.url),
        };

        let response = request
            .headers(self.build_headers())
            .json(&Self::build_payload(artifact, options))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::destination(
                &self.config.name,
                format!("{status} - {body}"),
            ));
        }

        debug!(status = %status, "Webhook accepted still");
        if body.trim().is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
        Ok(Some(PublishResponse::from_json(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP request with `status` and `body`, returning the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn options() -> PublishOptions {
        PublishOptions {
            tags: vec!["Movie".to_string()],
            text: Some("caption".to_string()),
        }
    }

    #[tokio::test]
    async fn test_publish_lifts_url_from_body() {
        let (url, server) =
            serve_once("200 OK", r#"{"url":"https://example.com/p/1","id":1}"#).await;
        let config = WebhookConfig {
            bearer_token: Some("secret".to_string()),
            ..WebhookConfig::new(url)
        };

        let response = WebhookDestination::new(config)
            .unwrap()
            .publish(Path::new("/stills/a.png"), &options())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.url.as_deref(), Some("https://example.com/p/1"));
        assert_eq!(response.extra["id"], 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains(r#""file":"/stills/a.png""#));
        assert!(request.contains(r#""tags":["Movie"]"#));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_response() {
        let (url, server) = serve_once("204 No Content", "").await;
        let response = WebhookDestination::new(WebhookConfig::new(url))
            .unwrap()
            .publish(Path::new("a.png"), &options())
            .await
            .unwrap();
        assert!(response.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let (url, server) = serve_once("500 Internal Server Error", "boom").await;
        let err = WebhookDestination::new(WebhookConfig::new(url))
            .unwrap()
            .publish(Path::new("a.png"), &options())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Destination { .. }));
        assert!(err.to_string().contains("boom"));
        server.await.unwrap();
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let err = WebhookDestination::new(WebhookConfig::new("not a url")).err().unwrap();
        assert!(err.is_configuration());
    }
}
