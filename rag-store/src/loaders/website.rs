//! Fetches a web page and extracts its readable text.

use std::time::Duration;

use reqwest::Url;
use tracing::{info, warn};

use super::{LoadedDocument, html::html_to_text, stable_source_id};
use crate::{errors::LoaderError, record::Metadata};

const USER_AGENT: &str = concat!("docqa-backend/", env!("CARGO_PKG_VERSION"));

/// HTTP page loader reusing one `reqwest::Client`.
pub struct WebsiteLoader {
    client: reqwest::Client,
    /// Pages with a larger body are rejected.
    max_bytes: usize,
}

impl WebsiteLoader {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(LoaderError::Client)?;
        Ok(Self { client, max_bytes })
    }

    /// Downloads `url` and extracts title and main content.
    ///
    /// # Errors
    /// - `InvalidUrl` unless the URL parses with an `http`/`https` scheme
    /// - `Fetch` on transport failures, `HttpStatus` on non-2xx answers
    /// - `TooLarge` when the body exceeds `max_bytes`
    /// - `Empty` when the page has no visible text
    pub async fn load(&self, url: &str) -> Result<LoadedDocument, LoaderError> {
        let parsed = parse_url(url)?;
        info!(url = %parsed, "fetching website");

        let fetch_err = |source| LoaderError::Fetch {
            url: parsed.to_string(),
            source,
        };

        let too_large = || LoaderError::TooLarge {
            url: parsed.to_string(),
            limit: self.max_bytes,
        };

        let mut resp = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(fetch_err)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %parsed, %status, "website answered with non-success status");
            return Err(LoaderError::HttpStatus {
                url: parsed.to_string(),
                status: status.as_u16(),
            });
        }

        if resp.content_length().is_some_and(|len| len > self.max_bytes as u64) {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong; enforce the cap while reading.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(fetch_err)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        let page = html_to_text(&String::from_utf8_lossy(&body));
        if page.content.trim().is_empty() {
            return Err(LoaderError::Empty(parsed.to_string()));
        }

        let url = parsed.to_string();
        let mut metadata = Metadata::new();
        metadata.insert("url".into(), url.clone().into());
        metadata.insert("title".into(), page.title.unwrap_or_else(|| url.clone()).into());
        metadata.insert("source".into(), "website".into());

        Ok(LoadedDocument {
            source_id: stable_source_id(&format!("web:{url}")),
            text: page.content,
            metadata,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, LoaderError> {
    let url = Url::parse(raw.trim()).map_err(|e| LoaderError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoaderError::InvalidUrl(format!(
            "{raw}: unsupported scheme `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves one raw HTTP/1.1 response and returns the page URL.
    async fn serve_once(head: String, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            // The client may hang up early on oversized bodies.
            let _ = sock.write_all(head.as_bytes()).await;
            let _ = sock.write_all(&body).await;
            let _ = sock.shutdown().await;
        });
        format!("http://{addr}/")
    }

    fn page(len: usize) -> Vec<u8> {
        format!("<html><body><p>{}</p></body></html>", "x".repeat(len)).into_bytes()
    }

    #[test]
    fn only_http_urls_are_accepted() {
        assert!(parse_url("https://example.com/docs").is_ok());
        assert!(matches!(parse_url("ftp://example.com"), Err(LoaderError::InvalidUrl(_))));
        assert!(matches!(parse_url("not a url"), Err(LoaderError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        let loader = WebsiteLoader::new(Duration::from_secs(1), 1024).unwrap();
        let err = loader.load("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, LoaderError::Fetch { .. }));
    }

    #[tokio::test]
    async fn declared_oversized_body_is_rejected() {
        let body = page(4096);
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        let url = serve_once(head, body).await;

        let loader = WebsiteLoader::new(Duration::from_secs(5), 1024).unwrap();
        let err = loader.load(&url).await.unwrap_err();
        assert!(matches!(err, LoaderError::TooLarge { limit: 1024, .. }));
    }

    #[tokio::test]
    async fn undeclared_oversized_body_is_cut_off() {
        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n".to_string();
        let url = serve_once(head, page(4096)).await;

        let loader = WebsiteLoader::new(Duration::from_secs(5), 1024).unwrap();
        let err = loader.load(&url).await.unwrap_err();
        assert!(matches!(err, LoaderError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn small_page_is_loaded() {
        let body = b"<html><head><title>Docs</title></head><body><p>Refunds take 30 days.</p></body></html>".to_vec();
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        let url = serve_once(head, body).await;

        let loader = WebsiteLoader::new(Duration::from_secs(5), 1024).unwrap();
        let doc = loader.load(&url).await.unwrap();
        assert_eq!(doc.text, "Refunds take 30 days.");
        assert_eq!(doc.metadata["title"].as_str(), Some("Docs"));
    }
}
