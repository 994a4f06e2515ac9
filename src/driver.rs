//! Page driver capability: navigation plus a DOM snapshot.
//!
//! The crawler only needs two things from a page engine: load a URL, and later
//! (after the settle delay) hand back the document as HTML. [`HttpDriver`]
//! does that with a plain GET; anything able to render pages can implement
//! [`PageDriver`] the same way.

use async_trait::async_trait;

use crate::network::{FetchError, HttpClient};

/// A page that finished navigating.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// URL the visit was queued with.
    pub requested_url: String,
    /// URL after redirects.
    pub url: String,
    body: Option<String>,
}

impl LoadedPage {
    pub fn new(requested_url: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            requested_url: requested_url.into(),
            url: url.into(),
            body: None,
        }
    }

    /// Attach a document captured at load time.
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and wait for the load signal.
    async fn navigate(&self, url: &str) -> Result<LoadedPage, FetchError>;

    /// Serialized DOM of a loaded page.
    async fn snapshot(&self, page: &LoadedPage) -> Result<String, FetchError>;

    /// Release engine resources at the end of a run.
    async fn close(&self) {}
}

/// Driver that fetches documents over HTTP without executing scripts.
pub struct HttpDriver {
    client: HttpClient,
}

impl HttpDriver {
    pub fn new(client: HttpClient, headless: bool) -> Self {
        if !headless {
            tracing::warn!(
                "HTTP driver has no visible browser window; --headless=false is ignored"
            );
        }
        tracing::debug!(user_agent = client.user_agent(), "HTTP driver ready");
        Self { client }
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    async fn navigate(&self, url: &str) -> Result<LoadedPage, FetchError> {
        let fetched = self.client.fetch(url).await?;
        tracing::debug!(
            url,
            final_url = %fetched.final_url,
            status = fetched.status_code,
            content_type = fetched.content_type.as_deref().unwrap_or("-"),
            bytes = fetched.content.len(),
            "Page loaded"
        );
        Ok(LoadedPage::new(url, fetched.final_url).with_body(fetched.content))
    }

    async fn snapshot(&self, page: &LoadedPage) -> Result<String, FetchError> {
        page.body()
            .map(str::to_string)
            .ok_or_else(|| FetchError::Snapshot(format!("no document captured for {}", page.url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_page_body() {
        let page = LoadedPage::new("https://a.test/", "https://a.test/index.html");
        assert_eq!(page.body(), None);
        let page = page.with_body("<html></html>".to_string());
        assert_eq!(page.body(), Some("<html></html>"));
        assert_eq!(page.requested_url, "https://a.test/");
        assert_eq!(page.url, "https://a.test/index.html");
    }

    #[tokio::test]
    async fn test_http_driver_snapshot_requires_body() {
        let client = HttpClient::new("TestBot/1.0".to_string(), 5).unwrap();
        let driver = HttpDriver::new(client, true);
        let page = LoadedPage::new("https://a.test/", "https://a.test/");
        assert!(matches!(driver.snapshot(&page).await, Err(FetchError::Snapshot(_))));
    }
}
