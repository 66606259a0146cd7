//! HTTP-backed page client for server-rendered targets
//!
//! Fetches documents with reqwest and answers selector queries against the
//! parsed HTML. The auxiliary view is a second document slot, mirroring a
//! browser tab. `wait_until_present` re-fetches the current URL until the
//! deadline, which suits targets that render server-side but answer slowly.
//!
//! The parsed document is never stored: `scraper::Html` is not `Send`, so
//! every query re-parses the cached body inside a synchronous helper and
//! drops the DOM before the next await point.

use crate::client::{ClientError, ClientFactory, PageClient, PageElement};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One fetched document
#[derive(Debug, Clone)]
struct Document {
    url: String,
    body: String,
}

/// A page client over plain HTTP
pub struct StaticClient {
    http: reqwest::Client,
    timeout: Duration,
    main: Option<Document>,
    aux: Option<Document>,
    in_aux: bool,
    alive: bool,
}

impl StaticClient {
    /// Builds a client with the given user agent and request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            timeout,
            main: None,
            aux: None,
            in_aux: false,
            alive: true,
        })
    }

    async fn fetch(&mut self, url: &str) -> Result<(), ClientError> {
        if !self.alive {
            return Err(ClientError::Crashed);
        }

        let timeout = self.timeout;
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("HTTP {} at {}", status, url)));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let document = Document {
            url: final_url,
            body,
        };
        if self.in_aux {
            self.aux = Some(document);
        } else {
            self.main = Some(document);
        }
        Ok(())
    }

    fn active(&self) -> Result<&Document, ClientError> {
        let slot = if self.in_aux { &self.aux } else { &self.main };
        slot.as_ref()
            .ok_or_else(|| ClientError::Transport("no document loaded".to_string()))
    }
}

#[async_trait]
impl PageClient for StaticClient {
    async fn navigate(&mut self, url: &str) -> Result<(), ClientError> {
        tracing::debug!("Navigating to {}", url);
        self.fetch(url).await
    }

    async fn find_text(&mut self, selector: &str) -> Result<Option<String>, ClientError> {
        let document = self.active()?;
        Ok(query_text(&document.body, selector))
    }

    async fn find_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        let document = self.active()?;
        Ok(query_attribute(&document.body, selector, name))
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<PageElement>, ClientError> {
        let document = self.active()?;
        Ok(query_all(&document.body, selector))
    }

    fn current_url(&self) -> Option<String> {
        let slot = if self.in_aux { &self.aux } else { &self.main };
        slot.as_ref().map(|d| d.url.clone())
    }

    async fn wait_until_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ClientError> {
        let deadline = Instant::now() + timeout;
        loop {
            let present = {
                let document = self.active()?;
                query_present(&document.body, selector)
            };
            if present {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }

            tokio::time::sleep(WAIT_POLL_INTERVAL.min(timeout)).await;

            // Static documents do not change in place; give the server
            // another chance to render the element.
            let url = self
                .current_url()
                .ok_or_else(|| ClientError::Transport("no document loaded".to_string()))?;
            self.fetch(&url).await?;
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ClientError> {
        // Fetched documents arrive fully materialized.
        Ok(())
    }

    async fn open_auxiliary_view(&mut self) -> Result<(), ClientError> {
        self.in_aux = true;
        self.aux = None;
        Ok(())
    }

    async fn close_auxiliary_view(&mut self) -> Result<(), ClientError> {
        self.in_aux = false;
        self.aux = None;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    async fn close(&mut self) {
        self.alive = false;
        self.main = None;
        self.aux = None;
    }
}

/// Factory producing [`StaticClient`] instances for the session manager
pub struct StaticClientFactory {
    pub user_agent: String,
    pub timeout: Duration,
}

#[async_trait]
impl ClientFactory for StaticClientFactory {
    async fn create(&self) -> Result<Box<dyn PageClient>, ClientError> {
        Ok(Box::new(StaticClient::new(&self.user_agent, self.timeout)?))
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            // Selectors are pre-validated at config load; anything invalid
            // here answers "absent" rather than poisoning the item.
            tracing::warn!("Invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

fn query_text(body: &str, selector: &str) -> Option<String> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(body);
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
}

fn query_attribute(body: &str, selector: &str, name: &str) -> Option<String> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(body);
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(name))
        .map(|v| v.to_string())
}

fn query_all(body: &str, selector: &str) -> Vec<PageElement> {
    let Some(selector) = parse_selector(selector) else {
        return Vec::new();
    };
    let link_selector = Selector::parse("a[href]").expect("static selector");
    let document = Html::parse_document(body);

    document
        .select(&selector)
        .map(|el| {
            let link = el
                .value()
                .attr("href")
                .map(|v| v.to_string())
                .or_else(|| {
                    el.select(&link_selector)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(|v| v.to_string())
                });
            PageElement {
                text: el.text().collect::<Vec<_>>().join(" "),
                link,
            }
        })
        .collect()
}

fn query_present(body: &str, selector: &str) -> bool {
    let Some(selector) = parse_selector(selector) else {
        return false;
    };
    let document = Html::parse_document(body);
    document.select(&selector).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1><span class="namn">Example AB</span></h1>
          <div class="result-list">
            <a href="/foretag/example-ab">Example AB</a>
          </div>
          <table>
            <tr class="board-row"><td>VD:</td><td><a href="/person/anna">Anna Svensson</a></td></tr>
            <tr class="board-row"><td>Ordförande:</td><td><a href="/person/jan">Jan Eriksson</a></td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_query_text() {
        assert_eq!(
            query_text(PAGE, "h1 .namn").as_deref(),
            Some("Example AB")
        );
        assert_eq!(query_text(PAGE, ".missing"), None);
    }

    #[test]
    fn test_query_attribute() {
        assert_eq!(
            query_attribute(PAGE, ".result-list a", "href").as_deref(),
            Some("/foretag/example-ab")
        );
        assert_eq!(query_attribute(PAGE, ".result-list a", "title"), None);
    }

    #[test]
    fn test_query_all_snapshots_with_descendant_links() {
        let rows = query_all(PAGE, "tr.board-row");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].text.contains("VD:"));
        assert!(rows[0].text.contains("Anna Svensson"));
        assert_eq!(rows[0].link.as_deref(), Some("/person/anna"));
        assert_eq!(rows[1].link.as_deref(), Some("/person/jan"));
    }

    #[test]
    fn test_query_present() {
        assert!(query_present(PAGE, ".result-list"));
        assert!(!query_present(PAGE, ".rate-limit-banner"));
    }

    #[test]
    fn test_invalid_selector_answers_absent() {
        assert_eq!(query_text(PAGE, ":::"), None);
        assert!(query_all(PAGE, ":::").is_empty());
        assert!(!query_present(PAGE, ":::"));
    }
}
