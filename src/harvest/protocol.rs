//! Per-item navigation protocol
//!
//! One work item is processed as a fixed linear page sequence: search →
//! select result → detail page → optional phones subpage → board rows →
//! one person page per related person (with the detail page restored after
//! each) → optional auxiliary registry lookup. This is a sequence, not a
//! general graph: every deviation from it is either a business skip, a
//! deterministic dead end or a session-fatal fault.
//!
//! Returning to the detail page is always done by re-navigating to its
//! remembered URL, never through browser history.

use crate::client::{resolve_href, ClientError, PageClient};
use crate::config::SiteProfile;
use crate::extract::{clean_text, extract_company, extract_person};
use crate::harvest::Throttle;
use crate::record::{CompanyRecord, RelatedPerson};
use std::time::Duration;
use thiserror::Error;

/// Faults that abort the current item and defer to the session manager
///
/// The item is left pending with the caller; there are no partial sub-step
/// retries inside the sequence.
#[derive(Debug, Error)]
pub enum StepError {
    /// The target served its "search limit reached" page
    #[error("search limit reached")]
    RateLimited,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Terminal result of driving one item through the page sequence
#[derive(Debug)]
pub enum ItemOutcome {
    /// A record was assembled; the identity gate is checked by the caller
    Collected(Box<CompanyRecord>),

    /// The candidate carries the flagged marker; a business skip, not an
    /// error
    Flagged(String),

    /// Deterministic dead end (no candidate, no usable link); retrying
    /// cannot help
    Rejected(String),
}

/// Drives a page client through the per-item page sequence
pub struct Navigator {
    site: SiteProfile,
    throttle: Throttle,
    wait_timeout: Duration,
}

impl Navigator {
    pub fn new(site: SiteProfile, throttle: Throttle, wait_timeout: Duration) -> Self {
        Self {
            site,
            throttle,
            wait_timeout,
        }
    }

    /// Processes one work item end to end
    pub async fn run_item(
        &self,
        client: &mut dyn PageClient,
        id: &str,
    ) -> Result<ItemOutcome, StepError> {
        // Search
        let search_url = self.site.search_url_for(id);
        self.throttle.pause().await;
        client.navigate(&search_url).await?;

        if client
            .find_text(&self.site.rate_limit_marker)
            .await?
            .is_some()
        {
            return Err(StepError::RateLimited);
        }

        if !client
            .wait_until_present(&self.site.result_wait, self.wait_timeout)
            .await?
        {
            // The limit page may render late, after the first check.
            if client
                .find_text(&self.site.rate_limit_marker)
                .await?
                .is_some()
            {
                return Err(StepError::RateLimited);
            }
            return Ok(ItemOutcome::Rejected("no search results".to_string()));
        }

        // Select result
        if let Some(marker) = &self.site.flagged_marker {
            if let Some(text) = client.find_text(marker).await? {
                let text = clean_text(&text);
                let reason = if text.is_empty() {
                    "flagged candidate".to_string()
                } else {
                    text
                };
                tracing::info!("{}: candidate is flagged, skipping", id);
                return Ok(ItemOutcome::Flagged(reason));
            }
        }

        let href = match client.find_attribute(&self.site.result_link, "href").await? {
            Some(href) => href,
            None => return Ok(ItemOutcome::Rejected("no candidate link".to_string())),
        };
        let base = client.current_url().unwrap_or_else(|| search_url.clone());
        let detail_url = match resolve_href(&base, &href) {
            Some(url) => url,
            None => {
                return Ok(ItemOutcome::Rejected(format!(
                    "unusable candidate link: {}",
                    href
                )))
            }
        };

        // Detail page
        let mut record = CompanyRecord::new(id);
        self.load_page(client, &detail_url).await?;
        record.source_url = client.current_url();
        extract_company(client, &self.site, &mut record).await?;

        self.collect_phones(client, &mut record, &detail_url).await?;
        self.collect_board(client, &mut record, &detail_url).await?;
        self.collect_aux(client, &mut record, id).await?;

        Ok(ItemOutcome::Collected(Box::new(record)))
    }

    /// Navigates to a page and scrolls it to the bottom, forcing lazy
    /// content, each behind its own throttle pause
    async fn load_page(&self, client: &mut dyn PageClient, url: &str) -> Result<(), ClientError> {
        self.throttle.pause().await;
        client.navigate(url).await?;
        self.throttle.pause().await;
        client.scroll_to_bottom().await
    }

    /// Visits the phones subpage, if configured and linked from the detail
    /// page, and restores the detail page afterwards
    async fn collect_phones(
        &self,
        client: &mut dyn PageClient,
        record: &mut CompanyRecord,
        detail_url: &str,
    ) -> Result<(), ClientError> {
        let (link_sel, entry_sel) = match (&self.site.phones_link, &self.site.phone_entry) {
            (Some(link), Some(entry)) => (link, entry),
            _ => return Ok(()),
        };
        let href = match client.find_attribute(link_sel, "href").await? {
            Some(href) => href,
            // Absence of the subpage link is normal: empty contribution.
            None => return Ok(()),
        };
        let base = client.current_url().unwrap_or_else(|| detail_url.to_string());
        let url = match resolve_href(&base, &href) {
            Some(url) => url,
            None => return Ok(()),
        };

        self.load_page(client, &url).await?;
        for element in client.find_all(entry_sel).await? {
            let number = clean_text(&element.text);
            if !number.is_empty() && !record.phones.contains(&number) {
                record.phones.push(number);
            }
        }

        self.throttle.pause().await;
        client.navigate(detail_url).await
    }

    /// Reads board rows and visits each related person's profile page
    ///
    /// Rows are deduplicated by display name before any person page is
    /// visited, so a person listed under two roles is fetched once and
    /// keeps the first role. The detail page is restored by URL after
    /// every person page.
    async fn collect_board(
        &self,
        client: &mut dyn PageClient,
        record: &mut CompanyRecord,
        detail_url: &str,
    ) -> Result<(), ClientError> {
        let row_sel = match &self.site.board_row {
            Some(sel) => sel,
            None => return Ok(()),
        };

        // Board rows live on a subpage when a link is configured and
        // present, otherwise on the detail page itself.
        if let Some(link_sel) = &self.site.board_link {
            if let Some(href) = client.find_attribute(link_sel, "href").await? {
                let base = client.current_url().unwrap_or_else(|| detail_url.to_string());
                if let Some(url) = resolve_href(&base, &href) {
                    self.load_page(client, &url).await?;
                }
            }
        }

        let base = client.current_url().unwrap_or_else(|| detail_url.to_string());
        let mut people: Vec<(Option<String>, String, Option<String>)> = Vec::new();
        for row in client.find_all(row_sel).await? {
            let (role, name) = split_board_row(&row.text);
            if name.is_empty() {
                continue;
            }
            if people.iter().any(|(_, seen, _)| *seen == name) {
                continue;
            }
            let link = row.link.as_deref().and_then(|href| resolve_href(&base, href));
            people.push((role, name, link));
        }
        tracing::debug!("Found {} related people", people.len());

        for (role, display_name, link) in people {
            let details = match &link {
                Some(url) => {
                    self.load_page(client, url).await?;
                    let details = extract_person(client, &self.site.person).await?;

                    self.throttle.pause().await;
                    client.navigate(detail_url).await?;
                    Some(details)
                }
                None => None,
            };
            record.push_person(RelatedPerson {
                role,
                display_name,
                details,
            });
        }

        Ok(())
    }

    /// Resolves one value through the auxiliary registry, in a separate
    /// view so the detail page stays loaded in the main one
    async fn collect_aux(
        &self,
        client: &mut dyn PageClient,
        record: &mut CompanyRecord,
        id: &str,
    ) -> Result<(), ClientError> {
        let url = match self.site.aux_lookup_url_for(id) {
            Some(url) => url,
            None => return Ok(()),
        };
        let result_sel = match &self.site.aux_result {
            Some(sel) => sel,
            None => return Ok(()),
        };

        client.open_auxiliary_view().await?;
        self.throttle.pause().await;
        client.navigate(&url).await?;
        record.contact.bankgiro = client
            .find_text(result_sel)
            .await?
            .map(|t| clean_text(&t))
            .filter(|t| !t.is_empty());
        client.close_auxiliary_view().await
    }
}

/// Splits a board row's text at the first colon into role and display name
fn split_board_row(text: &str) -> (Option<String>, String) {
    let cleaned = clean_text(text);
    match cleaned.split_once(':') {
        Some((role, name)) => {
            let role = role.trim();
            let role = if role.is_empty() {
                None
            } else {
                Some(role.to_string())
            };
            (role, name.trim().to_string())
        }
        None => (None, cleaned),
    }
}
