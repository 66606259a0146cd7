//! Deterministic fixture client
//!
//! `ScriptedSite` holds a shared set of page fixtures keyed by URL, and
//! hands out `ScriptedClient` sessions over them. The site survives session
//! replacement (it implements [`ClientFactory`]), records every navigation
//! and counts created sessions, which is exactly what the recovery tests
//! need to observe. Failures can be queued to make the next navigation
//! fail, and a URL may hold a sequence of page versions that advance on
//! each visit (e.g. a rate-limit page followed by a normal one).

use crate::client::{ClientError, ClientFactory, PageClient, PageElement};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted page fixture
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    elements: HashMap<String, Vec<PageElement>>,
}

impl ScriptedPage {
    /// Sets the text answered for a selector
    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    /// Sets the attribute value answered for a selector
    pub fn with_attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    /// Sets the element snapshots answered for a selector
    pub fn with_elements(mut self, selector: &str, elements: Vec<PageElement>) -> Self {
        self.elements.insert(selector.to_string(), elements);
        self
    }

    fn has_selector(&self, selector: &str) -> bool {
        self.texts.contains_key(selector)
            || self.elements.contains_key(selector)
            || self.attributes.keys().any(|(s, _)| s == selector)
    }
}

#[derive(Debug, Default)]
struct SiteState {
    /// Page versions per URL; the front is served and popped while more
    /// than one version remains, so the last version is sticky.
    pages: HashMap<String, VecDeque<ScriptedPage>>,
    queued_failures: VecDeque<ClientError>,
    visits: Vec<String>,
    sessions_created: usize,
}

/// Shared fixture site; cheap to clone, all clones share state
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    state: Arc<Mutex<SiteState>>,
}

impl ScriptedSite {
    /// Adds a page version for the URL; repeated calls append versions
    pub fn insert_page(&self, url: &str, page: ScriptedPage) {
        let mut state = self.state.lock().unwrap();
        state
            .pages
            .entry(url.to_string())
            .or_default()
            .push_back(page);
    }

    /// Makes the next navigation (across any session) fail with the error
    pub fn queue_failure(&self, error: ClientError) {
        self.state.lock().unwrap().queued_failures.push_back(error);
    }

    /// Every URL navigated to so far, in order, across all sessions
    pub fn visits(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    /// Number of sessions created through the factory
    pub fn sessions_created(&self) -> usize {
        self.state.lock().unwrap().sessions_created
    }

    /// Opens a client session over this site
    pub fn client(&self) -> ScriptedClient {
        ScriptedClient {
            site: self.clone(),
            main: None,
            aux: None,
            in_aux: false,
            alive: true,
        }
    }

    fn visit(&self, url: &str) -> Result<ScriptedPage, ClientError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.queued_failures.pop_front() {
            return Err(error);
        }
        state.visits.push(url.to_string());

        let page = match state.pages.get_mut(url) {
            Some(versions) if versions.len() > 1 => versions.pop_front().unwrap_or_default(),
            Some(versions) => versions.front().cloned().unwrap_or_default(),
            // Unknown URLs answer an empty page so fixtures only need to
            // describe what a test actually reads.
            None => ScriptedPage::default(),
        };
        Ok(page)
    }
}

#[async_trait]
impl ClientFactory for ScriptedSite {
    async fn create(&self) -> Result<Box<dyn PageClient>, ClientError> {
        self.state.lock().unwrap().sessions_created += 1;
        Ok(Box::new(self.client()))
    }
}

/// One client session over a [`ScriptedSite`]
#[derive(Debug)]
pub struct ScriptedClient {
    site: ScriptedSite,
    main: Option<(String, ScriptedPage)>,
    aux: Option<(String, ScriptedPage)>,
    in_aux: bool,
    alive: bool,
}

impl ScriptedClient {
    fn active(&self) -> Result<&ScriptedPage, ClientError> {
        let slot = if self.in_aux { &self.aux } else { &self.main };
        slot.as_ref()
            .map(|(_, page)| page)
            .ok_or_else(|| ClientError::Transport("no page loaded".to_string()))
    }
}

#[async_trait]
impl PageClient for ScriptedClient {
    async fn navigate(&mut self, url: &str) -> Result<(), ClientError> {
        if !self.alive {
            return Err(ClientError::Crashed);
        }
        let page = self.site.visit(url)?;
        let slot = (url.to_string(), page);
        if self.in_aux {
            self.aux = Some(slot);
        } else {
            self.main = Some(slot);
        }
        Ok(())
    }

    async fn find_text(&mut self, selector: &str) -> Result<Option<String>, ClientError> {
        Ok(self.active()?.texts.get(selector).cloned())
    }

    async fn find_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        Ok(self
            .active()?
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<PageElement>, ClientError> {
        Ok(self.active()?.elements.get(selector).cloned().unwrap_or_default())
    }

    fn current_url(&self) -> Option<String> {
        let slot = if self.in_aux { &self.aux } else { &self.main };
        slot.as_ref().map(|(url, _)| url.clone())
    }

    async fn wait_until_present(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ClientError> {
        Ok(self.active()?.has_selector(selector))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ClientError> {
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
