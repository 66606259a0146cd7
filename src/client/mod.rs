//! Page-rendering client interface
//!
//! The harvester never talks to the target site directly; it drives a
//! [`PageClient`] through a small navigation/query surface. Absence of an
//! element is a normal answer (`Ok(None)` / `false`), never an error —
//! [`ClientError`] is reserved for failures that mean the client itself is
//! unusable and must be replaced by the session manager.
//!
//! Two implementations ship with the crate: [`StaticClient`] for
//! server-rendered targets over plain HTTP, and
//! [`scripted::ScriptedClient`], a deterministic fixture client used by the
//! test suites. A JS-rendering client (e.g. a WebDriver wrapper) can be
//! supplied through the same trait.

pub mod scripted;
pub mod static_http;

pub use static_http::{StaticClient, StaticClientFactory};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors signalling that the page client is unusable
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Navigation timed out after {timeout:?} at {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Page client crashed or was closed")]
    Crashed,
}

/// Detached snapshot of one matched element
///
/// Snapshots carry the element's full text and the first link found on or
/// under it; they stay valid after further navigation, unlike live handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElement {
    pub text: String,
    pub link: Option<String>,
}

/// Navigation and query surface of a page-rendering client
#[async_trait]
pub trait PageClient: Send {
    /// Loads the given URL into the active view
    async fn navigate(&mut self, url: &str) -> Result<(), ClientError>;

    /// Text content of the first element matching the selector
    async fn find_text(&mut self, selector: &str) -> Result<Option<String>, ClientError>;

    /// Attribute value of the first element matching the selector
    async fn find_attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, ClientError>;

    /// Snapshots of every element matching the selector, in document order
    async fn find_all(&mut self, selector: &str) -> Result<Vec<PageElement>, ClientError>;

    /// URL of the active view, if anything has been loaded
    fn current_url(&self) -> Option<String>;

    /// Waits until the selector matches, up to the timeout
    ///
    /// Returns false when the deadline passes without a match; that is an
    /// observation, not an error.
    async fn wait_until_present(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ClientError>;

    /// Scrolls the active view to the bottom, forcing lazy content
    async fn scroll_to_bottom(&mut self) -> Result<(), ClientError>;

    /// Switches to a secondary view (e.g. a new tab) for auxiliary lookups
    async fn open_auxiliary_view(&mut self) -> Result<(), ClientError>;

    /// Closes the secondary view and returns to the main one
    async fn close_auxiliary_view(&mut self) -> Result<(), ClientError>;

    /// Returns false once the client has crashed or been closed
    fn is_alive(&self) -> bool;

    /// Releases the client's resources
    async fn close(&mut self);
}

/// Produces fresh page clients for the session manager
///
/// Called once at startup and again after every session-fatal error, so the
/// factory must be reusable.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn PageClient>, ClientError>;
}

/// Resolves a possibly relative href against the page it was found on
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    match url::Url::parse(href) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse(base)
            .ok()?
            .join(href)
            .ok()
            .map(|u| u.to_string()),
        Err(_) => None,
    }
}
