//! Session lifecycle management
//!
//! A session wraps one live page client. Sessions are destroyed and
//! replaced on any fatal error, never repaired: the manager closes the
//! client, applies a jittered backoff and builds a fresh one through the
//! factory on the next `acquire()`.
//!
//! The one-time bootstrap gate (a human login/consent step) is sticky for
//! the lifetime of the process, not of the session — a replacement session
//! after a fault must never prompt the operator again.

use crate::client::{ClientError, ClientFactory, PageClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Errors from session management
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Page client error: {0}")]
    Client(#[from] ClientError),

    #[error("Session bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Lifecycle state of the managed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No client exists; the next `acquire()` creates one
    NoSession,

    /// A client exists and the bootstrap gate is running
    Bootstrapping,

    /// A live client is available
    Ready,

    /// The last session was destroyed after a fatal error
    Faulted,

    /// Shut down for good
    Closed,
}

/// One-time human checkpoint performed on the first session
#[async_trait]
pub trait BootstrapGate: Send + Sync {
    async fn wait(&self, client: &mut dyn PageClient) -> Result<(), SessionError>;
}

/// Console bootstrap gate: navigates to the start page and blocks until the
/// operator confirms login/consent with Enter
pub struct ConsoleGate {
    pub start_url: String,
}

#[async_trait]
impl BootstrapGate for ConsoleGate {
    async fn wait(&self, client: &mut dyn PageClient) -> Result<(), SessionError> {
        client.navigate(&self.start_url).await?;

        println!();
        println!("== Manual step ==");
        println!("   The session is open at {}", self.start_url);
        println!("   Handle any cookie banner and log in if required.");
        println!(">> Press Enter here when ready...");

        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| SessionError::Bootstrap(e.to_string()))?
        .map_err(|e| SessionError::Bootstrap(e.to_string()))?;

        Ok(())
    }
}

/// Owns the lifetime of the page client
pub struct SessionManager {
    factory: Box<dyn ClientFactory>,
    gate: Option<Box<dyn BootstrapGate>>,
    client: Option<Box<dyn PageClient>>,
    state: SessionState,
    bootstrap_done: bool,
    created_at: Option<DateTime<Utc>>,
    restart_delay: (Duration, Duration),
    restarts: u32,
}

impl SessionManager {
    /// Creates a manager with no live session
    ///
    /// # Arguments
    ///
    /// * `factory` - Builds replacement clients after faults
    /// * `gate` - Optional one-time bootstrap checkpoint
    /// * `restart_delay` - Min/max bounds of the jittered backoff applied
    ///   between destroying a faulted session and creating the next one
    pub fn new(
        factory: Box<dyn ClientFactory>,
        gate: Option<Box<dyn BootstrapGate>>,
        restart_delay: (Duration, Duration),
    ) -> Self {
        Self {
            factory,
            gate,
            client: None,
            state: SessionState::NoSession,
            bootstrap_done: false,
            created_at: None,
            restart_delay,
            restarts: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true once the one-time bootstrap has run
    pub fn bootstrap_done(&self) -> bool {
        self.bootstrap_done
    }

    /// Number of sessions destroyed after faults so far
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Creation time of the current session, if one exists
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns a ready client, creating and bootstrapping one if needed
    pub async fn acquire(&mut self) -> Result<&mut dyn PageClient, SessionError> {
        // A dead client is replaced, never repaired.
        if self.client.as_ref().map(|c| !c.is_alive()).unwrap_or(false) {
            tracing::warn!("Discarding dead page client");
            self.destroy().await;
        }

        if self.client.is_none() {
            tracing::info!("Creating page client session");
            let mut client = self.factory.create().await?;

            if !self.bootstrap_done {
                if let Some(gate) = &self.gate {
                    self.state = SessionState::Bootstrapping;
                    gate.wait(client.as_mut()).await?;
                }
                self.bootstrap_done = true;
            }

            self.client = Some(client);
            self.created_at = Some(Utc::now());
            self.state = SessionState::Ready;
        }

        match self.client.as_deref_mut() {
            Some(client) => Ok(client),
            None => unreachable!("client installed above"),
        }
    }

    /// Destroys the current session after a fatal error and backs off
    ///
    /// The in-flight item stays pending with the caller; the next
    /// `acquire()` produces a fresh session without re-running the
    /// bootstrap gate.
    pub async fn report_fault(&mut self, reason: &str) {
        self.restarts += 1;
        tracing::warn!(
            "Session fault: {} — discarding session (restart #{})",
            reason,
            self.restarts
        );

        self.destroy().await;
        self.state = SessionState::Faulted;

        let delay = self.pick_restart_delay();
        tracing::info!("Backing off {:?} before the next session", delay);
        tokio::time::sleep(delay).await;

        self.state = SessionState::NoSession;
    }

    /// Closes the session for good
    pub async fn close(&mut self) {
        self.destroy().await;
        self.state = SessionState::Closed;
    }

    async fn destroy(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.close().await;
        }
        self.created_at = None;
    }

    fn pick_restart_delay(&self) -> Duration {
        let (min, max) = self.restart_delay;
        if max <= min {
            return min;
        }
        let millis = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::ScriptedSite;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingGate {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BootstrapGate for CountingGate {
        async fn wait(&self, client: &mut dyn PageClient) -> Result<(), SessionError> {
            client.navigate("https://reg.test/").await?;
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn no_delay() -> (Duration, Duration) {
        (Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_acquire_reuses_live_session() {
        let site = ScriptedSite::default();
        let mut sessions = SessionManager::new(Box::new(site.clone()), None, no_delay());

        assert_eq!(sessions.state(), SessionState::NoSession);
        sessions.acquire().await.unwrap();
        assert_eq!(sessions.state(), SessionState::Ready);
        sessions.acquire().await.unwrap();

        assert_eq!(site.sessions_created(), 1);
    }

    #[tokio::test]
    async fn test_fault_destroys_and_replaces_session() {
        let site = ScriptedSite::default();
        let mut sessions = SessionManager::new(Box::new(site.clone()), None, no_delay());

        sessions.acquire().await.unwrap();
        sessions.report_fault("navigation timeout").await;
        assert_eq!(sessions.state(), SessionState::NoSession);

        sessions.acquire().await.unwrap();
        assert_eq!(sessions.state(), SessionState::Ready);
        assert_eq!(site.sessions_created(), 2);
        assert_eq!(sessions.restarts(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_runs_once_across_restarts() {
        let site = ScriptedSite::default();
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = CountingGate { runs: runs.clone() };
        let mut sessions =
            SessionManager::new(Box::new(site.clone()), Some(Box::new(gate)), no_delay());

        sessions.acquire().await.unwrap();
        assert!(sessions.bootstrap_done());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        sessions.report_fault("rate limit page").await;
        sessions.acquire().await.unwrap();

        // Replacement session, but no second prompt.
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(site.sessions_created(), 2);
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let site = ScriptedSite::default();
        let mut sessions = SessionManager::new(Box::new(site.clone()), None, no_delay());

        sessions.acquire().await.unwrap();
        assert!(sessions.created_at().is_some());

        sessions.close().await;
        assert_eq!(sessions.state(), SessionState::Closed);
        assert!(sessions.created_at().is_none());
    }
}
