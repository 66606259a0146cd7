use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub queue: QueueConfig,
    pub output: OutputConfig,
    pub throttle: ThrottleConfig,
    pub retry: RetryConfig,
    pub session: SessionConfig,
    pub site: SiteProfile,
}

/// Work queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Path to the line-oriented work queue file
    pub path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSONL record stream
    #[serde(rename = "records-path")]
    pub records_path: String,
}

/// Pacing toward the shared external target
///
/// A uniformly random pause from this range precedes every externally
/// observable action. This is a resource-sharing discipline, not a
/// performance knob, and applies on retries too.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

/// Retry and restart bounds
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Session-fatal attempts per item before it is marked failed
    #[serde(rename = "max-item-attempts")]
    pub max_item_attempts: u32,

    /// Consecutive session faults without a completed item before the run
    /// aborts
    #[serde(rename = "max-consecutive-faults")]
    pub max_consecutive_faults: u32,

    /// Jittered backoff bounds between destroying a faulted session and
    /// creating the next one
    #[serde(rename = "restart-delay-min-ms")]
    pub restart_delay_min_ms: u64,

    #[serde(rename = "restart-delay-max-ms")]
    pub restart_delay_max_ms: u64,
}

/// Session and client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Page opened for the one-time manual bootstrap step
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Whether to pause for the manual login/consent checkpoint at startup
    pub bootstrap: bool,

    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// How long to wait for an expected element before treating it as
    /// absent
    #[serde(rename = "wait-timeout-ms")]
    pub wait_timeout_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Navigation profile of the target site
///
/// All selectors are opaque strings interpreted by the page client; the
/// crate itself carries no knowledge of any specific site.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteProfile {
    /// Search URL template; `{id}` is replaced with the work item key
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Element that signals the result page has rendered
    #[serde(rename = "result-wait")]
    pub result_wait: String,

    /// Link to the candidate's detail page
    #[serde(rename = "result-link")]
    pub result_link: String,

    /// Marker on a flagged/remarked candidate; presence skips the item
    #[serde(rename = "flagged-marker")]
    pub flagged_marker: Option<String>,

    /// Marker of the "search limit reached" page; presence is
    /// session-fatal
    #[serde(rename = "rate-limit-marker")]
    pub rate_limit_marker: String,

    /// Display value marking an affirmative boolean cell (e.g. "Ja")
    pub affirmative: Option<String>,

    /// Currency code attached to financial figures
    pub currency: Option<String>,

    /// Unit suffix on financial figures (e.g. "tkr")
    #[serde(rename = "unit-suffix")]
    pub unit_suffix: Option<String>,

    /// Scale factor implied by the unit suffix (e.g. 1000)
    #[serde(rename = "unit-multiplier")]
    pub unit_multiplier: Option<i64>,

    /// Link from the detail page to the phones subpage
    #[serde(rename = "phones-link")]
    pub phones_link: Option<String>,

    /// One phone number entry on the phones subpage
    #[serde(rename = "phone-entry")]
    pub phone_entry: Option<String>,

    /// Link from the detail page to the board subpage; when absent, board
    /// rows are read off the detail page itself
    #[serde(rename = "board-link")]
    pub board_link: Option<String>,

    /// One board member row; row text is `role: display name` and the row
    /// links to the person's profile page
    #[serde(rename = "board-row")]
    pub board_row: Option<String>,

    /// Auxiliary registry lookup URL template with `{id}`
    #[serde(rename = "aux-lookup-url")]
    pub aux_lookup_url: Option<String>,

    /// Element holding the auxiliary lookup result
    #[serde(rename = "aux-result")]
    pub aux_result: Option<String>,

    pub company: CompanySelectors,

    #[serde(default)]
    pub person: PersonSelectors,
}

impl SiteProfile {
    /// Expands the search URL template for a work item
    pub fn search_url_for(&self, id: &str) -> String {
        self.search_url.replace("{id}", id)
    }

    /// Expands the auxiliary lookup URL template for a work item
    pub fn aux_lookup_url_for(&self, id: &str) -> Option<String> {
        self.aux_lookup_url
            .as_ref()
            .map(|template| template.replace("{id}", id))
    }
}

/// Field selectors for the company detail page
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySelectors {
    /// Company name; the identity gate for persisting a record
    pub name: String,

    #[serde(rename = "org-number")]
    pub org_number: Option<String>,
    #[serde(rename = "legal-form")]
    pub legal_form: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "registration-date")]
    pub registration_date: Option<String>,
    pub remark: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    #[serde(rename = "f-skatt")]
    pub f_skatt: Option<String>,
    #[serde(rename = "vat-registered")]
    pub vat_registered: Option<String>,
    pub employer: Option<String>,
    #[serde(rename = "financial-period")]
    pub financial_period: Option<String>,
    pub revenue: Option<String>,
    #[serde(rename = "profit-after-financial-items")]
    pub profit_after_financial_items: Option<String>,
    #[serde(rename = "net-profit")]
    pub net_profit: Option<String>,
    #[serde(rename = "total-assets")]
    pub total_assets: Option<String>,
    pub sni: Option<String>,
    pub categories: Option<String>,
    pub description: Option<String>,
}

/// Field selectors for a person profile page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonSelectors {
    pub name: Option<String>,
    pub age: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "personal-number")]
    pub personal_number: Option<String>,
    pub address: Option<String>,
}

impl Config {
    /// Uniform throttle bounds as durations
    pub fn throttle_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.throttle.min_delay_ms),
            Duration::from_millis(self.throttle.max_delay_ms),
        )
    }

    /// Session restart backoff bounds as durations
    pub fn restart_delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.retry.restart_delay_min_ms),
            Duration::from_millis(self.retry.restart_delay_max_ms),
        )
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.session.navigation_timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.session.wait_timeout_ms)
    }
}
