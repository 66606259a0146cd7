//! Fixture configurations shared by the unit and integration test suites
//!
//! The selectors here are arbitrary: the scripted page client matches them
//! as opaque strings, exactly like a real client would against real pages.

use crate::config::{
    CompanySelectors, Config, OutputConfig, PersonSelectors, QueueConfig, RetryConfig,
    SessionConfig, SiteProfile, ThrottleConfig,
};
use std::path::Path;

/// A complete site profile pointing at the fictional `reg.test` registry
pub fn site_profile() -> SiteProfile {
    SiteProfile {
        search_url: "https://reg.test/search?q={id}".to_string(),
        result_wait: "#result-list".to_string(),
        result_link: "#result-list a".to_string(),
        flagged_marker: Some(".flagged".to_string()),
        rate_limit_marker: ".rate-limit-banner".to_string(),
        affirmative: Some("Ja".to_string()),
        currency: Some("SEK".to_string()),
        unit_suffix: Some("tkr".to_string()),
        unit_multiplier: Some(1000),
        phones_link: Some("a.phones".to_string()),
        phone_entry: Some(".phone-entry".to_string()),
        board_link: None,
        board_row: Some("tr.board-row".to_string()),
        aux_lookup_url: Some("https://aux.test/lookup?q={id}".to_string()),
        aux_result: Some(".bankgiro-value".to_string()),
        company: company_selectors(),
        person: person_selectors(),
    }
}

fn company_selectors() -> CompanySelectors {
    CompanySelectors {
        name: "h1 .name".to_string(),
        org_number: Some(".org-number".to_string()),
        legal_form: Some(".legal-form td".to_string()),
        status: Some(".status td".to_string()),
        registration_date: Some(".registered td".to_string()),
        remark: Some(".remark".to_string()),
        phone: Some("a.tel".to_string()),
        address: Some(".address".to_string()),
        municipality: Some(".municipality td".to_string()),
        county: Some(".county td".to_string()),
        f_skatt: Some(".f-skatt td".to_string()),
        vat_registered: Some(".vat td".to_string()),
        employer: Some(".employer td".to_string()),
        financial_period: Some(".period h3".to_string()),
        revenue: Some(".revenue span".to_string()),
        profit_after_financial_items: Some(".profit-fin span".to_string()),
        net_profit: Some(".net-profit span".to_string()),
        total_assets: Some(".assets span".to_string()),
        sni: Some(".sni".to_string()),
        categories: Some(".categories a".to_string()),
        description: Some(".description".to_string()),
    }
}

fn person_selectors() -> PersonSelectors {
    PersonSelectors {
        name: Some("h1 .name".to_string()),
        age: Some(".age span".to_string()),
        phone: Some("a.tel".to_string()),
        personal_number: Some(".pnr".to_string()),
        address: Some(".person-address".to_string()),
    }
}

/// A full configuration rooted in the given directory, with instant
/// pacing so tests run fast
pub fn config_at(dir: &Path) -> Config {
    Config {
        queue: QueueConfig {
            path: dir.join("queue.txt").to_string_lossy().into_owned(),
        },
        output: OutputConfig {
            records_path: dir.join("records.jsonl").to_string_lossy().into_owned(),
        },
        throttle: ThrottleConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
        },
        retry: RetryConfig {
            max_item_attempts: 3,
            max_consecutive_faults: 10,
            restart_delay_min_ms: 0,
            restart_delay_max_ms: 0,
        },
        session: SessionConfig {
            start_url: "https://reg.test/".to_string(),
            bootstrap: false,
            navigation_timeout_ms: 1000,
            wait_timeout_ms: 10,
            user_agent: None,
        },
        site: site_profile(),
    }
}
