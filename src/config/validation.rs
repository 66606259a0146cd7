use crate::config::types::{
    CompanySelectors, Config, PersonSelectors, RetryConfig, SessionConfig, SiteProfile,
    ThrottleConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_paths(config)?;
    validate_throttle(&config.throttle)?;
    validate_retry(&config.retry)?;
    validate_session(&config.session)?;
    validate_site(&config.site)?;
    Ok(())
}

fn validate_paths(config: &Config) -> Result<(), ConfigError> {
    if config.queue.path.is_empty() {
        return Err(ConfigError::Validation(
            "queue.path cannot be empty".to_string(),
        ));
    }
    if config.output.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "output.records-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_throttle(config: &ThrottleConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "throttle.min-delay-ms must be >= 100ms, got {}ms",
            config.min_delay_ms
        )));
    }
    if config.max_delay_ms < config.min_delay_ms {
        return Err(ConfigError::Validation(format!(
            "throttle.max-delay-ms ({}) must be >= min-delay-ms ({})",
            config.max_delay_ms, config.min_delay_ms
        )));
    }
    Ok(())
}

fn validate_retry(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_item_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry.max-item-attempts must be >= 1, got {}",
            config.max_item_attempts
        )));
    }
    if config.max_consecutive_faults < 1 {
        return Err(ConfigError::Validation(format!(
            "retry.max-consecutive-faults must be >= 1, got {}",
            config.max_consecutive_faults
        )));
    }
    if config.restart_delay_max_ms < config.restart_delay_min_ms {
        return Err(ConfigError::Validation(format!(
            "retry.restart-delay-max-ms ({}) must be >= restart-delay-min-ms ({})",
            config.restart_delay_max_ms, config.restart_delay_min_ms
        )));
    }
    Ok(())
}

fn validate_session(config: &SessionConfig) -> Result<(), ConfigError> {
    Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("session.start-url: {}", e)))?;

    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "session.navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }
    if config.wait_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "session.wait-timeout-ms must be >= 100ms, got {}ms",
            config.wait_timeout_ms
        )));
    }
    if let Some(user_agent) = &config.user_agent {
        if user_agent.is_empty() {
            return Err(ConfigError::Validation(
                "session.user-agent cannot be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_site(site: &SiteProfile) -> Result<(), ConfigError> {
    validate_url_template("site.search-url", &site.search_url)?;

    validate_selector("site.result-wait", &site.result_wait)?;
    validate_selector("site.result-link", &site.result_link)?;
    validate_selector("site.rate-limit-marker", &site.rate_limit_marker)?;
    validate_opt_selector("site.flagged-marker", &site.flagged_marker)?;
    validate_opt_selector("site.phones-link", &site.phones_link)?;
    validate_opt_selector("site.phone-entry", &site.phone_entry)?;
    validate_opt_selector("site.board-link", &site.board_link)?;
    validate_opt_selector("site.board-row", &site.board_row)?;
    validate_opt_selector("site.aux-result", &site.aux_result)?;

    // Optional features must be configured as complete pairs.
    if site.phones_link.is_some() && site.phone_entry.is_none() {
        return Err(ConfigError::Validation(
            "site.phone-entry is required when site.phones-link is set".to_string(),
        ));
    }
    if site.board_link.is_some() && site.board_row.is_none() {
        return Err(ConfigError::Validation(
            "site.board-row is required when site.board-link is set".to_string(),
        ));
    }
    if let Some(template) = &site.aux_lookup_url {
        validate_url_template("site.aux-lookup-url", template)?;
        if site.aux_result.is_none() {
            return Err(ConfigError::Validation(
                "site.aux-result is required when site.aux-lookup-url is set".to_string(),
            ));
        }
    }

    if let Some(multiplier) = site.unit_multiplier {
        if multiplier <= 0 {
            return Err(ConfigError::Validation(format!(
                "site.unit-multiplier must be > 0, got {}",
                multiplier
            )));
        }
    }

    validate_company_selectors(&site.company)?;
    validate_person_selectors(&site.person)?;
    Ok(())
}

fn validate_company_selectors(selectors: &CompanySelectors) -> Result<(), ConfigError> {
    validate_selector("site.company.name", &selectors.name)?;
    for (field, selector) in [
        ("site.company.org-number", &selectors.org_number),
        ("site.company.legal-form", &selectors.legal_form),
        ("site.company.status", &selectors.status),
        ("site.company.registration-date", &selectors.registration_date),
        ("site.company.remark", &selectors.remark),
        ("site.company.phone", &selectors.phone),
        ("site.company.address", &selectors.address),
        ("site.company.municipality", &selectors.municipality),
        ("site.company.county", &selectors.county),
        ("site.company.f-skatt", &selectors.f_skatt),
        ("site.company.vat-registered", &selectors.vat_registered),
        ("site.company.employer", &selectors.employer),
        ("site.company.financial-period", &selectors.financial_period),
        ("site.company.revenue", &selectors.revenue),
        (
            "site.company.profit-after-financial-items",
            &selectors.profit_after_financial_items,
        ),
        ("site.company.net-profit", &selectors.net_profit),
        ("site.company.total-assets", &selectors.total_assets),
        ("site.company.sni", &selectors.sni),
        ("site.company.categories", &selectors.categories),
        ("site.company.description", &selectors.description),
    ] {
        validate_opt_selector(field, selector)?;
    }
    Ok(())
}

fn validate_person_selectors(selectors: &PersonSelectors) -> Result<(), ConfigError> {
    for (field, selector) in [
        ("site.person.name", &selectors.name),
        ("site.person.age", &selectors.age),
        ("site.person.phone", &selectors.phone),
        ("site.person.personal-number", &selectors.personal_number),
        ("site.person.address", &selectors.address),
    ] {
        validate_opt_selector(field, selector)?;
    }
    Ok(())
}

/// Checks that a URL template carries the `{id}` placeholder and parses
/// once expanded
fn validate_url_template(field: &str, template: &str) -> Result<(), ConfigError> {
    if !template.contains("{id}") {
        return Err(ConfigError::Validation(format!(
            "{} must contain the {{id}} placeholder",
            field
        )));
    }
    let expanded = template.replace("{id}", "0000000000");
    Url::parse(&expanded).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", field, e)))?;
    Ok(())
}

/// Selector typos surface here at startup instead of as permanently
/// absent fields at runtime
fn validate_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{}: selector cannot be empty",
            field
        )));
    }
    scraper::Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("{}: {:?}", field, e)))?;
    Ok(())
}

fn validate_opt_selector(field: &str, selector: &Option<String>) -> Result<(), ConfigError> {
    match selector {
        Some(selector) => validate_selector(field, selector),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::config_at;
    use std::path::Path;

    fn valid_config() -> Config {
        let mut config = config_at(Path::new("/tmp"));
        // Fixture configs use instant pacing for test speed; bring the
        // bounds into validated range here.
        config.throttle.min_delay_ms = 1000;
        config.throttle.max_delay_ms = 2500;
        config.retry.restart_delay_min_ms = 5000;
        config.retry.restart_delay_max_ms = 10000;
        config.session.navigation_timeout_ms = 10_000;
        config.session.wait_timeout_ms = 3000;
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_throttle_bounds() {
        let mut config = valid_config();
        config.throttle.min_delay_ms = 10;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        let mut config = valid_config();
        config.throttle.max_delay_ms = config.throttle.min_delay_ms - 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = valid_config();
        config.retry.max_item_attempts = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.retry.max_consecutive_faults = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_search_url_requires_placeholder() {
        let mut config = valid_config();
        config.site.search_url = "https://registry.example/search".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_start_url() {
        let mut config = valid_config();
        config.session.start_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut config = valid_config();
        config.site.company.remark = Some(":::".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_phones_link_requires_entry_selector() {
        let mut config = valid_config();
        config.site.phone_entry = None;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_aux_lookup_requires_result_selector() {
        let mut config = valid_config();
        config.site.aux_result = None;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_unit_multiplier_is_rejected() {
        let mut config = valid_config();
        config.site.unit_multiplier = Some(0);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
