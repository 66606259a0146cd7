use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads, parses and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the
///   configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r##"
[queue]
path = "./org_numbers.txt"

[output]
records-path = "./records.jsonl"

[throttle]
min-delay-ms = 1000
max-delay-ms = 2500

[retry]
max-item-attempts = 3
max-consecutive-faults = 10
restart-delay-min-ms = 5000
restart-delay-max-ms = 10000

[session]
start-url = "https://registry.example/"
bootstrap = true
navigation-timeout-ms = 10000
wait-timeout-ms = 3000

[site]
search-url = "https://registry.example/search?q={id}"
result-wait = "#result-list"
result-link = "#result-list a"
flagged-marker = ".flagged"
rate-limit-marker = ".rate-limit-banner"
affirmative = "Ja"
currency = "SEK"
unit-suffix = "tkr"
unit-multiplier = 1000

[site.company]
name = "h1 .name"
legal-form = ".legal-form td"
revenue = ".revenue span"

[site.person]
name = "h1 .name"
age = ".age span"
"##;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.queue.path, "./org_numbers.txt");
        assert_eq!(config.throttle.min_delay_ms, 1000);
        assert_eq!(config.retry.max_item_attempts, 3);
        assert_eq!(config.site.company.name, "h1 .name");
        assert_eq!(config.site.unit_multiplier, Some(1000));
        assert_eq!(
            config.site.search_url_for("556631-3788"),
            "https://registry.example/search?q=556631-3788"
        );
        assert!(config.session.bootstrap);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        // search-url lacks the {id} placeholder
        let broken = VALID_CONFIG.replace(
            "search-url = \"https://registry.example/search?q={id}\"",
            "search-url = \"https://registry.example/search\"",
        );
        let file = create_temp_config(&broken);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_config_with_bad_selector() {
        let broken = VALID_CONFIG.replace("name = \"h1 .name\"", "name = \":::\"");
        let file = create_temp_config(&broken);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidSelector(_))));
    }
}
