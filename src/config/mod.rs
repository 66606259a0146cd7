//! Configuration loading and validation
//!
//! All tunables live in one TOML file: queue and output paths, throttle
//! and retry bounds, session behavior and the site navigation profile.
//! Selector strings are validated at load time so typos fail at startup.

mod parser;
mod types;
mod validation;

#[doc(hidden)]
pub mod test_support;

pub use parser::load_config;
pub use types::{
    CompanySelectors, Config, OutputConfig, PersonSelectors, QueueConfig, RetryConfig,
    SessionConfig, SiteProfile, ThrottleConfig,
};
pub use validation::validate;
