use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, RedirectConfig, SuggestConfig, ValidatorConfig,
};
use crate::ConfigError;

/// Upper bound on simultaneously in-flight link checks
pub const MAX_VALIDATOR_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_validator_config(&config.validator)?;
    validate_redirect_config(&config.redirects)?;
    validate_suggest_config(&config.suggest)?;
    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "max-body-bytes must be at least 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max-pages must be at least 1".to_string(),
        ));
    }

    if let Some(attempts) = config.max_attempts {
        if attempts < config.max_pages {
            return Err(ConfigError::Validation(format!(
                "max-attempts ({}) cannot be lower than max-pages ({})",
                attempts, config.max_pages
            )));
        }
    }

    Ok(())
}

fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > MAX_VALIDATOR_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and {}, got {}",
            MAX_VALIDATOR_CONCURRENCY, config.max_concurrent
        )));
    }

    Ok(())
}

fn validate_redirect_config(config: &RedirectConfig) -> Result<(), ConfigError> {
    if config.max_hops == 0 {
        return Err(ConfigError::Validation(
            "max-hops must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_suggest_config(config: &SuggestConfig) -> Result<(), ConfigError> {
    if config.max_links == 0 {
        return Err(ConfigError::Validation(
            "max-links must be at least 1".to_string(),
        ));
    }

    Ok(())
}
