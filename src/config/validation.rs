use crate::config::types::{CrawlConfig, CrawlerSettings, DetectionSettings, OutputSettings};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Longest accepted navigation timeout
const MAX_TIMEOUT_MS: u64 = 600_000;

/// Longest accepted settle or pre-navigation wait
const MAX_WAIT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> ConfigResult<()> {
    validate_root_url(&config.root_url)?;
    validate_crawler_settings(&config.crawler)?;
    validate_detection_settings(&config.detection)?;
    validate_output_settings(&config.output)?;
    Ok(())
}

/// Validates the root URL: must parse, use HTTP(S) and carry a host
fn validate_root_url(root_url: &str) -> ConfigResult<()> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' must use HTTP or HTTPS",
            root_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' has no host",
            root_url
        )));
    }

    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(settings: &CrawlerSettings) -> ConfigResult<()> {
    if settings.max_concurrent_pages_open < 1 || settings.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages_open must be between 1 and 100, got {}",
            settings.max_concurrent_pages_open
        )));
    }

    if settings.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            settings.max_retries
        )));
    }

    if settings.primary_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "primary_timeout_ms must be > 0".to_string(),
        ));
    }

    if settings.fallback_timeout_ms < settings.primary_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "fallback_timeout_ms ({}) must be >= primary_timeout_ms ({})",
            settings.fallback_timeout_ms, settings.primary_timeout_ms
        )));
    }

    if settings.fallback_timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "fallback_timeout_ms must be <= {}, got {}",
            MAX_TIMEOUT_MS, settings.fallback_timeout_ms
        )));
    }

    let [min_delay, max_delay] = settings.pre_navigation_delay_ms;
    if min_delay > max_delay {
        return Err(ConfigError::Validation(format!(
            "pre_navigation_delay_ms range is inverted: [{}, {}]",
            min_delay, max_delay
        )));
    }

    if max_delay > MAX_WAIT_MS {
        return Err(ConfigError::Validation(format!(
            "pre_navigation_delay_ms must stay <= {}, got {}",
            MAX_WAIT_MS, max_delay
        )));
    }

    if settings.settle_delay_ms > MAX_WAIT_MS {
        return Err(ConfigError::Validation(format!(
            "settle_delay_ms must be <= {}, got {}",
            MAX_WAIT_MS, settings.settle_delay_ms
        )));
    }

    for ext in &settings.ignore_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "ignore_extensions entries must look like '.ext', got '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates detection settings
fn validate_detection_settings(settings: &DetectionSettings) -> ConfigResult<()> {
    if settings.signatures.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "detection signatures cannot be empty strings".to_string(),
        ));
    }
    Ok(())
}

/// Validates output settings
fn validate_output_settings(settings: &OutputSettings) -> ConfigResult<()> {
    if settings.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}
