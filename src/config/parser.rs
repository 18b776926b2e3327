use crate::config::types::{CrawlConfig, FileConfig};
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a tuning file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully parsed settings
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> ConfigResult<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&content)?;
    Ok(file)
}

/// Builds and validates a crawl configuration
///
/// Settings come from `path` when given, otherwise from defaults.
///
/// # Example
///
/// ```no_run
/// use sitesnap::config::load_config;
///
/// let config = load_config("https://example.com/docs", None).unwrap();
/// assert_eq!(config.crawler.max_concurrent_pages_open, 5);
/// ```
pub fn load_config(root_url: &str, path: Option<&Path>) -> ConfigResult<CrawlConfig> {
    let file = match path {
        Some(p) => load_file_config(p)?,
        None => FileConfig::default(),
    };

    let config = CrawlConfig::from_file(root_url, file);
    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = create_temp_config(
            r#"
[crawler]
max-concurrent-pages-open = 8
max-retries = 3
primary-timeout-ms = 1000
fallback-timeout-ms = 2000
pre-navigation-delay-ms = [0, 10]
settle-delay-ms = 0
ignore-extensions = [".png"]

[detection]
signatures = ["blocked"]
min-content-length = 5

[output]
output-dir = "/tmp/snaps"
"#,
        );

        let config = load_config("https://example.com/", Some(file.path())).unwrap();

        assert_eq!(config.crawler.max_concurrent_pages_open, 8);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.crawler.pre_navigation_delay_ms, [0, 10]);
        assert_eq!(config.crawler.ignore_extensions, vec![".png".to_string()]);
        assert_eq!(config.detection.signatures, vec!["blocked".to_string()]);
        assert_eq!(config.detection.min_content_length, 5);
        assert_eq!(config.output.output_dir.to_str(), Some("/tmp/snaps"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = create_temp_config("[crawler]\nmax-retries = 1\n");
        let config = load_config("https://example.com/", Some(file.path())).unwrap();

        assert_eq!(config.crawler.max_retries, 1);
        assert_eq!(config.crawler.max_concurrent_pages_open, 5);
        assert_eq!(config.crawler.primary_timeout_ms, 60_000);
        assert!(config.crawler.ignore_extensions.contains(&".zip".to_string()));
        assert_eq!(config.detection.min_content_length, 100);
    }

    #[test]
    fn test_no_file_uses_defaults() {
        let config = load_config("https://example.com/", None).unwrap();
        assert_eq!(config.root_url, "https://example.com/");
        assert!(!config.dry_run);
        assert_eq!(config.crawler.fallback_timeout_ms, 90_000);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(
            "https://example.com/",
            Some(Path::new("/nonexistent/sitesnap.toml")),
        );
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config("https://example.com/", Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nmax-concurrent-pages-open = 0\n");
        let result = load_config("https://example.com/", Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_config_rejects_huge_settle() {
        let file = create_temp_config("[crawler]\nsettle-delay-ms = 9223372036854775807\n");
        let result = load_config("https://example.com/", Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_root_url() {
        let result = load_config("not a url", None);
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }
}
