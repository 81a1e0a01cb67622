use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RendererConfig, ServerConfig, TrackerConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer, &config.crawler)?;
    validate_tracker_config(&config.trackers)?;
    validate_server_config(&config.server)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.render_timeout_ms < 1_000 || config.render_timeout_ms > 300_000 {
        return Err(ConfigError::Validation(format!(
            "render_timeout_ms must be between 1000 and 300000, got {}ms",
            config.render_timeout_ms
        )));
    }

    if config.max_concurrent_sessions < 1 || config.max_concurrent_sessions > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_sessions must be between 1 and 64, got {}",
            config.max_concurrent_sessions
        )));
    }

    Ok(())
}

/// Validates renderer configuration against the crawl timeout
fn validate_renderer_config(
    config: &RendererConfig,
    crawler: &CrawlerConfig,
) -> Result<(), ConfigError> {
    if config.idle_window_ms >= crawler.render_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "idle_window_ms ({}ms) must be shorter than render_timeout_ms ({}ms)",
            config.idle_window_ms, crawler.render_timeout_ms
        )));
    }

    if let Some(path) = &config.chrome_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates tracker patterns
fn validate_tracker_config(config: &TrackerConfig) -> Result<(), ConfigError> {
    if let Some(pos) = config.patterns.iter().position(|p| p.is_empty()) {
        return Err(ConfigError::Validation(format!(
            "tracker pattern #{} is empty; an empty pattern would match every request",
            pos + 1
        )));
    }
    Ok(())
}

/// Validates the API bind address
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid server bind '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
