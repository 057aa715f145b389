use crate::config::types::{Config, ControlConfig, CrawlerConfig, StorageConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_control_config(&config.control)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_sites < 1 {
        return Err(ConfigError::Validation(format!(
            "max_sites must be >= 1, got {}",
            config.max_sites
        )));
    }

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.snippet_length < 1 {
        return Err(ConfigError::Validation(format!(
            "snippet_length must be >= 1, got {}",
            config.snippet_length
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates the control listener address
fn validate_control_config(config: &ControlConfig) -> Result<(), ConfigError> {
    config
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidAddress(format!("'{}': {}", config.bind, e)))?;
    Ok(())
}
