/*!
 * Tests for configuration loading, saving and validation
 */

use anyhow::Result;
use livestock_client::app_config::{Config, LogLevel};
use std::time::Duration;

use crate::common;

#[test]
fn test_load_or_default_with_missing_file_should_write_defaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_default(&path)?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    let reloaded = Config::load_or_default(&path)?;
    assert_eq!(reloaded, config);
    Ok(())
}

#[test]
fn test_load_or_default_with_partial_file_should_keep_other_defaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"base_url": "http://farm.local:8080", "monitor": {"check_interval_ms": 10000}, "log_level": "debug"}"#,
    )?;

    let config = Config::load_or_default(&path)?;

    assert_eq!(config.base_url, "http://farm.local:8080");
    assert_eq!(config.monitor.check_interval(), Duration::from_secs(10));
    assert_eq!(config.monitor.offline_timeout(), Duration::from_secs(5));
    assert_eq!(config.monitor.slow_threshold(), Duration::from_secs(3));
    assert_eq!(config.translator.default_language, "en");
    assert_eq!(config.alerts.refresh_interval_secs, 30 * 60);
    assert_eq!(config.log_level, LogLevel::Debug);
    config.validate()?;
    Ok(())
}

#[test]
fn test_load_or_default_with_malformed_file_should_fail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let err = Config::load_or_default(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_save_should_round_trip_custom_values() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("custom.json");

    let mut config = Config::default();
    config.translator.batch_size = 5;
    config.translator.default_language = "hi".to_string();
    config.monitor.ping_url = "/health".to_string();
    config.save(&path)?;

    assert_eq!(Config::load_or_default(&path)?, config);
    Ok(())
}

#[test]
fn test_validate_should_reject_inconsistent_values() {
    let mut config = Config::default();
    config.base_url = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.monitor.check_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.monitor.ping_url = "ping".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translator.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translator.default_language = "xx1".to_string();
    assert!(config.validate().is_err());

    assert!(Config::default().validate().is_ok());
}
