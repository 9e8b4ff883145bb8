/*!
 * Tests for error types and conversions
 */

use livestock_client::errors::{ApiError, AppError, ConfigError, TransportError};
use livestock_client::language_utils::validate_language_code;
use livestock_client::transport::HttpTransport;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_transport_error_should_format_status() {
    let error = TransportError::Status {
        status_code: 503,
        message: "maintenance".to_string(),
    };
    assert_eq!(error.to_string(), "Server responded with error: 503 - maintenance");
    assert!(!error.is_timeout());
    assert!(TransportError::Timeout(5000).is_timeout());
}

#[test]
fn test_api_error_should_be_transparent_over_transport() {
    let error: ApiError = TransportError::Connection("refused".to_string()).into();
    assert_eq!(error.to_string(), "Connection error: refused");
}

#[test]
fn test_app_error_should_wrap_every_layer() {
    let from_api: AppError = ApiError::Rejected("Unknown error".to_string()).into();
    assert!(matches!(from_api, AppError::Api(_)));
    assert_eq!(from_api.to_string(), "API error: Unknown error");

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(from_anyhow.to_string(), "Unknown error: boom");

    let from_transport: AppError = TransportError::Timeout(100).into();
    assert_eq!(from_transport.to_string(), "Transport error: Request timed out after 100 ms");
}

#[test]
fn test_http_transport_with_bad_url_should_fail_with_config_error() {
    let error = assert_err!(HttpTransport::new("localhost without scheme", 30));
    assert!(matches!(error, ConfigError::InvalidUrl { .. }));

    let transport = assert_ok!(HttpTransport::new("http://localhost:5000", 30));
    assert_eq!(transport.base_url().as_str(), "http://localhost:5000/");
}

#[test]
fn test_invalid_language_should_downcast_to_config_error() {
    let error = assert_err!(validate_language_code("klingon"));
    assert_eq!(
        error.downcast_ref::<ConfigError>(),
        Some(&ConfigError::InvalidLanguage("klingon".to_string()))
    );
}
