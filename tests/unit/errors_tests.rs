/*!
 * Tests for error types and their mappings
 */

use std::error::Error as _;
use notemend::errors::{CorrectionError, ProviderError};

#[test]
fn test_fromStatus_withAuthCodes_shouldMapToAuthenticationError() {
    assert!(matches!(ProviderError::from_status(401, "bad key".into()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "forbidden".into()), ProviderError::AuthenticationError(_)));
}

#[test]
fn test_fromStatus_withOtherCodes_shouldMapToRateLimitOrApiError() {
    assert!(matches!(ProviderError::from_status(429, "slow down".into()), ProviderError::RateLimitExceeded(_)));

    match ProviderError::from_status(500, "boom".into()) {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_correctionError_fromProvider_shouldKeepSegmentAndSource() {
    let error = CorrectionError::from_provider(2, ProviderError::ConnectionError("reset".into()));

    assert!(error.is_transport_failure());
    assert_eq!(error.segment(), Some(2));
    assert!(error.to_string().contains("segment 2"));
    assert!(error.source().is_some());
}

#[test]
fn test_correctionError_fromParseError_shouldBecomeMalformedResponse() {
    let error = CorrectionError::from_provider(1, ProviderError::ParseError("no choices".into()));
    assert!(matches!(error, CorrectionError::MalformedResponse { segment: 1, .. }));
    assert!(error.is_transport_failure());
}

#[test]
fn test_invalidConfig_shouldHaveNoSegment() {
    let error = CorrectionError::InvalidConfig("max_length".into());
    assert_eq!(error.segment(), None);
    assert!(!error.is_transport_failure());
}
