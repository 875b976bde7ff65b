//! Tests for the error system.

use docent::error::unified::*;
use docent::error::*;

#[test]
fn error_api_creation() {
    let err = DocentError::api(400, "bad image");
    assert!(matches!(&err, DocentError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "API error (status 400): bad image");
}

#[test]
fn error_category_mappings_are_stable() {
    struct Case {
        error: DocentError,
        expected_category: ErrorCategory,
        expected_recoverable: bool,
    }

    let network_error = reqwest::Client::new()
        .get("http://[::1")
        .build()
        .unwrap_err();
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    let serde_error = serde_json::from_str::<serde_json::Value>("{not-json}").unwrap_err();

    let cases = vec![
        Case {
            error: DocentError::Validation("no region".to_string()),
            expected_category: ErrorCategory::Validation,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::Configuration("empty url".to_string()),
            expected_category: ErrorCategory::Configuration,
            expected_recoverable: false,
        },
        Case {
            error: DocentError::Network(network_error),
            expected_category: ErrorCategory::Transport,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::Stream("reset".to_string()),
            expected_category: ErrorCategory::Transport,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::api(503, "unavailable"),
            expected_category: ErrorCategory::Transport,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::api(400, "bad image"),
            expected_category: ErrorCategory::Transport,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::api(403, "Update stream handshake failed with status 403"),
            expected_category: ErrorCategory::Transport,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::Serialization(serde_error),
            expected_category: ErrorCategory::Protocol,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::Decode(DecodeError::MissingType),
            expected_category: ErrorCategory::Protocol,
            expected_recoverable: true,
        },
        Case {
            error: DocentError::Io(io_error),
            expected_category: ErrorCategory::Storage,
            expected_recoverable: false,
        },
        Case {
            error: DocentError::NotFound("upload 1".to_string()),
            expected_category: ErrorCategory::Storage,
            expected_recoverable: false,
        },
        Case {
            error: DocentError::InvalidState("duplicate".to_string()),
            expected_category: ErrorCategory::Application,
            expected_recoverable: false,
        },
    ];

    for case in cases {
        assert_eq!(case.error.category(), case.expected_category, "{}", case.error);
        assert_eq!(case.error.is_recoverable(), case.expected_recoverable, "{}", case.error);
    }
}

#[test]
fn decode_errors_convert_and_display() {
    let err: DocentError = DecodeError::UnknownType("heartbeat".into()).into();
    assert!(err.to_string().contains("heartbeat"));
}
