//! OCI Generative AI HTTP error classification.
//!
//! Error bodies are shaped like `{ "code": "NotAuthenticated", "message": "..." }`.
//! The vendor message is kept verbatim and prefixed with the error code; the
//! status decides the unified variant. Every classified error carries the
//! vendor prefix, so a rejected request is never mistaken for a local
//! validation failure.

use reqwest::header::HeaderMap;

use super::types::OciErrorBody;
use crate::error::{LlmError, VENDOR_ERROR_PREFIX};

pub const OPC_REQUEST_ID: &str = "opc-request-id";

fn extract_error(body_text: &str) -> Option<OciErrorBody> {
    serde_json::from_str::<OciErrorBody>(body_text)
        .ok()
        .filter(|body| body.code.is_some() || body.message.is_some())
}

fn describe(status: u16, body_text: &str) -> String {
    let fallback = || {
        let trimmed = body_text.trim();
        if trimmed.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            trimmed.to_string()
        }
    };

    match extract_error(body_text) {
        Some(OciErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {}", message.trim()),
        Some(OciErrorBody {
            message: Some(message),
            ..
        }) => message.trim().to_string(),
        Some(OciErrorBody {
            code: Some(code), ..
        }) => code,
        _ => fallback(),
    }
}

/// Map a non-success response to an [`LlmError`].
pub fn classify_oci_http_error(status: u16, body_text: &str, headers: &HeaderMap) -> LlmError {
    let message = describe(status, body_text);
    let request_id = headers
        .get(OPC_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match status {
        401 | 403 => LlmError::AuthenticationError(format!("{VENDOR_ERROR_PREFIX}: {message}")),
        404 => LlmError::NotFound(message),
        429 => LlmError::RateLimitError(message),
        _ => {
            let mut details = serde_json::from_str::<serde_json::Value>(body_text)
                .ok()
                .filter(serde_json::Value::is_object)
                .unwrap_or_else(|| serde_json::json!({}));
            if let (Some(id), Some(obj)) = (request_id, details.as_object_mut()) {
                obj.insert(OPC_REQUEST_ID.to_string(), serde_json::Value::String(id));
            }
            LlmError::ApiError {
                code: status,
                message,
                details: Some(details),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use reqwest::header::HeaderValue;

    fn no_headers() -> HeaderMap {
        HeaderMap::new()
    }

    #[test]
    fn auth_failures() {
        let body = r#"{"code":"NotAuthenticated","message":"The required information to complete authentication was not provided."}"#;
        let err = classify_oci_http_error(401, body, &no_headers());
        match err {
            LlmError::AuthenticationError(m) => {
                assert!(m.starts_with(VENDOR_ERROR_PREFIX), "{m}");
                assert!(m.contains("NotAuthenticated: The required information"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            classify_oci_http_error(403, "{}", &no_headers()),
            LlmError::AuthenticationError(_)
        ));
    }

    #[test]
    fn status_mapping() {
        let h = no_headers();
        assert!(matches!(
            classify_oci_http_error(404, r#"{"code":"NotAuthorizedOrNotFound","message":"x"}"#, &h),
            LlmError::NotFound(_)
        ));
        assert!(matches!(
            classify_oci_http_error(429, r#"{"code":"TooManyRequests","message":"slow down"}"#, &h),
            LlmError::RateLimitError(_)
        ));
    }

    #[test]
    fn rejected_requests_are_vendor_client_errors() {
        let mut headers = HeaderMap::new();
        headers.insert(OPC_REQUEST_ID, HeaderValue::from_static("req-400"));
        let err = classify_oci_http_error(
            400,
            r#"{"code":"InvalidParameter","message":"bad"}"#,
            &headers,
        );
        assert_eq!(err.category(), ErrorCategory::Client);
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().starts_with(VENDOR_ERROR_PREFIX));
        match err {
            LlmError::ApiError { details, .. } => {
                assert_eq!(details.unwrap()[OPC_REQUEST_ID], "req-400");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = classify_oci_http_error(413, "", &HeaderMap::new());
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(err.to_string().contains("Payload Too Large"));
    }

    #[test]
    fn server_errors_keep_status_and_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(OPC_REQUEST_ID, HeaderValue::from_static("req-1"));
        let err = classify_oci_http_error(
            503,
            r#"{"code":"ServiceUnavailable","message":"try later"}"#,
            &headers,
        );
        assert!(err.is_retryable());
        match err {
            LlmError::ApiError {
                code,
                message,
                details,
            } => {
                assert_eq!(code, 503);
                assert_eq!(message, "ServiceUnavailable: try later");
                assert_eq!(details.unwrap()[OPC_REQUEST_ID], "req-1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_bodies_fall_back_to_raw_text_or_reason() {
        match classify_oci_http_error(502, "<html>bad gateway</html>", &no_headers()) {
            LlmError::ApiError { message, .. } => assert_eq!(message, "<html>bad gateway</html>"),
            other => panic!("unexpected {other:?}"),
        }
        match classify_oci_http_error(500, "", &no_headers()) {
            LlmError::ApiError { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
