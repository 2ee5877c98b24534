//! HTTP response building module
//!
//! Builders for every response the gateway sends. Each falls back to a bare
//! response if `Response::builder` fails, so a response is always produced.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// JSON body returned for every script outcome
#[derive(Debug, Serialize)]
pub struct ScriptResponse<'a> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> ScriptResponse<'a> {
    pub const fn succeeded(message: &'a str, output: &'a str) -> Self {
        Self {
            success: true,
            message,
            output: Some(output),
            error: None,
        }
    }

    pub const fn failed(message: &'a str, error: &'a str) -> Self {
        Self {
            success: false,
            message,
            output: None,
            error: Some(error),
        }
    }
}

/// Build a JSON response with the CORS header browsers need to read it
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            log_build_error("JSON", &e);
            return build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Error processing request: {e}"),
            );
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build a plain-text error response carrying `message`
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build static HTML response
pub fn build_html_response(content: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from_static(content.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

fn log_build_error(what: &str, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_success_json_shape() {
        let resp = build_json_response(
            StatusCode::OK,
            &ScriptResponse::succeeded("Authentication successful", "OK"),
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            body_string(resp).await,
            r#"{"success":true,"message":"Authentication successful","output":"OK"}"#
        );
    }

    #[tokio::test]
    async fn test_failure_json_omits_output() {
        let resp = build_json_response(
            StatusCode::UNAUTHORIZED,
            &ScriptResponse::failed("Authentication failed", "bad code"),
        );
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(resp).await,
            r#"{"success":false,"message":"Authentication failed","error":"bad code"}"#
        );
    }

    #[tokio::test]
    async fn test_error_response_is_plain_text() {
        let resp = build_error_response(StatusCode::GATEWAY_TIMEOUT, "Authentication timeout");
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
        assert_eq!(body_string(resp).await, "Authentication timeout");
    }
}
