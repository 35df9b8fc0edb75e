//! HTTP response building module
//!
//! Builders for the JSON and file responses the service sends. Builders never
//! panic: a failed build is logged and replaced by a bare fallback response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

const JSON: &str = "application/json";

/// Serialize `body` as a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", JSON)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Error response with a `{"detail": ...}` body
pub fn build_error_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "detail": detail }).to_string();
    Response::builder()
        .status(status)
        .header("Content-Type", JSON)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Build 404 Not Found response for unknown paths
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "not found")
}

/// Build 405 Method Not Allowed response listing the allowed methods
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut response = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    if let Ok(value) = HeaderValue::from_str(allow) {
        response.headers_mut().insert("Allow", value);
    }
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(allow: &str, enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", allow)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "status": status }))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a file download response with an attachment file name
pub fn build_attachment_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    file_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        )
        .header("ETag", etag)
        .header("Cache-Control", "no-cache")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Headers every response carries: `Server`, plus the CORS origin when enabled
pub fn apply_common_headers(
    response: &mut Response<Full<Bytes>>,
    server_name: &str,
    enable_cors: bool,
) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    if enable_cors {
        headers.insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = build_error_response(StatusCode::BAD_REQUEST, "missing slide data");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["Content-Type"], JSON);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "detail": "missing slide data" })
        );
    }

    #[test]
    fn test_405_has_allow_header() {
        let response = build_405_response("POST, OPTIONS");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], "POST, OPTIONS");
    }

    #[test]
    fn test_options_cors_headers() {
        let plain = build_options_response("GET, OPTIONS", false);
        assert_eq!(plain.status(), StatusCode::NO_CONTENT);
        assert!(plain.headers().get("Access-Control-Allow-Methods").is_none());

        let cors = build_options_response("GET, OPTIONS", true);
        assert_eq!(cors.headers()["Access-Control-Allow-Methods"], "GET, OPTIONS");
    }

    #[test]
    fn test_attachment_head_has_no_body() {
        let response = build_attachment_response(
            Bytes::from_static(b"PK\x03\x04"),
            "application/zip",
            "\"4-1\"",
            "deck.pptx",
            true,
        );
        assert_eq!(response.headers()["Content-Length"], "4");
        assert_eq!(
            response.headers()["Content-Disposition"],
            "attachment; filename=\"deck.pptx\""
        );
        assert!(hyper::body::Body::is_end_stream(response.body()));
    }

    #[test]
    fn test_common_headers() {
        let mut response = build_404_response();
        apply_common_headers(&mut response, "deck-server/0.1", true);
        assert_eq!(response.headers()["Server"], "deck-server/0.1");
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
    }
}
