//! Service description and health probe endpoints.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::http;

#[derive(Serialize)]
struct Endpoints {
    generate: &'static str,
    download: &'static str,
}

#[derive(Serialize)]
struct ServiceInfo {
    message: &'static str,
    endpoints: Endpoints,
}

/// `GET /`: what the service does and where to call it
pub fn serve_root() -> Response<Full<Bytes>> {
    let info = ServiceInfo {
        message: "Slide deck generation service. POST slide data to /generate to build a presentation.",
        endpoints: Endpoints {
            generate: "/generate (POST)",
            download: "/download/{filename} (GET)",
        },
    };
    http::json_response(StatusCode::OK, &info)
}

/// Liveness and readiness; the service has no dependencies to wait on
pub fn serve_health() -> Response<Full<Bytes>> {
    http::build_health_response("ok")
}
