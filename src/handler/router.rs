//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for route matching,
//! method validation and dispatching to the endpoint handlers.

use crate::config::{AppState, HealthConfig};
use crate::handler::{download, generate, status};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

const DOWNLOAD_PREFIX: &str = "/download/";

const ALLOW_READ: &str = "GET, HEAD, OPTIONS";
const ALLOW_POST: &str = "POST, OPTIONS";

/// Request context encapsulating information needed for request processing
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Endpoints the service exposes
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Root,
    Generate,
    Download(String),
    Health,
}

impl Route {
    fn match_path(path: &str, health: &HealthConfig) -> Option<Self> {
        if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
            return Some(Self::Health);
        }
        match path {
            "/" => Some(Self::Root),
            "/generate" => Some(Self::Generate),
            _ => path
                .strip_prefix(DOWNLOAD_PREFIX)
                .map(|name| Self::Download(name.to_string())),
        }
    }

    const fn allow(&self) -> &'static str {
        match self {
            Self::Generate => ALLOW_POST,
            Self::Root | Self::Download(_) | Self::Health => ALLOW_READ,
        }
    }

    fn permits(&self, method: &Method) -> bool {
        match self {
            Self::Generate => method == Method::POST,
            Self::Root | Self::Download(_) | Self::Health => {
                method == Method::GET || method == Method::HEAD
            }
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut response = route_request(req, &state).await;
    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );
    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let Some(route) = Route::match_path(req.uri().path(), &state.config.routes.health) else {
        if req.method() == Method::OPTIONS {
            return http::build_options_response(ALLOW_READ, state.config.http.enable_cors);
        }
        return http::build_404_response();
    };

    if req.method() == Method::OPTIONS {
        return http::build_options_response(route.allow(), state.config.http.enable_cors);
    }
    if !route.permits(req.method()) {
        logger::log_warning(&format!(
            "Method not allowed: {} {}",
            req.method(),
            req.uri().path()
        ));
        return http::build_405_response(route.allow());
    }

    let ctx = RequestContext {
        is_head: req.method() == Method::HEAD,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    let result = match route {
        Route::Root => Ok(status::serve_root()),
        Route::Health => Ok(status::serve_health()),
        Route::Generate => generate::handle_generate(req, state).await,
        Route::Download(file_name) => download::handle_download(&ctx, &file_name, state).await,
    };

    result.unwrap_or_else(crate::error::ServiceError::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::deck::BODY_PLACEHOLDER_IDX;
    use crate::pptx::{Presentation, Shape};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    struct TestApp {
        state: Arc<AppState>,
        _dir: tempfile::TempDir,
    }

    fn app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.storage.output_dir = dir.path().join("output").to_string_lossy().into_owned();
        config.storage.templates_dir = dir.path().join("templates").to_string_lossy().into_owned();
        configure(&mut config);

        let state = AppState::new(&config);
        state.storage.ensure_dirs().unwrap();
        TestApp {
            state: Arc::new(state),
            _dir: dir,
        }
    }

    fn app() -> TestApp {
        app_with(|_| {})
    }

    async fn send(app: &TestApp, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(&app.state)).await.unwrap()
    }

    fn post_generate(body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/generate")
            .header("host", "slides.test")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    fn get(path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn saved_slides(app: &TestApp, file_name: &str) -> Vec<(String, String)> {
        let prs = Presentation::open(app.state.storage.output_dir().join(file_name)).unwrap();
        prs.slides()
            .iter()
            .map(|s| {
                (
                    s.title().map(Shape::text).unwrap_or_default(),
                    s.placeholder(BODY_PLACEHOLDER_IDX)
                        .map(Shape::text)
                        .unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_route_matching() {
        let health = HealthConfig::default();
        assert_eq!(Route::match_path("/", &health), Some(Route::Root));
        assert_eq!(Route::match_path("/generate", &health), Some(Route::Generate));
        assert_eq!(
            Route::match_path("/download/output.pptx", &health),
            Some(Route::Download("output.pptx".to_string()))
        );
        assert_eq!(Route::match_path("/readyz", &health), Some(Route::Health));
        assert_eq!(Route::match_path("/generate/extra", &health), None);

        let disabled = HealthConfig {
            enabled: false,
            ..HealthConfig::default()
        };
        assert_eq!(Route::match_path("/healthz", &disabled), None);
    }

    #[tokio::test]
    async fn test_generate_returns_links_and_writes_deck() {
        let app = app();
        let response = send(
            &app,
            post_generate(r#"{"slides":[{"title":"Intro","content":"Welcome"}]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Server"], "deck-server/0.1");

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "download_link": "https://slides.test/download/output.pptx",
                "preview_url": "https://view.officeapps.live.com/op/view.aspx?src=https://slides.test/download/output.pptx",
            })
        );
        assert_eq!(
            saved_slides(&app, "output.pptx"),
            [("Intro".to_string(), "Welcome".to_string())]
        );
    }

    #[tokio::test]
    async fn test_generate_defaults_and_order() {
        let app = app();
        let response = send(
            &app,
            post_generate(r#"{"slides":[{},{"title":"Second","content":"two"},{"content":"three"}]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            saved_slides(&app, "output.pptx"),
            [
                ("untitled".to_string(), "no content".to_string()),
                ("Second".to_string(), "two".to_string()),
                ("untitled".to_string(), "three".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_generation_reuses_the_same_link() {
        let app = app();
        let body = r#"{"slides":[{"title":"A"}]}"#;
        let first = body_json(send(&app, post_generate(body)).await).await;
        let second = body_json(send(&app, post_generate(body)).await).await;
        assert_eq!(first["download_link"], second["download_link"]);
    }

    #[tokio::test]
    async fn test_unique_names_give_distinct_links() {
        let app = app_with(|c| c.storage.unique_names = true);
        let body = r#"{"slides":[{"title":"A"}]}"#;
        let first = body_json(send(&app, post_generate(body)).await).await;
        let second = body_json(send(&app, post_generate(body)).await).await;
        assert_ne!(first["download_link"], second["download_link"]);
    }

    #[tokio::test]
    async fn test_generate_validation_errors() {
        let app = app();
        let cases = [
            (r#"{"slides":[]}"#, "missing slide data"),
            (r"{}", "missing slide data"),
            (
                "[1,2,3]",
                "invalid request body: request body must be a JSON object",
            ),
            (
                "not json",
                "invalid request body: request body must be a JSON object",
            ),
        ];
        for (body, detail) in cases {
            let response = send(&app, post_generate(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body_json(response).await, json!({ "detail": detail }));
        }
        assert!(!app.state.storage.output_dir().join("output.pptx").exists());
    }

    #[tokio::test]
    async fn test_generate_body_too_large() {
        let app = app_with(|c| c.http.max_body_size = 16);
        let response = send(
            &app,
            post_generate(r#"{"slides":[{"title":"far too long for the limit"}]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_generate_with_broken_template_is_server_error() {
        let app = app();
        std::fs::write(app.state.storage.template_path(), b"garbage").unwrap();

        let response = send(&app, post_generate(r#"{"slides":[{}]}"#)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("failed to generate presentation: "));
    }

    #[tokio::test]
    async fn test_download_after_generate() {
        let app = app();
        send(&app, post_generate(r#"{"slides":[{"title":"A"}]}"#)).await;

        let response = send(&app, get("/download/output.pptx")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], http::mime::PPTX);
        assert_eq!(
            response.headers()["Content-Disposition"],
            "attachment; filename=\"output.pptx\""
        );
        let etag = response.headers()["ETag"].to_str().unwrap().to_string();
        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"PK"));

        let conditional = Request::builder()
            .uri("/download/output.pptx")
            .header("if-none-match", etag)
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = send(&app, conditional).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_download_missing_or_unsafe_name() {
        let app = app();
        for path in [
            "/download/nonexistent.pptx",
            "/download/",
            "/download/../Cargo.toml",
            "/download/.hidden",
        ] {
            let response = send(&app, get(path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(
                body_json(response).await,
                json!({ "detail": "file not found" })
            );
        }
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = app();
        let body = body_json(send(&app, get("/")).await).await;
        assert_eq!(body["endpoints"]["generate"], "/generate (POST)");
        assert_eq!(body["endpoints"]["download"], "/download/{filename} (GET)");
        assert!(body["message"].is_string());

        let health = body_json(send(&app, get("/healthz")).await).await;
        assert_eq!(health, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_unknown_path_and_wrong_method() {
        let app = app();
        let response = send(&app, get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "detail": "not found" }));

        let response = send(&app, get("/generate")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], ALLOW_POST);

        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/generate")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = send(&app, options).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Allow"], ALLOW_POST);
    }
}
