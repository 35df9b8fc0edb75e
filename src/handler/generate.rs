//! `POST /generate`: build a deck from JSON slide data and return its links.

use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::HOST;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::config::{AppState, Config};
use crate::deck::{self, GenerationRequest};
use crate::error::ServiceError;
use crate::http;
use crate::logger;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize)]
struct GenerateResponse {
    success: bool,
    download_link: String,
    preview_url: String,
}

pub async fn handle_generate<B>(
    req: Request<B>,
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>, ServiceError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let max_body_size = state.config.http.max_body_size;
    check_content_length(&req, max_body_size)?;
    let host = public_host(&req, &state.config);

    let body = read_body(req.into_body(), max_body_size).await?;
    let request = GenerationRequest::from_body(&body, &state.config.generation)?;

    let app = Arc::clone(state);
    let file_name =
        tokio::task::spawn_blocking(move || deck::generate(&app.storage, &request.slides))
            .await?
            .inspect_err(|e| logger::log_generation_failed(&e.to_string()))?;

    let generation = &state.config.generation;
    let download_link = format!(
        "{}://{host}/download/{file_name}",
        generation.public_scheme
    );
    let preview_url = format!("{}{download_link}", generation.preview_base_url);

    Ok(http::json_response(
        StatusCode::OK,
        &GenerateResponse {
            success: true,
            download_link,
            preview_url,
        },
    ))
}

/// Reject early when the declared length is already over the limit
fn check_content_length<B>(req: &Request<B>, max_body_size: u64) -> Result<(), ServiceError> {
    let Some(value) = req.headers().get("content-length") else {
        return Ok(());
    };
    match value.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ServiceError::PayloadTooLarge { max: max_body_size })
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            Ok(())
        }
    }
}

async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, ServiceError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            Err(ServiceError::PayloadTooLarge { max: max_body_size })
        }
        Err(e) => Err(ServiceError::InvalidRequest(format!(
            "failed to read request body: {e}"
        ))),
    }
}

/// Host used in returned links: the `Host` header, then the request
/// authority, then the configured listen address
fn public_host<B>(req: &Request<B>, config: &Config) -> String {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(ToString::to_string)
        .or_else(|| req.uri().authority().map(ToString::to_string))
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port))
}
