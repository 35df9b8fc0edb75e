//! `GET|HEAD /download/{filename}`: serve a generated deck.

use std::io::ErrorKind;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::AppState;
use crate::error::ServiceError;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;

pub async fn handle_download(
    ctx: &RequestContext,
    file_name: &str,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ServiceError> {
    let Some(path) = state.storage.resolve(file_name) else {
        logger::log_download_rejected(file_name);
        return Err(ServiceError::NotFound);
    };

    let data = match fs::read(&path).await {
        Ok(data) => data,
        // a missing file is the common case and not worth logging
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ServiceError::NotFound),
        Err(e) => {
            logger::log_error(&format!("Failed to read '{}': {e}", path.display()));
            return Err(ServiceError::NotFound);
        }
    };

    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return Ok(http::build_304_response(&etag));
    }

    Ok(http::build_attachment_response(
        Bytes::from(data),
        mime::content_type_for(&path),
        &etag,
        file_name,
        ctx.is_head,
    ))
}
