//! Response cache middleware for the global feed route.
//!
//! Serves a fresh snapshot when one exists; otherwise runs the handler and
//! captures a successful response body into the cache.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::application::pagination::PageNumber;

use super::{keys::FeedKey, store::FeedCache};

const CACHEABLE_BODY_LIMIT: usize = 1024 * 1024;

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub store: Arc<FeedCache>,
}

/// Middleware caching GET requests for the global feed.
///
/// The cache key is the stable global key unless `key_by_page` is
/// configured, in which case the page number from the query string joins
/// the key. Only 200 responses are stored.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn feed_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.store.config().enabled {
        return next.run(request).await;
    }

    if request.method() != Method::GET || request.uri().path() != "/" {
        return next.run(request).await;
    }

    let page = PageNumber::parse(page_query(request.uri().query()));
    let key = FeedKey::for_page(cache.store.config().key_by_page, page.get());

    if let Some(cached) = cache.store.get(&key) {
        debug!(outcome = "hit", "serving cached feed response");
        return build_response(cached.body.clone(), &cached.content_type);
    }

    debug!(outcome = "miss", "cache miss, executing handler");

    let response = next.run(request).await;

    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, CACHEABLE_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    cache.store.set(key, bytes.clone(), content_type);

    Response::from_parts(parts, Body::from(bytes))
}

fn page_query(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
}

fn build_response(body: bytes::Bytes, content_type: &str) -> Response {
    let mut response = Response::new(Body::from(body));
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
