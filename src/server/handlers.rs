//! Route handlers: view-model endpoints, channel passthrough, asset proxies
//! and cache invalidation.
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

use super::error::{channel_error, proxy_error, AppError};
use super::AppState;
use crate::arena::{fetch_block_cached, fetch_channel_cached};
use crate::arena::model::VariantKey;
use crate::blur;
use crate::content::{BioContent, BlogEntry, WorkSlide, CHANNEL_REVALIDATE};

const CHANNEL_CACHE_CONTROL: &str = "public, max-age=300, stale-while-revalidate=86400";
const ASSET_CACHE_CONTROL: &str = "public, max-age=60, stale-while-revalidate=86400";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub title: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
}

pub async fn site(State(state): State<AppState>) -> Json<SiteInfo> {
    Json(SiteInfo {
        title: state.config.site_title().to_string(),
        base_url: state.config.base_url(),
        blog_url: state.config.blog_url(),
    })
}

#[instrument(skip(state))]
pub async fn bio(State(state): State<AppState>) -> Result<Json<BioContent>, AppError> {
    let slug = state.config.bio_channel()?.to_string();
    let bio = state.content.bio(&slug).await.map_err(channel_error)?;
    Ok(Json(bio))
}

#[instrument(skip(state))]
pub async fn work(State(state): State<AppState>) -> Result<Json<Vec<WorkSlide>>, AppError> {
    let slug = state.config.work_channel()?.to_string();
    let slides = state.content.work_slides(&slug).await.map_err(channel_error)?;
    Ok(Json(slides))
}

#[instrument(skip(state))]
pub async fn blog(State(state): State<AppState>) -> Result<Json<Vec<BlogEntry>>, AppError> {
    let slug = state.config.blog_channel()?.to_string();
    let mut entries = state
        .content
        .blog_entries(&slug)
        .await
        .map_err(channel_error)?;
    entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub revalidate: Option<String>,
}

/// Cache window requested by the caller. Anything non-numeric falls back to
/// the default channel window.
fn revalidate_window(raw: Option<&str>) -> Duration {
    raw.and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(CHANNEL_REVALIDATE)
}

#[instrument(skip(state))]
pub async fn channel(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> Result<Response, AppError> {
    let revalidate = revalidate_window(query.revalidate.as_deref());
    let channel = fetch_channel_cached(state.arena.as_ref(), state.cache.as_ref(), &slug, revalidate)
        .await
        .map_err(channel_error)?;
    Ok((
        [(header::CACHE_CONTROL, CHANNEL_CACHE_CONTROL)],
        Json(channel),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub variant: Option<String>,
    pub blur: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurResponse {
    pub blur_data: String,
    pub width: u32,
    pub height: u32,
}

/// Pick the rendition to serve: the requested one when it has a URL, else
/// the original.
fn resolve_rendition(
    image: &crate::arena::model::Image,
    requested: VariantKey,
) -> Option<(&crate::arena::model::ImageVariant, &str)> {
    image
        .variant(requested)
        .and_then(|v| v.url_filled().map(|url| (v, url)))
        .or_else(|| {
            image
                .original
                .as_ref()
                .and_then(|v| v.url_filled().map(|url| (v, url)))
        })
}

/// Proxy one image rendition. Blocks are resolved uncached so a moved
/// upstream file never gets served from a stale URL.
#[instrument(skip(state))]
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    let block = fetch_block_cached(state.arena.as_ref(), state.cache.as_ref(), id, None)
        .await
        .map_err(proxy_error)?;
    let image = block
        .image
        .as_ref()
        .filter(|_| block.is_image())
        .ok_or_else(|| AppError::NotFound(format!("block {id} is not an image")))?;

    let requested = query
        .variant
        .as_deref()
        .and_then(VariantKey::parse)
        .unwrap_or(VariantKey::Original);
    let (variant, url) = resolve_rendition(image, requested)
        .ok_or_else(|| AppError::NotFound(format!("block {id} has no image renditions")))?;

    let asset = state.arena.asset(url).await.map_err(proxy_error)?;

    if query.blur.as_deref() == Some("1") {
        let bytes = asset.into_bytes().await.map_err(proxy_error)?;
        let blur = tokio::task::spawn_blocking(move || blur::generate_blur_data(&bytes))
            .await
            .map_err(|err| AppError::Internal(err.to_string()))?
            .map_err(|err| AppError::Internal(err.to_string()))?;
        return Ok(Json(BlurResponse {
            blur_data: blur.data_url,
            width: blur.width,
            height: blur.height,
        })
        .into_response());
    }

    let content_type = variant
        .content_type
        .clone()
        .or_else(|| asset.content_type.clone())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    let bytes = asset.into_bytes().await.map_err(proxy_error)?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, ASSET_CACHE_CONTROL)
        .body(Body::from(bytes))
        .map_err(|err| AppError::Internal(err.to_string()))
}

/// Stream an uploaded file through to the client without buffering.
#[instrument(skip(state))]
pub async fn media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let block = fetch_block_cached(state.arena.as_ref(), state.cache.as_ref(), id, None)
        .await
        .map_err(proxy_error)?;
    let url = block
        .attachment_url()
        .filter(|_| block.is_media() || block.is_attachment())
        .ok_or_else(|| AppError::NotFound(format!("block {id} has no file to proxy")))?;

    let asset = state.arena.asset(url).await.map_err(proxy_error)?;
    let content_type = block
        .attachment
        .as_ref()
        .and_then(|a| a.content_type.clone())
        .or_else(|| asset.content_type.clone())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, ASSET_CACHE_CONTROL);
    if let Some(len) = asset.content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }
    builder
        .body(Body::from_stream(asset.body))
        .map_err(|err| AppError::Internal(err.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub secret: Option<String>,
    pub tag: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub revalidated: bool,
    pub tag: String,
    pub now: i64,
}

/// Drop every cache entry carrying the requested tag. Secret-gated so only
/// the upstream webhook can purge.
#[instrument(skip(state, query))]
pub async fn invalidate(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let configured = state
        .config
        .revalidate_secret()
        .ok_or_else(|| AppError::Internal("revalidate secret is not configured".to_string()))?;
    if query.secret.as_deref() != Some(configured) {
        return Err(AppError::Unauthorized(
            "invalid revalidate secret".to_string(),
        ));
    }
    let tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("missing tag parameter".to_string()))?;

    let dropped = state.cache.invalidate_tag(tag).await;
    info!(
        %tag,
        dropped,
        profile = query.profile.as_deref().unwrap_or("default"),
        "cache invalidated"
    );
    Ok(Json(InvalidateResponse {
        revalidated: true,
        tag: tag.to_string(),
        now: Utc::now().timestamp_millis(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::model::Image;
    use serde_json::json;

    #[test]
    fn rendition_falls_back_to_original() {
        let image: Image = serde_json::from_value(json!({
            "original": { "url": "https://img/o.png" },
            "thumb": { "url": "https://img/t.png" }
        }))
        .unwrap();

        let (_, url) = resolve_rendition(&image, VariantKey::Large).unwrap();
        assert_eq!(url, "https://img/o.png");
        let (_, url) = resolve_rendition(&image, VariantKey::Display).unwrap();
        assert_eq!(url, "https://img/o.png");
        let (_, url) = resolve_rendition(&image, VariantKey::Thumb).unwrap();
        assert_eq!(url, "https://img/t.png");
    }

    #[test]
    fn rendition_requires_some_url() {
        let image: Image = serde_json::from_value(json!({
            "original": { "width": 800 }
        }))
        .unwrap();
        assert!(resolve_rendition(&image, VariantKey::Original).is_none());
    }

    #[test]
    fn revalidate_window_parses_seconds() {
        assert_eq!(revalidate_window(Some("60")), Duration::from_secs(60));
    }

    #[test]
    fn revalidate_window_rejects_garbage() {
        assert_eq!(revalidate_window(Some("soon")), CHANNEL_REVALIDATE);
        assert_eq!(revalidate_window(Some("-1")), CHANNEL_REVALIDATE);
        assert_eq!(revalidate_window(None), CHANNEL_REVALIDATE);
    }

    #[test]
    fn site_info_omits_absent_blog_url() {
        let info = SiteInfo {
            title: "Portfolio".into(),
            base_url: "https://example.com".into(),
            blog_url: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Portfolio", "baseUrl": "https://example.com"})
        );
    }

    #[test]
    fn blur_response_serializes_camel_case() {
        let body = BlurResponse {
            blur_data: "data:image/jpeg;base64,x".into(),
            width: 640,
            height: 480,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("blurData").is_some());
        assert_eq!(json["width"], 640);
    }
}
