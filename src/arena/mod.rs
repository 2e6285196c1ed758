//! Client for the content platform API.
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub mod model;

use crate::cache::{channel_tag, ContentCache};
use model::{Block, Channel};

const ARENA_API_BASE: &str = "https://api.are.na/v2/";

/// Blocks fetched per channel request. One page covers the whole channel for
/// the channel sizes this site works with.
const PER_PAGE: u32 = 200;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ArenaError {
    /// True when the upstream rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Upstream { status: 401 | 403, .. })
    }

    /// Upstream status code, when the error carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A fetched remote asset: headers up front, body as a byte stream.
pub struct Asset {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes, ArenaError>>,
}

impl Asset {
    /// Build an asset from an in-memory buffer.
    pub fn from_bytes(content_type: Option<String>, bytes: Bytes) -> Self {
        let len = bytes.len() as u64;
        Self {
            content_type,
            content_length: Some(len),
            body: futures::stream::once(async move { Ok(bytes) }).boxed(),
        }
    }

    /// Drain the body into one buffer.
    pub async fn into_bytes(self) -> Result<Bytes, ArenaError> {
        let mut buf = BytesMut::with_capacity(self.content_length.unwrap_or(0) as usize);
        let mut body = self.body;
        while let Some(chunk) = body.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// What the rest of the crate needs from the upstream platform. Tests swap in
/// recording fakes.
#[async_trait]
pub trait ArenaService: Send + Sync {
    /// Fetch a channel with its contents (single page of [`PER_PAGE`] blocks).
    async fn channel(&self, slug: &str) -> Result<Channel, ArenaError>;

    /// Fetch a single block by id.
    async fn block(&self, id: i64) -> Result<Block, ArenaError>;

    /// Fetch a raw asset (image rendition or uploaded file) by absolute url.
    async fn asset(&self, url: &str) -> Result<Asset, ArenaError>;
}

#[derive(Clone)]
pub struct ArenaClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for ArenaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ArenaClient {
    pub fn new(token: String) -> Self {
        let base_url = Url::parse(ARENA_API_BASE).expect("valid default API URL");
        Self::with_base_url(token, base_url)
    }

    pub fn with_base_url(token: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("arena-site/0.1")
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn channel_request(&self, slug: &str) -> Result<reqwest::Request, ArenaError> {
        let mut endpoint = self
            .base_url
            .join(&format!("channels/{slug}"))
            .map_err(bad_request_path)?;
        endpoint
            .query_pairs_mut()
            .append_pair("per", &PER_PAGE.to_string());
        Ok(self
            .http
            .get(endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .build()?)
    }

    pub fn block_request(&self, id: i64) -> Result<reqwest::Request, ArenaError> {
        let endpoint = self
            .base_url
            .join(&format!("blocks/{id}"))
            .map_err(bad_request_path)?;
        Ok(self
            .http
            .get(endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .build()?)
    }

    /// Execute a request against the API and decode the JSON body. Non-2xx
    /// responses are captured with their body text for diagnosis.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, ArenaError> {
        let url = request.url().clone();
        let res = self.http.execute(request).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%url, %status, "upstream API error");
            return Err(ArenaError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// A malformed slug can only come from a request path, so a join failure is a
// client error, not an upstream one.
fn bad_request_path(err: impl fmt::Display) -> ArenaError {
    ArenaError::Upstream {
        status: 400,
        body: err.to_string(),
    }
}

#[async_trait]
impl ArenaService for ArenaClient {
    async fn channel(&self, slug: &str) -> Result<Channel, ArenaError> {
        let request = self.channel_request(slug)?;
        self.execute_json(request).await
    }

    async fn block(&self, id: i64) -> Result<Block, ArenaError> {
        let request = self.block_request(id)?;
        self.execute_json(request).await
    }

    async fn asset(&self, url: &str) -> Result<Asset, ArenaError> {
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%url, %status, "asset fetch failed");
            return Err(ArenaError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = res.content_length();
        Ok(Asset {
            content_type,
            content_length,
            body: res.bytes_stream().map_err(ArenaError::from).boxed(),
        })
    }
}

/// Fetch a channel through the cache. Fresh entries are served as-is; misses
/// and stale entries go upstream and refresh the cache under the channel tag.
pub async fn fetch_channel_cached(
    arena: &dyn ArenaService,
    cache: &dyn ContentCache,
    slug: &str,
    revalidate: Duration,
) -> Result<Channel, ArenaError> {
    let key = format!("channel:{slug}");
    if let Some(value) = cache.get(&key).await {
        match serde_json::from_value::<Channel>(value) {
            Ok(channel) => return Ok(channel),
            // Treat a shape drift in the cached value as a miss.
            Err(err) => warn!(%key, %err, "discarding undecodable cache entry"),
        }
    }
    let channel = arena.channel(slug).await?;
    cache
        .put(
            &key,
            serde_json::to_value(&channel)?,
            revalidate,
            &[channel_tag(slug)],
        )
        .await;
    Ok(channel)
}

/// Fetch a block, caching it only when a revalidate window is given. Proxy
/// routes resolve blocks uncached so a moved upstream file is never served
/// from a dead URL.
pub async fn fetch_block_cached(
    arena: &dyn ArenaService,
    cache: &dyn ContentCache,
    id: i64,
    revalidate: Option<Duration>,
) -> Result<Block, ArenaError> {
    let Some(revalidate) = revalidate else {
        return arena.block(id).await;
    };
    let key = format!("block:{id}");
    if let Some(value) = cache.get(&key).await {
        match serde_json::from_value::<Block>(value) {
            Ok(block) => return Ok(block),
            Err(err) => warn!(%key, %err, "discarding undecodable cache entry"),
        }
    }
    let block = arena.block(id).await?;
    cache
        .put(&key, serde_json::to_value(&block)?, revalidate, &[])
        .await;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_request_sets_auth_and_page_size() {
        let client = ArenaClient::new("token".into());
        let request = client.channel_request("my-channel").unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/v2/channels/my-channel");
        assert_eq!(request.url().query(), Some("per=200"));
        assert_eq!(
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "Bearer token"
        );
    }

    #[test]
    fn block_request_targets_block_path() {
        let base = Url::parse("http://localhost:9999/v2/").unwrap();
        let client = ArenaClient::with_base_url("token".into(), base);
        let request = client.block_request(12345).unwrap();
        assert_eq!(request.url().path(), "/v2/blocks/12345");
        assert!(request.url().query().is_none());
    }

    #[test]
    fn unauthorized_detection() {
        let err = ArenaError::Upstream {
            status: 401,
            body: "unauthorized".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.upstream_status(), Some(401));

        let err = ArenaError::Upstream {
            status: 500,
            body: "boom".into(),
        };
        assert!(!err.is_unauthorized());
    }

    #[tokio::test]
    async fn asset_roundtrip_from_bytes() {
        let asset = Asset::from_bytes(Some("image/jpeg".into()), Bytes::from_static(b"abc"));
        assert_eq!(asset.content_length, Some(3));
        assert_eq!(asset.content_type.as_deref(), Some("image/jpeg"));
        let bytes = asset.into_bytes().await.unwrap();
        assert_eq!(&bytes[..], b"abc");
    }

    use crate::cache::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingArena {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArenaService for CountingArena {
        async fn channel(&self, slug: &str) -> Result<Channel, ArenaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Channel {
                slug: slug.to_string(),
                ..Channel::default()
            })
        }

        async fn block(&self, id: i64) -> Result<Block, ArenaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Block {
                id,
                ..Block::default()
            })
        }

        async fn asset(&self, _url: &str) -> Result<Asset, ArenaError> {
            Err(ArenaError::Upstream {
                status: 404,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn cached_channel_fetch_hits_upstream_once() {
        let arena = CountingArena::default();
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(300);

        let first = fetch_channel_cached(&arena, &cache, "work", ttl).await.unwrap();
        let second = fetch_channel_cached(&arena, &cache, "work", ttl).await.unwrap();
        assert_eq!(first.slug, "work");
        assert_eq!(second.slug, "work");
        assert_eq!(arena.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_refetch() {
        let arena = CountingArena::default();
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(300);

        fetch_channel_cached(&arena, &cache, "work", ttl).await.unwrap();
        cache.invalidate_tag(&crate::cache::channel_tag("work")).await;
        fetch_channel_cached(&arena, &cache, "work", ttl).await.unwrap();
        assert_eq!(arena.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn block_fetch_uncached_by_default() {
        let arena = CountingArena::default();
        let cache = MemoryCache::new();

        fetch_block_cached(&arena, &cache, 7, None).await.unwrap();
        fetch_block_cached(&arena, &cache, 7, None).await.unwrap();
        assert_eq!(arena.calls.load(Ordering::SeqCst), 2);

        fetch_block_cached(&arena, &cache, 7, Some(Duration::from_secs(60)))
            .await
            .unwrap();
        fetch_block_cached(&arena, &cache, 7, Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(arena.calls.load(Ordering::SeqCst), 3);
    }
}
