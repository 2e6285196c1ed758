//! Adapter from raw channel blocks to presentation-ready view models.
//!
//! Three derived views exist: bio sections, portfolio slides and blog entries.
//! Each is a pure function of one channel, except for blur placeholders which
//! fetch the smallest image rendition per block. Blocks that fail their class
//! checks are dropped from every view; each drop or placeholder failure is
//! logged, never fatal.
use chrono::{DateTime, Utc};
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::arena::model::{Block, Channel, Image, ImageVariant, VariantKey};
use crate::arena::{fetch_channel_cached, ArenaError, ArenaService};
use crate::blur;
use crate::cache::ContentCache;

/// How long derived channels stay fresh.
pub const CHANNEL_REVALIDATE: Duration = Duration::from_secs(300);

const SLIDE_FALLBACK_WIDTH: u32 = 1600;
const SLIDE_FALLBACK_HEIGHT: u32 = 900;
const LINK_PREVIEW_FALLBACK_WIDTH: u32 = 1200;
const LINK_PREVIEW_FALLBACK_HEIGHT: u32 = 630;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link pattern"));
static MULTI_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("break pattern"));
static ANCHOR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<a(\s[^>]*)?>").expect("anchor pattern"));
static HAS_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btarget\s*=").expect("target pattern"));
static HAS_REL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\brel\s*=").expect("rel pattern"));

// Interim marker for paragraph breaks; cannot occur in upstream text.
const DOUBLE_BREAK: &str = "\u{0}";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Turn `[text](url)` into anchors that open in a new tab.
fn parse_markdown_links(text: &str) -> String {
    MARKDOWN_LINK
        .replace_all(
            text,
            "<a href=\"$2\" target=\"_blank\" rel=\"noopener noreferrer\">$1</a>",
        )
        .into_owned()
}

/// Add `target="_blank"` and `rel="noopener noreferrer"` to every anchor that
/// does not already carry the attribute. Applying this twice changes nothing.
fn rewrite_anchors(html: &str) -> String {
    ANCHOR_TAG
        .replace_all(html, |caps: &regex::Captures| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let mut inject = String::new();
            if !HAS_TARGET.is_match(attrs) {
                inject.push_str(" target=\"_blank\"");
            }
            if !HAS_REL.is_match(attrs) {
                inject.push_str(" rel=\"noopener noreferrer\"");
            }
            format!("<a{inject}{attrs}>")
        })
        .into_owned()
}

/// Derive the HTML body of a block.
///
/// Text blocks prefer the raw `content` field so the author's exact line
/// spacing survives: markdown links become anchors, blank-line runs become a
/// paragraph break, single newlines become `<br />`. Every other class falls
/// back to upstream HTML with anchors rewritten.
pub fn block_html(block: &Block) -> String {
    if block.is_text() {
        if let Some(content) = block.content.as_deref().filter(|c| !c.is_empty()) {
            let normalized = content.replace("\r\n", "\n");
            let with_links = parse_markdown_links(&normalized);
            let with_links = MULTI_BREAK.replace_all(&with_links, DOUBLE_BREAK);
            let with_links = with_links.replace('\n', "<br />");
            return with_links.replace(DOUBLE_BREAK, "<br /><br />");
        }
        if let Some(html) = block.content_html.as_deref().filter(|h| !h.is_empty()) {
            return rewrite_anchors(html);
        }
        return String::new();
    }

    if block.is_media() {
        let html = block
            .embed
            .as_ref()
            .and_then(|e| e.html.as_deref())
            .or(block.description_html.as_deref())
            .unwrap_or("");
        return rewrite_anchors(html);
    }

    if block.is_attachment() || block.is_image() {
        let html = block.description_html.as_deref().unwrap_or("");
        return rewrite_anchors(html);
    }

    if block.is_link() {
        let html = match block.description_html.as_deref() {
            Some(html) => html.to_string(),
            None => block
                .metadata_str("description")
                .map(escape_html)
                .unwrap_or_default(),
        };
        return rewrite_anchors(&html);
    }

    String::new()
}

/// A proxied or upstream image rendition with display dimensions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageResource {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// A blurred data-URI stand-in, dimensions are those of the source image.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// Per-rendition srcs of a portfolio image, all routed through the proxy.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlideVariants {
    pub original: ImageResource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<ImageResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<ImageResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<ImageResource>,
}

/// One slide of the portfolio carousel.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkSlide {
    #[serde(rename_all = "camelCase")]
    Image {
        id: i64,
        alt: String,
        src: String,
        width: u32,
        height: u32,
        variants: SlideVariants,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<Placeholder>,
        caption_html: String,
        date: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Media {
        id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        embed_html: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachment_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachment_content_type: Option<String>,
        caption_html: String,
        title: String,
        date: Option<DateTime<Utc>>,
    },
}

/// Fields shared by every blog entry kind.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlogBase {
    pub id: i64,
    pub slug: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

/// Link-card metadata for blog link entries.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlogEntry {
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(flatten)]
        base: BlogBase,
        html: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(flatten)]
        base: BlogBase,
        image: ImageResource,
        alt: String,
        caption_html: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<Placeholder>,
    },
    #[serde(rename_all = "camelCase")]
    Media {
        #[serde(flatten)]
        base: BlogBase,
        #[serde(skip_serializing_if = "Option::is_none")]
        embed_html: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachment_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachment_content_type: Option<String>,
        caption_html: String,
    },
    #[serde(rename_all = "camelCase")]
    Link {
        #[serde(flatten)]
        base: BlogBase,
        url: String,
        caption_html: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        preview_image: Option<ImageResource>,
        metadata: LinkMetadata,
    },
}

impl BlogEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text { base, .. }
            | Self::Image { base, .. }
            | Self::Media { base, .. }
            | Self::Link { base, .. } => base.created_at,
        }
    }
}

/// The seven bio sections, each an HTML fragment (empty when the channel has
/// no matching block).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BioContent {
    pub bio_html: String,
    pub details_html: String,
    pub clients_html: String,
    pub websites_html: String,
    pub links_html: String,
    pub socials_html: String,
    pub collaborators_html: String,
}

fn image_proxy_src(id: i64, variant: VariantKey) -> String {
    format!("/api/content/image/{id}?variant={}", variant.as_str())
}

fn media_proxy_src(id: i64) -> String {
    format!("/api/content/media/{id}")
}

fn image_alt(block: &Block) -> String {
    block.display_title().unwrap_or("Work image").to_string()
}

fn slide_variant(
    block_id: i64,
    image: &Image,
    key: VariantKey,
    fallback_width: u32,
    fallback_height: u32,
) -> Option<ImageResource> {
    let target = image.variant(key)?;
    target.url_filled()?;
    Some(ImageResource {
        src: image_proxy_src(block_id, key),
        width: target.width.unwrap_or(fallback_width),
        height: target.height.unwrap_or(fallback_height),
    })
}

/// Best variant key to serve a blog image at: display, then large, then the
/// original.
fn blog_variant_key(image: &Image) -> VariantKey {
    if image.display.as_ref().and_then(ImageVariant::url_filled).is_some() {
        VariantKey::Display
    } else if image.large.as_ref().and_then(ImageVariant::url_filled).is_some() {
        VariantKey::Large
    } else {
        VariantKey::Original
    }
}

fn link_preview_image(block: &Block) -> Option<ImageResource> {
    let image = block.image.as_ref()?;
    let candidate = image
        .display
        .as_ref()
        .or(image.large.as_ref())
        .or(image.thumb.as_ref())
        .or(image.original.as_ref())?;
    let url = candidate.url_filled()?;
    let fallback_width = image
        .original
        .as_ref()
        .and_then(|v| v.width)
        .unwrap_or(LINK_PREVIEW_FALLBACK_WIDTH);
    let fallback_height = image
        .original
        .as_ref()
        .and_then(|v| v.height)
        .unwrap_or(LINK_PREVIEW_FALLBACK_HEIGHT);
    Some(ImageResource {
        src: url.to_string(),
        width: candidate.width.unwrap_or(fallback_width),
        height: candidate.height.unwrap_or(fallback_height),
    })
}

fn hostname_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn blog_base(block: &Block) -> BlogBase {
    BlogBase {
        id: block.id,
        slug: block.slug.clone(),
        created_at: block.created_at,
        updated_at: block.updated_at,
        title: block.display_title().map(str::to_string),
    }
}

/// Derives the site's views from its three channels.
pub struct ContentService {
    arena: Arc<dyn ArenaService>,
    cache: Arc<dyn ContentCache>,
}

impl ContentService {
    pub fn new(arena: Arc<dyn ArenaService>, cache: Arc<dyn ContentCache>) -> Self {
        Self { arena, cache }
    }

    pub async fn channel(&self, slug: &str) -> Result<Channel, ArenaError> {
        fetch_channel_cached(self.arena.as_ref(), self.cache.as_ref(), slug, CHANNEL_REVALIDATE)
            .await
    }

    /// Bio sections, matched by block title (trimmed, case-insensitive) among
    /// the channel's Text blocks.
    pub async fn bio(&self, slug: &str) -> Result<BioContent, ArenaError> {
        let channel = self.channel(slug).await?;
        let section = |title: &str| -> String {
            channel
                .block_by_title(title)
                .filter(|b| b.is_text())
                .map(block_html)
                .unwrap_or_default()
        };
        Ok(BioContent {
            bio_html: section("Bio"),
            details_html: section("Details"),
            clients_html: section("Clients"),
            websites_html: section("Websites"),
            links_html: section("Links"),
            socials_html: section("Socials"),
            collaborators_html: section("Collaborators"),
        })
    }

    /// Portfolio slides in channel order. Image blocks carry proxied variant
    /// srcs and a best-effort placeholder; media and attachment blocks carry
    /// their embed or proxied file.
    pub async fn work_slides(&self, slug: &str) -> Result<Vec<WorkSlide>, ArenaError> {
        let channel = self.channel(slug).await?;
        let slides = join_all(
            channel
                .contents
                .iter()
                .filter(|b| b.is_image() || b.is_media() || b.is_attachment())
                .map(|b| self.slide_for(b)),
        )
        .await;
        Ok(slides)
    }

    /// Blog entries in channel order; callers re-sort as needed. Text blocks
    /// without derivable HTML and link blocks without a URL are dropped.
    pub async fn blog_entries(&self, slug: &str) -> Result<Vec<BlogEntry>, ArenaError> {
        let channel = self.channel(slug).await?;
        let entries = join_all(channel.contents.iter().map(|b| self.entry_for(b))).await;
        Ok(entries.into_iter().flatten().collect())
    }

    async fn slide_for(&self, block: &Block) -> WorkSlide {
        if let Some(image) = block.image.as_ref().filter(|_| block.is_image()) {
            let original_width = image
                .original
                .as_ref()
                .and_then(|v| v.width)
                .unwrap_or(SLIDE_FALLBACK_WIDTH);
            let original_height = image
                .original
                .as_ref()
                .and_then(|v| v.height)
                .unwrap_or(SLIDE_FALLBACK_HEIGHT);

            let variants = SlideVariants {
                original: ImageResource {
                    src: image_proxy_src(block.id, VariantKey::Original),
                    width: original_width,
                    height: original_height,
                },
                large: slide_variant(block.id, image, VariantKey::Large, original_width, original_height),
                display: slide_variant(
                    block.id,
                    image,
                    VariantKey::Display,
                    original_width,
                    original_height,
                ),
                thumb: slide_variant(block.id, image, VariantKey::Thumb, original_width, original_height),
            };

            let placeholder = match image.placeholder_source() {
                Some(source) => self.placeholder_for(block.id, source).await,
                None => None,
            };

            return WorkSlide::Image {
                id: block.id,
                alt: image_alt(block),
                src: image_proxy_src(block.id, VariantKey::Original),
                width: original_width,
                height: original_height,
                variants,
                placeholder,
                caption_html: block_html(block),
                date: block.created_at,
            };
        }

        let embed_html = if block.is_media() {
            block.embed.as_ref().and_then(|e| e.html.clone())
        } else {
            None
        };
        WorkSlide::Media {
            id: block.id,
            embed_html,
            attachment_url: block.attachment_url().map(|_| media_proxy_src(block.id)),
            attachment_content_type: block
                .attachment
                .as_ref()
                .and_then(|a| a.content_type.clone()),
            caption_html: block_html(block),
            title: block.display_title().unwrap_or("Media block").to_string(),
            date: block.created_at,
        }
    }

    async fn entry_for(&self, block: &Block) -> Option<BlogEntry> {
        if block.is_text() {
            let html = block_html(block);
            if html.is_empty() {
                return None;
            }
            return Some(BlogEntry::Text {
                base: blog_base(block),
                html,
            });
        }

        if let Some(image) = block.image.as_ref().filter(|_| block.is_image()) {
            let key = blog_variant_key(image);
            let chosen = image.variant(key);
            let original_width = image
                .original
                .as_ref()
                .and_then(|v| v.width)
                .unwrap_or(SLIDE_FALLBACK_WIDTH);
            let original_height = image
                .original
                .as_ref()
                .and_then(|v| v.height)
                .unwrap_or(SLIDE_FALLBACK_HEIGHT);

            let resource = ImageResource {
                src: image_proxy_src(block.id, key),
                width: chosen.and_then(|v| v.width).unwrap_or(original_width),
                height: chosen.and_then(|v| v.height).unwrap_or(original_height),
            };

            let placeholder = match image.placeholder_source() {
                Some(source) => self.placeholder_for(block.id, source).await,
                None => None,
            };

            return Some(BlogEntry::Image {
                base: blog_base(block),
                image: resource,
                alt: image_alt(block),
                caption_html: block_html(block),
                placeholder,
            });
        }

        if block.is_link() {
            let url = block
                .source_str("url")
                .or_else(|| block.source_str("source"))?
                .to_string();
            let hostname = hostname_of(&url);
            let site_name = block
                .metadata_str("site_name")
                .or_else(|| block.source_str("provider_name"))
                .or_else(|| block.source_str("provider"))
                .map(str::to_string)
                .or_else(|| hostname.clone());
            let metadata = LinkMetadata {
                title: block
                    .metadata_str("title")
                    .map(str::to_string)
                    .or_else(|| block.display_title().map(str::to_string)),
                description: block.metadata_str("description").map(str::to_string),
                site_name,
                hostname,
            };
            return Some(BlogEntry::Link {
                base: blog_base(block),
                url,
                caption_html: block_html(block),
                preview_image: link_preview_image(block),
                metadata,
            });
        }

        if block.is_media() || block.is_attachment() {
            let embed_html = if block.is_media() {
                block.embed.as_ref().and_then(|e| e.html.clone())
            } else {
                None
            };
            return Some(BlogEntry::Media {
                base: blog_base(block),
                embed_html,
                attachment_url: block.attachment_url().map(|_| media_proxy_src(block.id)),
                attachment_content_type: block
                    .attachment
                    .as_ref()
                    .and_then(|a| a.content_type.clone()),
                caption_html: block_html(block),
            });
        }

        warn!(block_id = block.id, class = %block.class, "block excluded from views");
        None
    }

    async fn placeholder_for(&self, block_id: i64, source: &str) -> Option<Placeholder> {
        let result: anyhow::Result<blur::BlurData> = async {
            let asset = self.arena.asset(source).await?;
            let bytes = asset.into_bytes().await?;
            let blur =
                tokio::task::spawn_blocking(move || blur::generate_blur_data(&bytes)).await??;
            Ok(blur)
        }
        .await;

        match result {
            Ok(blur) => Some(Placeholder {
                src: blur.data_url,
                width: blur.width,
                height: blur.height,
            }),
            Err(err) => {
                warn!(block_id, error = %err, "placeholder generation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_block(content: &str) -> Block {
        serde_json::from_value(json!({
            "id": 1,
            "class": "Text",
            "content": content
        }))
        .unwrap()
    }

    #[test]
    fn single_newline_becomes_one_break() {
        assert_eq!(block_html(&text_block("a\nb")), "a<br />b");
    }

    #[test]
    fn blank_line_becomes_paragraph_break() {
        assert_eq!(block_html(&text_block("a\n\nb")), "a<br /><br />b");
    }

    #[test]
    fn newline_runs_collapse_to_one_paragraph_break() {
        assert_eq!(block_html(&text_block("a\n\n\n\nb")), "a<br /><br />b");
        assert_eq!(block_html(&text_block("a\r\n\r\nb")), "a<br /><br />b");
    }

    #[test]
    fn markdown_links_become_anchors() {
        assert_eq!(
            block_html(&text_block("see [docs](https://example.org)")),
            "see <a href=\"https://example.org\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>"
        );
    }

    #[test]
    fn html_derivation_is_idempotent_per_block() {
        let block: Block = serde_json::from_value(json!({
            "id": 1,
            "class": "Text",
            "content_html": "<p>hi <a href=\"x\">there</a></p>"
        }))
        .unwrap();
        let first = block_html(&block);
        let second = block_html(&block);
        assert_eq!(first, second);
    }

    #[test]
    fn anchor_rewrite_adds_missing_attributes_once() {
        let html = "<a href=\"x\">y</a>";
        let rewritten = rewrite_anchors(html);
        assert_eq!(
            rewritten,
            "<a target=\"_blank\" rel=\"noopener noreferrer\" href=\"x\">y</a>"
        );
        // Re-running over its own output adds nothing.
        assert_eq!(rewrite_anchors(&rewritten), rewritten);
    }

    #[test]
    fn anchor_rewrite_keeps_existing_attributes() {
        let html = "<a href=\"x\" target=\"_self\">y</a>";
        let rewritten = rewrite_anchors(html);
        assert_eq!(
            rewritten,
            "<a rel=\"noopener noreferrer\" href=\"x\" target=\"_self\">y</a>"
        );

        let html = "<a rel=\"me\" href=\"x\">y</a>";
        let rewritten = rewrite_anchors(html);
        assert!(rewritten.contains("target=\"_blank\""));
        assert_eq!(rewritten.matches("rel=").count(), 1);
    }

    #[test]
    fn bare_anchor_gets_both_attributes() {
        assert_eq!(
            rewrite_anchors("<a>y</a>"),
            "<a target=\"_blank\" rel=\"noopener noreferrer\">y</a>"
        );
    }

    #[test]
    fn media_block_prefers_embed_html() {
        let block: Block = serde_json::from_value(json!({
            "id": 2,
            "class": "Media",
            "embed": { "html": "<iframe src=\"v\"></iframe>" },
            "description_html": "<p>desc</p>"
        }))
        .unwrap();
        assert_eq!(block_html(&block), "<iframe src=\"v\"></iframe>");

        let block: Block = serde_json::from_value(json!({
            "id": 2,
            "class": "Media",
            "description_html": "<p>desc</p>"
        }))
        .unwrap();
        assert_eq!(block_html(&block), "<p>desc</p>");
    }

    #[test]
    fn link_block_escapes_metadata_description() {
        let block: Block = serde_json::from_value(json!({
            "id": 3,
            "class": "Link",
            "metadata": { "description": "a < b & \"c\"" }
        }))
        .unwrap();
        assert_eq!(block_html(&block), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn hostname_strips_www_and_tolerates_garbage() {
        assert_eq!(
            hostname_of("https://www.example.org/page"),
            Some("example.org".to_string())
        );
        assert_eq!(
            hostname_of("https://sub.example.org"),
            Some("sub.example.org".to_string())
        );
        assert_eq!(hostname_of("not a url"), None);
    }

    #[test]
    fn link_preview_stops_at_first_present_variant() {
        // display is present but url-less: no fallback past it.
        let block: Block = serde_json::from_value(json!({
            "id": 4,
            "class": "Link",
            "image": {
                "display": { "width": 100 },
                "original": { "url": "o", "width": 800, "height": 400 }
            }
        }))
        .unwrap();
        assert!(link_preview_image(&block).is_none());

        let block: Block = serde_json::from_value(json!({
            "id": 4,
            "class": "Link",
            "image": {
                "original": { "url": "o" }
            }
        }))
        .unwrap();
        let preview = link_preview_image(&block).unwrap();
        assert_eq!(preview.src, "o");
        assert_eq!(preview.width, LINK_PREVIEW_FALLBACK_WIDTH);
        assert_eq!(preview.height, LINK_PREVIEW_FALLBACK_HEIGHT);
    }

    #[test]
    fn blog_variant_key_prefers_display_then_large() {
        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" },
            "large": { "url": "l" },
            "display": { "url": "d" }
        }))
        .unwrap();
        assert_eq!(blog_variant_key(&image), VariantKey::Display);

        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" },
            "large": { "url": "l" }
        }))
        .unwrap();
        assert_eq!(blog_variant_key(&image), VariantKey::Large);

        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" }
        }))
        .unwrap();
        assert_eq!(blog_variant_key(&image), VariantKey::Original);
    }

    #[test]
    fn work_slide_serializes_camel_case() {
        let slide = WorkSlide::Media {
            id: 9,
            embed_html: None,
            attachment_url: Some("/api/content/media/9".into()),
            attachment_content_type: Some("video/mp4".into()),
            caption_html: String::new(),
            title: "Clip".into(),
            date: None,
        };
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["kind"], "media");
        assert_eq!(value["attachmentUrl"], "/api/content/media/9");
        assert_eq!(value["attachmentContentType"], "video/mp4");
        assert!(value.get("embedHtml").is_none());
    }

    #[test]
    fn blog_entry_flattens_base_fields() {
        let entry = BlogEntry::Text {
            base: BlogBase {
                id: 5,
                slug: "hello".into(),
                created_at: None,
                updated_at: None,
                title: Some("Hello".into()),
            },
            html: "hi".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "text");
        assert_eq!(value["id"], 5);
        assert_eq!(value["slug"], "hello");
        assert_eq!(value["html"], "hi");
    }
}
