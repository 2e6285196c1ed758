//! Raw shapes returned by the content platform API.
//!
//! Every field beyond the numeric id is optional or defaulted: upstream
//! payloads vary per block class and have changed shape over time, so parsing
//! never fails on a missing or extra field. Classification happens after
//! parsing, via the predicates on [`Block`].
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One rendition of an image (original, large, display or thumb).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageVariant {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ImageVariant {
    /// Url, if present and non-blank.
    pub fn url_filled(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Which image rendition a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKey {
    Original,
    Large,
    Display,
    Thumb,
}

impl VariantKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "original" => Some(Self::Original),
            "large" => Some(Self::Large),
            "display" => Some(Self::Display),
            "thumb" => Some(Self::Thumb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Large => "large",
            Self::Display => "display",
            Self::Thumb => "thumb",
        }
    }
}

/// Image renditions attached to Image and Link blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Image {
    #[serde(default)]
    pub original: Option<ImageVariant>,
    #[serde(default)]
    pub large: Option<ImageVariant>,
    #[serde(default)]
    pub display: Option<ImageVariant>,
    #[serde(default)]
    pub thumb: Option<ImageVariant>,
}

impl Image {
    pub fn variant(&self, key: VariantKey) -> Option<&ImageVariant> {
        match key {
            VariantKey::Original => self.original.as_ref(),
            VariantKey::Large => self.large.as_ref(),
            VariantKey::Display => self.display.as_ref(),
            VariantKey::Thumb => self.thumb.as_ref(),
        }
    }

    pub fn original_url(&self) -> Option<&str> {
        self.original.as_ref().and_then(ImageVariant::url_filled)
    }

    /// Smallest rendition with a url, preferred for placeholder generation.
    pub fn placeholder_source(&self) -> Option<&str> {
        self.thumb
            .as_ref()
            .and_then(ImageVariant::url_filled)
            .or_else(|| self.display.as_ref().and_then(ImageVariant::url_filled))
            .or_else(|| self.large.as_ref().and_then(ImageVariant::url_filled))
            .or_else(|| self.original_url())
    }
}

/// Embed payload on Media blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

/// Uploaded file payload on Media and Attachment blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single channel entry of any class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Block {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_html: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub generated_title: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub embed: Option<Embed>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

fn value_str<'a>(container: &'a Option<Value>, key: &str) -> Option<&'a str> {
    container
        .as_ref()
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

impl Block {
    pub fn is_text(&self) -> bool {
        self.class == "Text"
    }

    /// Image blocks must carry a usable original url to count.
    pub fn is_image(&self) -> bool {
        self.class == "Image" && self.image.as_ref().and_then(Image::original_url).is_some()
    }

    pub fn is_media(&self) -> bool {
        self.class == "Media"
    }

    /// Attachment blocks must carry a file url to count.
    pub fn is_attachment(&self) -> bool {
        self.class == "Attachment" && self.attachment_url().is_some()
    }

    pub fn is_link(&self) -> bool {
        self.class == "Link"
    }

    /// User-given title, falling back to the generated one.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.generated_title.as_deref().filter(|t| !t.is_empty()))
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        value_str(&self.metadata, key)
    }

    pub fn source_str(&self, key: &str) -> Option<&str> {
        value_str(&self.source, key)
    }

    pub fn attachment_url(&self) -> Option<&str> {
        self.attachment
            .as_ref()
            .and_then(|a| a.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

/// A channel with its contents, as fetched in one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub contents: Vec<Block>,
}

impl Channel {
    /// First block whose title matches, compared trimmed and case-insensitive.
    pub fn block_by_title(&self, title: &str) -> Option<&Block> {
        let wanted = title.trim().to_lowercase();
        self.contents.iter().find(|b| {
            b.title
                .as_deref()
                .map(|t| t.trim().to_lowercase() == wanted)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(value: Value) -> Block {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn image_block_requires_original_url() {
        let with_url = block(json!({
            "id": 1,
            "class": "Image",
            "image": { "original": { "url": "https://cdn.example/a.jpg" } }
        }));
        assert!(with_url.is_image());

        let without_url = block(json!({
            "id": 2,
            "class": "Image",
            "image": { "original": { "width": 800 } }
        }));
        assert!(!without_url.is_image());

        let no_image = block(json!({ "id": 3, "class": "Image" }));
        assert!(!no_image.is_image());
    }

    #[test]
    fn attachment_block_requires_file_url() {
        let with_url = block(json!({
            "id": 1,
            "class": "Attachment",
            "attachment": { "url": "https://cdn.example/doc.pdf" }
        }));
        assert!(with_url.is_attachment());

        let blank = block(json!({
            "id": 2,
            "class": "Attachment",
            "attachment": { "url": "  " }
        }));
        assert!(!blank.is_attachment());
    }

    #[test]
    fn media_is_class_only() {
        let bare = block(json!({ "id": 1, "class": "Media" }));
        assert!(bare.is_media());
        assert!(!bare.is_attachment());
    }

    #[test]
    fn unknown_class_matches_nothing() {
        let b = block(json!({ "id": 1, "class": "Channel" }));
        assert!(!b.is_text());
        assert!(!b.is_image());
        assert!(!b.is_media());
        assert!(!b.is_attachment());
        assert!(!b.is_link());
    }

    #[test]
    fn parsing_tolerates_missing_and_extra_fields() {
        let b = block(json!({ "id": 9, "class": "Text", "unknown_field": { "x": 1 } }));
        assert!(b.is_text());
        assert!(b.content.is_none());

        let channel: Channel = serde_json::from_value(json!({
            "id": 5,
            "slug": "my-channel",
            "title": "My Channel",
            "contents": [{ "id": 9, "class": "Text" }]
        }))
        .unwrap();
        assert_eq!(channel.contents.len(), 1);
    }

    #[test]
    fn placeholder_source_prefers_smaller_variants() {
        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" },
            "large": { "url": "l" },
            "thumb": { "url": "t" }
        }))
        .unwrap();
        assert_eq!(image.placeholder_source(), Some("t"));

        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" },
            "large": { "url": "l" }
        }))
        .unwrap();
        assert_eq!(image.placeholder_source(), Some("l"));

        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o" },
            "thumb": { "width": 16 }
        }))
        .unwrap();
        assert_eq!(image.placeholder_source(), Some("o"));
    }

    #[test]
    fn display_title_falls_back_to_generated() {
        let b = block(json!({ "id": 1, "class": "Image", "generated_title": "gen" }));
        assert_eq!(b.display_title(), Some("gen"));

        let b = block(json!({ "id": 1, "class": "Image", "title": "given", "generated_title": "gen" }));
        assert_eq!(b.display_title(), Some("given"));

        let b = block(json!({ "id": 1, "class": "Image", "title": "" }));
        assert_eq!(b.display_title(), None);
    }

    #[test]
    fn metadata_and_source_lookups_require_strings() {
        let b = block(json!({
            "id": 1,
            "class": "Link",
            "metadata": { "description": "desc", "count": 3 },
            "source": { "url": "https://example.org", "provider": null }
        }));
        assert_eq!(b.metadata_str("description"), Some("desc"));
        assert_eq!(b.metadata_str("count"), None);
        assert_eq!(b.source_str("url"), Some("https://example.org"));
        assert_eq!(b.source_str("provider"), None);
    }

    #[test]
    fn block_by_title_is_trimmed_and_case_insensitive() {
        let channel: Channel = serde_json::from_value(json!({
            "id": 1,
            "slug": "bio",
            "title": "Bio",
            "contents": [
                { "id": 1, "class": "Text", "title": "  BIO " },
                { "id": 2, "class": "Text", "title": "Details" }
            ]
        }))
        .unwrap();
        assert_eq!(channel.block_by_title("bio").map(|b| b.id), Some(1));
        assert_eq!(channel.block_by_title("details").map(|b| b.id), Some(2));
        assert!(channel.block_by_title("missing").is_none());
    }

    #[test]
    fn variant_lookup() {
        let image: Image = serde_json::from_value(json!({
            "original": { "url": "o", "width": 1600, "height": 900 },
            "display": { "url": "d" }
        }))
        .unwrap();
        assert_eq!(
            image.variant(VariantKey::Display).and_then(ImageVariant::url_filled),
            Some("d")
        );
        assert!(image.variant(VariantKey::Thumb).is_none());
        assert_eq!(VariantKey::parse("large"), Some(VariantKey::Large));
        assert_eq!(VariantKey::parse("huge"), None);
        assert_eq!(VariantKey::Display.as_str(), "display");
    }
}
