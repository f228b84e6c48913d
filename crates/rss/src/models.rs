// ABOUTME: Document model for RSS feeds, items, and media extensions.
// ABOUTME: Plain data with no behavior; decode and encode walk these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete RSS channel with its metadata and items.
///
/// `title`, `link`, and `description` are required by the format and always
/// written; emptiness is not enforced on decode. An absent `pub_date` writes
/// no `pubDate` element at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<Image>,
    pub language: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub generator: Option<String>,
    pub ttl: Option<u32>,
    pub items: Vec<Item>,
}

/// The channel's image. `url`, `title`, and `link` are always written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub link: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One entry of a feed. Item order matches document order both ways.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: Option<String>,
    pub guid: Guid,
    pub link: Option<String>,
    pub description: Option<String>,
    pub enclosures: Vec<Enclosure>,
    pub media_content: Vec<MediaContent>,
    pub media_groups: Vec<MediaGroup>,
    pub comments: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

/// An item identifier with a tri-state permalink flag.
///
/// A `Guid` with an empty `id` is semantically empty: it writes no element,
/// and any set `is_perma_link` flag is lost with it. The wire format has no
/// way to carry the flag without an identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guid {
    pub id: String,
    pub is_perma_link: Option<bool>,
}

/// A media attachment. All three attributes are required and always written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    pub length: u64,
}

/// A media RSS `<group>`: alternate renditions of one media object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaGroup {
    pub title: Option<String>,
    pub thumbnail: Option<MediaThumbnail>,
    pub content: Vec<MediaContent>,
    pub description: Option<MediaDescription>,
}

/// A media RSS `<content>` element. Every attribute is optional; absent
/// attributes are not written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaContent {
    pub url: Option<String>,
    pub medium: Option<String>,
    pub mime_type: Option<String>,
    pub expression: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_default: Option<bool>,
    pub title: Option<String>,
    pub thumbnail: Option<MediaThumbnail>,
    pub description: Option<MediaDescription>,
}

/// A media RSS `<thumbnail>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaThumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A media RSS `<description>`: free text plus an optional `type` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDescription {
    pub text_type: Option<String>,
    pub text: String,
}
