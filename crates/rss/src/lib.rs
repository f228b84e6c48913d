// ABOUTME: RSS syndication feed codec and fetch library.
// ABOUTME: Decodes RSS 0.91/0.92/2.0, generates canonical RSS 2.0, and fetches feeds over HTTP.

mod charset;
mod schema;
mod xml_tree;

pub mod client;
pub mod error;
pub mod models;
pub mod time_parse;

pub use client::{get, Client, Cookie, FetchOptions, RSS_CONTENT_TYPE};
pub use error::{DateFormatError, Error};
pub use models::{
    Enclosure, Feed, Guid, Image, Item, MediaContent, MediaDescription, MediaGroup, MediaThumbnail,
};
pub use time_parse::{format_pub_date, parse_pub_date};

use crate::charset::decode_bytes;

/// Decodes an RSS document from an already-decoded character stream.
pub fn parse(input: &str) -> Result<Feed, Error> {
    schema::parse(input)
}

/// Decodes an RSS document from raw bytes, resolving the charset from the
/// XML declaration or by detection.
pub fn parse_bytes(data: &[u8]) -> Result<Feed, Error> {
    schema::parse(&decode_bytes(data, None))
}

/// Encodes a feed as the canonical pretty-printed RSS 2.0 document.
pub fn generate(feed: &Feed) -> Result<String, Error> {
    schema::generate(feed)
}
