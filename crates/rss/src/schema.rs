// ABOUTME: Structural codec mapping the document model onto the XML element tree.
// ABOUTME: Decode matches (namespace, name) per field; encode lists fields in wire order.

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{
    Enclosure, Feed, Guid, Image, Item, MediaContent, MediaDescription, MediaGroup, MediaThumbnail,
};
use crate::time_parse::{format_pub_date, parse_pub_date};
use crate::xml_tree::{self, Element};

/// Namespace of the media RSS extension vocabulary.
pub(crate) const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

const ACCEPTED_VERSIONS: &[&str] = &["2.0", "0.92", "0.91"];

/// Documents are always written as RSS 2.0, whatever version they declared
/// when read.
const EMITTED_VERSION: &str = "2.0";

/// Emission rule for a scalar field.
#[derive(Clone, Copy, PartialEq)]
enum Presence {
    Always,
    OmitEmpty,
}

// ----------------------------------------------------------------------------
// Decode
// ----------------------------------------------------------------------------

pub(crate) fn parse(input: &str) -> Result<Feed, Error> {
    let root = xml_tree::read_document(input)?;
    if root.name != "rss" {
        return Err(Error::UnexpectedRoot(root.name));
    }
    let version = root.attr("version").unwrap_or_default();
    if !ACCEPTED_VERSIONS.contains(&version) {
        return Err(Error::InvalidVersion(version.to_string()));
    }
    let channel = root.child("channel").ok_or(Error::NotRss)?;
    feed_from_element(channel)
}

fn feed_from_element(channel: &Element) -> Result<Feed, Error> {
    let mut feed = Feed::default();
    for child in &channel.children {
        match child.name.as_str() {
            "title" => feed.title = child.text.clone(),
            "link" => feed.link = child.text.clone(),
            "description" => feed.description = child.text.clone(),
            "image" => feed.image = Some(image_from_element(child)?),
            "language" => feed.language = Some(child.text.clone()),
            "pubDate" => feed.pub_date = Some(date_from_element(child)?),
            "category" => feed.categories.push(child.text.clone()),
            "generator" => feed.generator = Some(child.text.clone()),
            "ttl" => feed.ttl = Some(parse_number(&child.text, "ttl")?),
            "item" => feed.items.push(item_from_element(child)?),
            _ => {}
        }
    }
    Ok(feed)
}

fn image_from_element(image: &Element) -> Result<Image, Error> {
    let mut out = Image::default();
    for child in &image.children {
        match child.name.as_str() {
            "url" => out.url = child.text.clone(),
            "title" => out.title = child.text.clone(),
            "link" => out.link = child.text.clone(),
            "width" => out.width = Some(parse_number(&child.text, "width")?),
            "height" => out.height = Some(parse_number(&child.text, "height")?),
            _ => {}
        }
    }
    Ok(out)
}

fn item_from_element(item: &Element) -> Result<Item, Error> {
    let mut out = Item::default();
    for child in &item.children {
        match child.name.as_str() {
            // Media extensions share local names with other vocabularies, so
            // these two match on the resolved namespace; a foreign <content>
            // falls through to the unknown-element arm.
            "content" if child.namespace.as_deref() == Some(MEDIA_NS) => {
                out.media_content.push(media_content_from_element(child)?)
            }
            "group" if child.namespace.as_deref() == Some(MEDIA_NS) => {
                out.media_groups.push(media_group_from_element(child)?)
            }
            "title" => out.title = Some(child.text.clone()),
            "guid" => out.guid = guid_from_element(child)?,
            "link" => out.link = Some(child.text.clone()),
            "description" => out.description = Some(child.text.clone()),
            "enclosure" => out.enclosures.push(enclosure_from_element(child)?),
            "comments" => out.comments = Some(child.text.clone()),
            "pubDate" => out.pub_date = Some(date_from_element(child)?),
            "author" => out.author = Some(child.text.clone()),
            "category" => out.categories.push(child.text.clone()),
            _ => {}
        }
    }
    Ok(out)
}

fn guid_from_element(guid: &Element) -> Result<Guid, Error> {
    let is_perma_link = match guid.attr("isPermaLink") {
        Some(value) => Some(parse_flag(value, "isPermaLink")?),
        None => None,
    };
    Ok(Guid {
        id: guid.text.clone(),
        is_perma_link,
    })
}

fn enclosure_from_element(enclosure: &Element) -> Result<Enclosure, Error> {
    Ok(Enclosure {
        url: enclosure.attr("url").unwrap_or_default().to_string(),
        mime_type: enclosure.attr("type").unwrap_or_default().to_string(),
        length: match enclosure.attr("length") {
            Some(value) => parse_number(value, "length")?,
            None => 0,
        },
    })
}

fn media_group_from_element(group: &Element) -> Result<MediaGroup, Error> {
    let mut out = MediaGroup::default();
    for child in &group.children {
        match child.name.as_str() {
            "title" => out.title = Some(child.text.clone()),
            "thumbnail" => out.thumbnail = Some(media_thumbnail_from_element(child)?),
            "content" => out.content.push(media_content_from_element(child)?),
            "description" => out.description = Some(media_description_from_element(child)),
            _ => {}
        }
    }
    Ok(out)
}

fn media_content_from_element(content: &Element) -> Result<MediaContent, Error> {
    let mut out = MediaContent {
        url: content.attr("url").map(str::to_string),
        medium: content.attr("medium").map(str::to_string),
        mime_type: content.attr("type").map(str::to_string),
        expression: content.attr("expression").map(str::to_string),
        width: attr_number(content, "width")?,
        height: attr_number(content, "height")?,
        is_default: match content.attr("isDefault") {
            Some(value) => Some(parse_flag(value, "isDefault")?),
            None => None,
        },
        ..Default::default()
    };
    for child in &content.children {
        match child.name.as_str() {
            "title" => out.title = Some(child.text.clone()),
            "thumbnail" => out.thumbnail = Some(media_thumbnail_from_element(child)?),
            "description" => out.description = Some(media_description_from_element(child)),
            _ => {}
        }
    }
    Ok(out)
}

fn media_thumbnail_from_element(thumbnail: &Element) -> Result<MediaThumbnail, Error> {
    Ok(MediaThumbnail {
        url: thumbnail.attr("url").unwrap_or_default().to_string(),
        width: attr_number(thumbnail, "width")?,
        height: attr_number(thumbnail, "height")?,
    })
}

fn media_description_from_element(description: &Element) -> MediaDescription {
    MediaDescription {
        text_type: description.attr("type").map(str::to_string),
        text: description.text.clone(),
    }
}

fn date_from_element(element: &Element) -> Result<DateTime<Utc>, Error> {
    parse_pub_date(&element.text).map_err(|source| Error::Date {
        field: "pubDate",
        source,
    })
}

fn parse_number<T: std::str::FromStr>(text: &str, field: &'static str) -> Result<T, Error> {
    text.trim().parse().map_err(|_| Error::InvalidValue {
        field,
        value: text.to_string(),
    })
}

fn parse_flag(text: &str, field: &'static str) -> Result<bool, Error> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidValue {
            field,
            value: text.to_string(),
        }),
    }
}

fn attr_number(element: &Element, field: &'static str) -> Result<Option<u32>, Error> {
    match element.attr(field) {
        Some(value) => Ok(Some(parse_number(value, field)?)),
        None => Ok(None),
    }
}

// ----------------------------------------------------------------------------
// Encode
// ----------------------------------------------------------------------------

pub(crate) fn generate(feed: &Feed) -> Result<String, Error> {
    let mut root = Element::new("rss");
    root.set_attr("version", EMITTED_VERSION);
    root.children.push(feed_to_element(feed));
    xml_tree::write_document(&root)
}

fn feed_to_element(feed: &Feed) -> Element {
    let mut channel = Element::new("channel");
    text_field(&mut channel, "title", &feed.title, Presence::Always);
    text_field(&mut channel, "link", &feed.link, Presence::Always);
    text_field(&mut channel, "description", &feed.description, Presence::Always);
    if let Some(image) = &feed.image {
        channel.children.push(image_to_element(image));
    }
    opt_text_field(&mut channel, "language", &feed.language);
    date_field(&mut channel, "pubDate", &feed.pub_date);
    for category in &feed.categories {
        text_field(&mut channel, "category", category, Presence::Always);
    }
    opt_text_field(&mut channel, "generator", &feed.generator);
    number_field(&mut channel, "ttl", feed.ttl);
    for item in &feed.items {
        channel.children.push(item_to_element(item));
    }
    channel
}

fn image_to_element(image: &Image) -> Element {
    let mut element = Element::new("image");
    text_field(&mut element, "url", &image.url, Presence::Always);
    text_field(&mut element, "title", &image.title, Presence::Always);
    text_field(&mut element, "link", &image.link, Presence::Always);
    number_field(&mut element, "width", image.width);
    number_field(&mut element, "height", image.height);
    element
}

fn item_to_element(item: &Item) -> Element {
    let mut element = Element::new("item");
    opt_text_field(&mut element, "title", &item.title);
    if let Some(guid) = guid_to_element(&item.guid) {
        element.children.push(guid);
    }
    opt_text_field(&mut element, "link", &item.link);
    opt_text_field(&mut element, "description", &item.description);
    for enclosure in &item.enclosures {
        element.children.push(enclosure_to_element(enclosure));
    }
    for content in &item.media_content {
        element.children.push(media_content_to_element(content, true));
    }
    for group in &item.media_groups {
        element.children.push(media_group_to_element(group));
    }
    opt_text_field(&mut element, "comments", &item.comments);
    date_field(&mut element, "pubDate", &item.pub_date);
    opt_text_field(&mut element, "author", &item.author);
    for category in &item.categories {
        text_field(&mut element, "category", category, Presence::Always);
    }
    element
}

// An empty id suppresses the whole element even when the permalink flag is
// set; the wire format cannot carry the flag without an identifier.
fn guid_to_element(guid: &Guid) -> Option<Element> {
    if guid.id.is_empty() {
        return None;
    }
    let mut element = Element::new("guid");
    if let Some(is_perma_link) = guid.is_perma_link {
        element.set_attr("isPermaLink", flag_text(is_perma_link));
    }
    element.text = guid.id.clone();
    Some(element)
}

fn enclosure_to_element(enclosure: &Enclosure) -> Element {
    let mut element = Element::new("enclosure");
    element.set_attr("url", enclosure.url.as_str());
    element.set_attr("type", enclosure.mime_type.as_str());
    element.set_attr("length", enclosure.length.to_string());
    element
}

fn media_group_to_element(group: &MediaGroup) -> Element {
    let mut element = Element::new("group");
    element.set_attr("xmlns", MEDIA_NS);
    opt_text_field(&mut element, "title", &group.title);
    if let Some(thumbnail) = &group.thumbnail {
        element.children.push(media_thumbnail_to_element(thumbnail));
    }
    for content in &group.content {
        element.children.push(media_content_to_element(content, false));
    }
    if let Some(description) = &group.description {
        element.children.push(media_description_to_element(description));
    }
    element
}

fn media_content_to_element(content: &MediaContent, declare_namespace: bool) -> Element {
    let mut element = Element::new("content");
    // Item-level entries declare the namespace themselves; entries nested in a
    // <group> inherit it.
    if declare_namespace {
        element.set_attr("xmlns", MEDIA_NS);
    }
    opt_text_attr(&mut element, "url", &content.url);
    opt_text_attr(&mut element, "medium", &content.medium);
    opt_text_attr(&mut element, "type", &content.mime_type);
    opt_text_attr(&mut element, "expression", &content.expression);
    number_attr(&mut element, "width", content.width);
    number_attr(&mut element, "height", content.height);
    if let Some(is_default) = content.is_default {
        element.set_attr("isDefault", flag_text(is_default));
    }
    opt_text_field(&mut element, "title", &content.title);
    if let Some(thumbnail) = &content.thumbnail {
        element.children.push(media_thumbnail_to_element(thumbnail));
    }
    if let Some(description) = &content.description {
        element.children.push(media_description_to_element(description));
    }
    element
}

fn media_thumbnail_to_element(thumbnail: &MediaThumbnail) -> Element {
    let mut element = Element::new("thumbnail");
    element.set_attr("url", thumbnail.url.as_str());
    number_attr(&mut element, "width", thumbnail.width);
    number_attr(&mut element, "height", thumbnail.height);
    element
}

fn media_description_to_element(description: &MediaDescription) -> Element {
    let mut element = Element::new("description");
    if let Some(text_type) = &description.text_type {
        if !text_type.is_empty() {
            element.set_attr("type", text_type.as_str());
        }
    }
    element.text = description.text.clone();
    element
}

fn text_field(parent: &mut Element, name: &str, value: &str, presence: Presence) {
    if presence == Presence::OmitEmpty && value.is_empty() {
        return;
    }
    let mut element = Element::new(name);
    element.text = value.to_string();
    parent.children.push(element);
}

fn opt_text_field(parent: &mut Element, name: &str, value: &Option<String>) {
    text_field(
        parent,
        name,
        value.as_deref().unwrap_or_default(),
        Presence::OmitEmpty,
    );
}

fn number_field(parent: &mut Element, name: &str, value: Option<u32>) {
    if let Some(value) = value {
        text_field(parent, name, &value.to_string(), Presence::Always);
    }
}

// An absent timestamp suppresses the element entirely; there is no empty
// <pubDate></pubDate> form.
fn date_field(parent: &mut Element, name: &str, value: &Option<DateTime<Utc>>) {
    if let Some(date) = value {
        text_field(parent, name, &format_pub_date(date), Presence::Always);
    }
}

fn opt_text_attr(element: &mut Element, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            element.set_attr(name, value.as_str());
        }
    }
}

fn number_attr(element: &mut Element, name: &str, value: Option<u32>) {
    if let Some(value) = value {
        element.set_attr(name, value.to_string());
    }
}

fn flag_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
