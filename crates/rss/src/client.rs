// ABOUTME: HTTP feed access client built on reqwest.
// ABOUTME: Fetches a URL, gates status and Content-Type, decodes the body, and parses it.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};

use crate::charset::decode_bytes;
use crate::error::Error;
use crate::models::Feed;

/// Preferred media type for RSS documents.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

const ALLOWED_MEDIA_TYPES: &[&str] = &["application/rss+xml", "application/xml", "text/xml"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A cookie sent along with the feed request.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Options for fetching a feed.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub cookies: Vec<Cookie>,
    pub skip_content_type_check: bool,
    pub skip_certificate_check: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            cookies: Vec::new(),
            skip_content_type_check: false,
            skip_certificate_check: false,
        }
    }
}

/// An HTTP client that fetches and decodes feeds.
pub struct Client {
    http: reqwest::Client,
    options: FetchOptions,
}

impl Client {
    /// Creates a client with the given options.
    pub fn new(options: FetchOptions) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.skip_certificate_check)
            .build()?;
        Ok(Self { http, options })
    }

    /// Fetches the feed at `url` and decodes it.
    ///
    /// Non-2xx statuses and, unless disabled, non-feed media types fail before
    /// any decoding happens. Nothing is retried here; callers can consult
    /// [`Error::is_temporary`] to decide for themselves.
    pub async fn get(&self, url: &str) -> Result<Feed, Error> {
        if url::Url::parse(url).is_err() {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        // Some servers answer with a login or error page unless the request
        // names the feed media types it accepts.
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, ALLOWED_MEDIA_TYPES.join(", "));
        if !self.options.cookies.is_empty() {
            let header = self
                .options
                .cookies
                .iter()
                .map(|cookie| format!("{}={}", cookie.name, cookie.value))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.header(COOKIE, header);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !self.options.skip_content_type_check {
            check_content_type(&content_type)?;
        }

        let body = response.bytes().await?;
        let text = decode_bytes(&body, charset_label(&content_type));
        crate::parse(&text)
    }
}

/// Fetches the feed at `url` with the default options.
pub async fn get(url: &str) -> Result<Feed, Error> {
    Client::new(FetchOptions::default())?.get(url).await
}

fn check_content_type(content_type: &str) -> Result<(), Error> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        Ok(())
    } else {
        Err(Error::ContentType(media_type))
    }
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|parameter| {
        let (name, value) = parameter.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').trim_matches('\''))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Feed title</title>
        <link>http://example.com/</link>
        <description>Feed description</description>
    </channel>
</rss>"#;

    #[tokio::test]
    async fn test_get_parses_the_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/feed")
                .header("accept", "application/rss+xml, application/xml, text/xml");
            then.status(200)
                .header("content-type", "application/rss+xml; charset=utf-8")
                .body(FEED);
        });

        let feed = get(&server.url("/feed")).await.expect("fetch should succeed");
        mock.assert();
        assert_eq!(feed.title, "Feed title");
        assert_eq!(feed.link, "http://example.com/");
    }

    #[tokio::test]
    async fn test_get_sends_cookies() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/feed")
                .header("cookie", "session=abc; lang=en");
            then.status(200)
                .header("content-type", "text/xml")
                .body(FEED);
        });

        let options = FetchOptions {
            cookies: vec![
                Cookie {
                    name: "session".to_string(),
                    value: "abc".to_string(),
                },
                Cookie {
                    name: "lang".to_string(),
                    value: "en".to_string(),
                },
            ],
            ..Default::default()
        };
        let client = Client::new(options).unwrap();
        client.get(&server.url("/feed")).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_get_rejects_foreign_content_type() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/feed");
            then.status(200).header("content-type", "text/html").body(FEED);
        });

        let err = get(&server.url("/feed")).await.expect_err("should fail");
        assert!(matches!(err, Error::ContentType(ref media) if media == "text/html"));
        assert!(!err.is_temporary());
    }

    #[tokio::test]
    async fn test_get_content_type_check_can_be_disabled() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/feed");
            then.status(200).header("content-type", "text/html").body(FEED);
        });

        let options = FetchOptions {
            skip_content_type_check: true,
            ..Default::default()
        };
        let feed = Client::new(options).unwrap().get(&server.url("/feed")).await.unwrap();
        assert_eq!(feed.title, "Feed title");
    }

    #[tokio::test]
    async fn test_get_maps_server_errors_as_temporary() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/feed");
            then.status(503);
        });

        let err = get(&server.url("/feed")).await.expect_err("should fail");
        assert!(matches!(err, Error::Status(status) if status.as_u16() == 503));
        assert!(err.is_temporary());
    }

    #[tokio::test]
    async fn test_get_maps_client_errors_as_permanent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/feed");
            then.status(404);
        });

        let err = get(&server.url("/feed")).await.expect_err("should fail");
        assert!(matches!(err, Error::Status(status) if status.as_u16() == 404));
        assert!(!err.is_temporary());
    }

    #[tokio::test]
    async fn test_get_decodes_a_labelled_charset() {
        let document = r#"<?xml version="1.0" encoding="windows-1251"?>
<rss version="2.0">
    <channel>
        <title>Свежачок</title>
        <link>http://example.com/</link>
        <description>Сериалы</description>
    </channel>
</rss>"#;
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(document);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/feed");
            then.status(200)
                .header("content-type", "application/rss+xml; charset=windows-1251")
                .body(bytes.into_owned());
        });

        let feed = get(&server.url("/feed")).await.unwrap();
        assert_eq!(feed.title, "Свежачок");
        assert_eq!(feed.description, "Сериалы");
    }

    #[tokio::test]
    async fn test_get_rejects_an_invalid_url() {
        let err = get("not a url").await.expect_err("should fail");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_charset_label_extraction() {
        assert_eq!(charset_label("text/xml; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_label("text/xml; CHARSET=\"KOI8-R\""), Some("KOI8-R"));
        assert_eq!(charset_label("text/xml"), None);
    }
}
