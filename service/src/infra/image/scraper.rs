//! HTTP scraping [`ImageResolver`] implementation.

use std::sync::LazyLock;

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError, From};
use regex::Regex;
use reqwest::{StatusCode, Url};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::product_request::{ImageUrl, ProductUrl},
    infra::image,
};

use super::ImageResolver;

/// Configuration of a [`Scraper`].
#[derive(Clone, Debug)]
pub struct Config {
    /// `User-Agent` header to fetch product pages with.
    pub user_agent: String,
}

/// [`ImageResolver`] fetching a product page and extracting the image it
/// advertises via [Open Graph], [Twitter Card] or `image_src` link metadata.
///
/// [Open Graph]: https://ogp.me
/// [Twitter Card]: https://developer.x.com/en/docs/x-for-websites/cards
#[derive(Clone, Debug)]
pub struct Scraper {
    /// HTTP client to fetch product pages with.
    client: reqwest::Client,
}

impl Scraper {
    /// Creates a new [`Scraper`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to build an HTTP client.
    pub fn new(config: &Config) -> Result<Self, Traced<image::Error>> {
        reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map(|client| Self { client })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl ImageResolver<Select<By<Option<ImageUrl>, ProductUrl>>> for Scraper {
    type Ok = Option<ImageUrl>;
    type Err = Traced<image::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ImageUrl>, ProductUrl>>,
    ) -> Result<Self::Ok, Self::Err> {
        let url = by.into_inner().to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE)
        {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let base = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let image = extract_image(&html, &base);
        if image.is_none() {
            log::debug!("no image advertised by `{base}`");
        }
        Ok(image)
    }
}

/// [`Scraper`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request error.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),
}

/// Metadata keys advertising a page image, in the order of preference.
const META_KEYS: [&str; 5] = [
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

/// Extracts an absolute [`ImageUrl`] advertised by the provided `html` page
/// located at the `base` URL.
fn extract_image(html: &str, base: &Url) -> Option<ImageUrl> {
    /// Regular expression matching a `<meta>` tag.
    static META: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<meta\s[^>]*>").expect("valid regex")
    });

    /// Regular expression matching a `<link>` tag.
    static LINK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<link\s[^>]*>").expect("valid regex")
    });

    let metas = META
        .find_iter(html)
        .map(|m| attributes(m.as_str()))
        .filter_map(|attrs| {
            let key = attr(&attrs, "property")
                .or_else(|| attr(&attrs, "name"))?;
            let content = attr(&attrs, "content")?;
            Some((key.to_ascii_lowercase(), content.to_owned()))
        })
        .collect::<Vec<_>>();

    let from_meta = META_KEYS.iter().find_map(|k| {
        metas
            .iter()
            .find(|(key, content)| {
                key.as_str() == *k && !content.trim().is_empty()
            })
            .map(|(_, content)| content.clone())
    });
    let from_link = || {
        LINK.find_iter(html)
            .map(|m| attributes(m.as_str()))
            .find(|attrs| {
                attr(attrs, "rel").is_some_and(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("image_src"))
                })
            })
            .and_then(|attrs| attr(&attrs, "href").map(ToOwned::to_owned))
    };

    let raw = from_meta.or_else(from_link)?;
    let url = base.join(&raw.trim().replace("&amp;", "&")).ok()?;
    matches!(url.scheme(), "http" | "https")
        .then(|| ImageUrl::new(url.to_string()))
        .flatten()
}

/// Parses attributes of the provided HTML `tag` into lowercased name and
/// value pairs.
fn attributes(tag: &str) -> Vec<(String, String)> {
    /// Regular expression matching an HTML attribute.
    static ATTR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"(?is)([a-z_:\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        )
        .expect("valid regex")
    });

    ATTR.captures_iter(tag)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), value.to_owned())
        })
        .collect()
}

/// Returns the value of the `name`d attribute out of the provided `attrs`.
fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod spec {
    use reqwest::Url;

    use super::extract_image;

    fn base() -> Url {
        Url::parse("https://shop.example.com/items/42?ref=home").unwrap()
    }

    fn extract(html: &str) -> Option<String> {
        extract_image(html, &base()).map(|u| u.to_string())
    }

    #[test]
    fn extracts_open_graph_image() {
        let html = r#"<html><head>
            <meta property="og:title" content="Boots">
            <meta property="og:image" content="https://cdn.example.com/boots.jpg">
        </head></html>"#;

        assert_eq!(
            extract(html).as_deref(),
            Some("https://cdn.example.com/boots.jpg"),
        );
    }

    #[test]
    fn prefers_open_graph_over_twitter() {
        let html = r#"
            <meta name="twitter:image" content="https://cdn.example.com/t.jpg" />
            <META PROPERTY='og:image' CONTENT='https://cdn.example.com/o.jpg' />
        "#;

        assert_eq!(
            extract(html).as_deref(),
            Some("https://cdn.example.com/o.jpg"),
        );
    }

    #[test]
    fn resolves_relative_urls() {
        let html = r#"<meta name="twitter:image" content="/img/42.png?a=1&amp;b=2">"#;
        assert_eq!(
            extract(html).as_deref(),
            Some("https://shop.example.com/img/42.png?a=1&b=2"),
        );

        let html = r#"<meta property="og:image" content="//cdn.example.com/x.png">"#;
        assert_eq!(
            extract(html).as_deref(),
            Some("https://cdn.example.com/x.png"),
        );
    }

    #[test]
    fn falls_back_to_image_src_link() {
        let html = r#"
            <link rel="stylesheet" href="/style.css">
            <link rel="image_src" href="thumb.png">
        "#;

        assert_eq!(
            extract(html).as_deref(),
            Some("https://shop.example.com/items/thumb.png"),
        );
    }

    #[test]
    fn none_without_metadata() {
        assert_eq!(extract("<html><body>Nothing</body></html>"), None);
        assert_eq!(extract(r#"<meta property="og:image" content="">"#), None);
        assert_eq!(
            extract(r#"<meta property="og:image" content="data:image/png;base64,AA">"#),
            None,
        );
    }
}
