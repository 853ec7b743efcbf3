use super::InstagramError;
use crate::{err, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::fmt;

/// Beginnings of an HTML document, compared case-insensitively. Instagram
/// serves its pages with the doctype, but a bare `<html>` is an HTML page
/// just as well.
const HTML_PAGE_PREFIXES: &[&[u8]] = &[b"<!doctype", b"<html"];

/// Part of the URL that the login page points its forms and redirects to
const LOGIN_PATH_MARKER: &[u8] = b"/accounts/login";

/// URL of a publicly viewable post. It always ends with a `/` and carries
/// no query or fragment, so that path segments may be appended to it.
#[derive(Clone, PartialEq, Eq, Hash, derive_more::Display, Deserialize)]
#[serde(try_from = "url::Url")]
pub(crate) struct PostUrl(url::Url);

#[derive(Debug, thiserror::Error)]
#[error("Post URL must be an absolute http(s) URL with a host, but got `{0}`")]
pub(crate) struct InvalidPostUrl(url::Url);

impl TryFrom<url::Url> for PostUrl {
    type Error = InvalidPostUrl;

    fn try_from(mut url: url::Url) -> Result<Self, Self::Error> {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(InvalidPostUrl(url));
        }

        url.set_query(None);
        url.set_fragment(None);

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self(url))
    }
}

impl fmt::Debug for PostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl PostUrl {
    /// URL of the largest available image of the post
    pub(crate) fn media_url(&self) -> url::Url {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .expect("BUG: post URL is validated to have a host, so it has path segments")
            .pop_if_empty()
            .extend(["media", ""]);
        url.set_query(Some("size=l"));
        url
    }
}

/// Raw bytes of an image. It is guaranteed to be non-empty and not an
/// HTML page.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ImageBytes(Bytes);

impl ImageBytes {
    /// Classifies the body returned by the image host
    pub(crate) fn new(post: &PostUrl, body: Bytes) -> Result<Self> {
        let post_url = post.to_string();

        if body.is_empty() {
            return Err(err!(InstagramError::InvalidResponse {
                post_url,
                reason: "the response body is empty",
            }));
        }

        if !is_html_page(&body) {
            return Ok(Self(body));
        }

        if contains(&body, LOGIN_PATH_MARKER) {
            return Err(err!(InstagramError::LoginWall { post_url }));
        }

        Err(err!(InstagramError::InvalidResponse {
            post_url,
            reason: "the response body is an HTML page",
        }))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for ImageBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageBytes({} bytes)", self.0.len())
    }
}

fn is_html_page(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(body.len());

    let body = &body[start..];

    HTML_PAGE_PREFIXES.iter().any(|expected| {
        body.get(..expected.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(expected))
    })
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
