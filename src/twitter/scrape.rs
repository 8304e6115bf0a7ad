//! Media metadata lookup against the vxtwitter API
//!
//! The upstream endpoint normally answers with JSON, but for some
//! failure cases (deleted or private tweets) it renders an HTML error
//! page instead. The human-readable message then lives in an
//! `og:description` meta tag.

#![allow(clippy::non_std_lazy_statics)]

use super::{MediaItem, MediaKind};
use lazy_regex::lazy_regex;
use serde::Deserialize;
use thiserror::Error;

/// Match the error message embedded in upstream HTML error pages
static RE_OG_DESCRIPTION: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r#"<meta content="(.*?)" property="og:description" />"#);

/// Failure modes of a metadata lookup
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The endpoint answered with a non-success HTTP status
    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// The endpoint reported a structured error (deleted tweet, ...)
    #[error("API error: {0}")]
    Api(String),
    /// The request itself failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The response body was neither the expected JSON nor a
    /// recognizable error page
    #[error("unexpected response body: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    media_extended: Vec<RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

/// Fetch and classify the media attached to a tweet.
///
/// An absent or empty media list yields `Ok(vec![])`; records whose
/// `type` is unrecognized are dropped silently.
///
/// # Errors
///
/// See [`ScrapeError`].
pub async fn scrape_media(
    http: &reqwest::Client,
    base_url: &str,
    tweet_id: u64,
) -> Result<Vec<MediaItem>, ScrapeError> {
    let url = format!("{base_url}/Twitter/status/{tweet_id}");
    let response = http.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status(status));
    }

    let body = response.text().await?;
    parse_media_payload(&body)
}

/// Parse the response body into classified media items.
fn parse_media_payload(body: &str) -> Result<Vec<MediaItem>, ScrapeError> {
    let payload: StatusPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(json_err) => {
            if let Some(message) = og_description(body) {
                return Err(ScrapeError::Api(message));
            }
            return Err(ScrapeError::Body(json_err));
        }
    };

    Ok(payload
        .media_extended
        .into_iter()
        .filter_map(|media| {
            MediaKind::from_api(&media.kind).map(|kind| MediaItem {
                kind,
                url: media.url,
            })
        })
        .collect())
}

/// Pull the entity-decoded `og:description` text out of an HTML body.
fn og_description(body: &str) -> Option<String> {
    let caps = RE_OG_DESCRIPTION.captures(body)?;
    let raw = caps.get(1)?.as_str();
    Some(html_escape::decode_html_entities(raw).into_owned())
}
