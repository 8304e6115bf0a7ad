//! Tweet id extraction from free text
//!
//! Regex patterns are compile-time validated via the `lazy_regex!`
//! macro.

#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;
use std::collections::HashSet;
use tracing::warn;

/// Match `t.co` shortlinks embedded in message text
static RE_SHORTLINK: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"t\.co/[A-Za-z0-9]+");

/// Match status URLs on the known tweet hosts. The id segment is 1-20
/// digits; ids routinely exceed the 32-bit range.
static RE_STATUS: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"(?:twitter|x)\.com/[^\s/]{1,15}/(?:web/)?status(?:es)?/([0-9]{1,20})");

/// Extract tweet ids from `text`, resolving `t.co` shortlinks first.
///
/// Shortlinks are expanded by following redirects; a shortlink that
/// fails to resolve is dropped without affecting ids found verbatim in
/// the text. Returns ids deduplicated in first-seen order; empty when
/// nothing matched.
pub async fn extract_tweet_ids(http: &reqwest::Client, text: &str) -> Vec<u64> {
    let mut haystack = text.to_string();
    for link in RE_SHORTLINK.find_iter(text) {
        if let Some(resolved) = unshorten(http, link.as_str()).await {
            haystack.push('\n');
            haystack.push_str(&resolved);
        }
    }
    match_tweet_ids(&haystack)
}

/// Follow the shortlink's redirect chain and return the final URL.
async fn unshorten(http: &reqwest::Client, link: &str) -> Option<String> {
    let url = format!("https://{link}");
    match http.get(&url).send().await {
        Ok(response) => Some(response.url().to_string()),
        Err(err) => {
            warn!(link = %link, error = %err, "failed to resolve shortened link");
            None
        }
    }
}

/// Match status ids verbatim in `text`, deduplicated in first-seen
/// order.
pub fn match_tweet_ids(text: &str) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for caps in RE_STATUS.captures_iter(text) {
        let Some(digits) = caps.get(1) else { continue };
        let Ok(id) = digits.as_str().parse::<u64>() else {
            continue;
        };
        if seen.insert(id) {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_match_plain_status_link() {
        let ids = match_tweet_ids("look https://twitter.com/user/status/1234567890123456789 wow");
        assert_eq!(ids, vec![1_234_567_890_123_456_789]);
    }

    #[test]
    fn test_match_known_hosts_and_path_forms() {
        let text = "https://x.com/user/status/111 \
                    https://twitter.com/other/statuses/222 \
                    https://twitter.com/i/web/status/333";
        assert_eq!(match_tweet_ids(text), vec![111, 222, 333]);
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let text = "x.com/a/status/2 x.com/b/status/1 x.com/c/status/2 x.com/d/status/3";
        assert_eq!(match_tweet_ids(text), vec![2, 1, 3]);
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert!(match_tweet_ids("no links here").is_empty());
        assert!(match_tweet_ids("https://example.com/user/status/123").is_empty());
        assert!(match_tweet_ids("x.com/user/status/").is_empty());
    }

    #[test]
    fn test_shortlink_candidates() {
        let found: Vec<_> = RE_SHORTLINK
            .find_iter("see t.co/AbC123 and t.co/xyz")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["t.co/AbC123", "t.co/xyz"]);
    }

    #[tokio::test]
    async fn test_unresolvable_shortlink_keeps_verbatim_ids() {
        // A client with a near-zero timeout makes the shortlink lookup
        // fail regardless of network availability.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(1))
            .build()
            .expect("build http client");

        let text = "t.co/deadbeef and https://x.com/user/status/4242";
        let ids = extract_tweet_ids(&http, text).await;
        assert_eq!(ids, vec![4242]);
    }
}
