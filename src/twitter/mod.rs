//! Tweet link extraction and media resolution

/// Tweet id extraction from free text
pub mod extract;
/// Media metadata lookup against the vxtwitter API
pub mod scrape;

pub use extract::extract_tweet_ids;
pub use scrape::{scrape_media, ScrapeError};

/// Kind of a resolved media attachment.
///
/// The upstream API reports the kind as a free-form string; anything it
/// may grow beyond these three is dropped during classification instead
/// of being carried around untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image
    Photo,
    /// Animated image (GIF-style clip without sound)
    Animated,
    /// Video
    Video,
}

impl MediaKind {
    /// Map the upstream `type` field onto a kind, `None` for anything
    /// unrecognized.
    pub(crate) fn from_api(kind: &str) -> Option<Self> {
        match kind {
            "image" => Some(Self::Photo),
            "gif" => Some(Self::Animated),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// One classified media attachment of a tweet. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Classified kind
    pub kind: MediaKind,
    /// Source URL on the upstream CDN
    pub url: String,
}
