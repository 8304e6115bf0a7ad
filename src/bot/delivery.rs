//! Delivery policy for resolved media
//!
//! Media is partitioned by kind and each kind takes its own transfer
//! path: photos go out as one URL-referenced media group, animated
//! images as individual URL-referenced animations, and videos through
//! one of three size tiers (by reference, buffered re-upload, or a
//! plain link when nothing else fits). Failures are per item; one
//! broken video never aborts its siblings.

use crate::config::{MAX_FILESIZE_DOWNLOAD, MAX_FILESIZE_UPLOAD};
use crate::twitter::{MediaItem, MediaKind};
use anyhow::Result;
use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaDocument, ReplyParameters};
use tracing::warn;

/// How a single media item ended up being transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Sent as a URL; Telegram fetched the content itself
    ByReference,
    /// Buffered locally and re-uploaded as an attachment
    Uploaded,
    /// Too large to transfer; the chat got the direct link instead
    AsLink,
    /// Nothing reached the chat for this item
    Failed,
}

impl DeliveryOutcome {
    /// Whether the chat received something usable for this item
    #[must_use]
    pub fn is_delivered(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Deliver every media item into the chat `msg` came from, returning
/// one outcome per item.
///
/// Photos are handled first. A tweet carries either animated images or
/// videos, not both; if both somehow show up, animated wins.
pub async fn deliver_media(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    media: Vec<MediaItem>,
) -> Vec<DeliveryOutcome> {
    let (photos, animated, videos) = partition(media);

    let mut outcomes = Vec::new();
    if !photos.is_empty() {
        outcomes.extend(deliver_photos(bot, http, msg, &photos).await);
    }
    if !animated.is_empty() {
        for item in &animated {
            outcomes.push(deliver_animated(bot, msg, item).await);
        }
    } else {
        for item in &videos {
            outcomes.push(deliver_video(bot, http, msg, item).await);
        }
    }
    outcomes
}

/// Split media into (photos, animated, videos) preserving order
fn partition(media: Vec<MediaItem>) -> (Vec<MediaItem>, Vec<MediaItem>, Vec<MediaItem>) {
    let mut photos = Vec::new();
    let mut animated = Vec::new();
    let mut videos = Vec::new();
    for item in media {
        match item.kind {
            MediaKind::Photo => photos.push(item),
            MediaKind::Animated => animated.push(item),
            MediaKind::Video => videos.push(item),
        }
    }
    (photos, animated, videos)
}

/// Send all photos as one reply-quoted media group of URL-referenced
/// documents, upgrading each to its best-quality variant when the CDN
/// has one.
async fn deliver_photos(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    photos: &[MediaItem],
) -> Vec<DeliveryOutcome> {
    let mut outcomes = vec![DeliveryOutcome::Failed; photos.len()];
    let mut group = Vec::with_capacity(photos.len());
    let mut grouped = Vec::with_capacity(photos.len());

    for (index, photo) in photos.iter().enumerate() {
        let Ok(original) = Url::parse(&photo.url) else {
            warn!(url = %photo.url, "skipping photo with unparsable url");
            continue;
        };
        let upgraded = best_quality_url(&original);
        let chosen = if probe_exists(http, &upgraded).await {
            upgraded
        } else {
            original
        };
        group.push(InputMedia::Document(InputMediaDocument::new(
            InputFile::url(chosen),
        )));
        grouped.push(index);
    }

    if group.is_empty() {
        return outcomes;
    }

    match bot
        .send_media_group(msg.chat.id, group)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
    {
        Ok(_) => {
            for index in grouped {
                outcomes[index] = DeliveryOutcome::ByReference;
            }
        }
        Err(err) => {
            warn!(error = %err, "failed to send photo group");
        }
    }
    outcomes
}

/// Rewrite a CDN photo URL to request the original-quality variant
fn best_quality_url(original: &Url) -> Url {
    let mut upgraded = original.clone();
    upgraded.set_query(Some("format=jpg&name=orig"));
    upgraded
}

/// Lightweight existence check for an upgraded photo URL
async fn probe_exists(http: &reqwest::Client, url: &Url) -> bool {
    match http.head(url.clone()).send().await {
        Ok(response) => response.status().is_success(),
        Err(err) => {
            warn!(url = %url, error = %err, "photo variant probe failed");
            false
        }
    }
}

/// Send one animated image by reference
async fn deliver_animated(bot: &Bot, msg: &Message, item: &MediaItem) -> DeliveryOutcome {
    let Ok(url) = Url::parse(&item.url) else {
        warn!(url = %item.url, "skipping animation with unparsable url");
        return DeliveryOutcome::Failed;
    };
    match bot
        .send_animation(msg.chat.id, InputFile::url(url))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
    {
        Ok(_) => DeliveryOutcome::ByReference,
        Err(err) => {
            warn!(url = %item.url, error = %err, "failed to send animation");
            DeliveryOutcome::Failed
        }
    }
}

/// Send one video through the size-tier policy; on any failure the chat
/// gets the direct source link as a fallback.
async fn deliver_video(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    item: &MediaItem,
) -> DeliveryOutcome {
    match try_deliver_video(bot, http, msg, &item.url).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(url = %item.url, error = %err, "video delivery failed");
            let fallback = format!("Error sending video. Direct link:\n{}", item.url);
            if let Err(send_err) = bot
                .send_message(msg.chat.id, fallback)
                .reply_parameters(ReplyParameters::new(msg.id))
                .await
            {
                warn!(error = %send_err, "failed to send video fallback message");
            }
            DeliveryOutcome::Failed
        }
    }
}

async fn try_deliver_video(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    raw_url: &str,
) -> Result<DeliveryOutcome> {
    let url = Url::parse(raw_url)?;

    // An upstream that declares no length is assumed small enough for a
    // by-reference send; Telegram re-checks when it fetches the URL.
    let size = probe_content_length(http, &url).await?.unwrap_or(0);

    if size <= MAX_FILESIZE_DOWNLOAD {
        bot.send_video(msg.chat.id, InputFile::url(url))
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        Ok(DeliveryOutcome::ByReference)
    } else if size <= MAX_FILESIZE_UPLOAD {
        upload_buffered(bot, http, msg, &url).await?;
        Ok(DeliveryOutcome::Uploaded)
    } else {
        bot.send_message(msg.chat.id, format!("Too large. Direct link:\n{raw_url}"))
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        Ok(DeliveryOutcome::AsLink)
    }
}

/// Read the declared `Content-Length` of `url` via a HEAD request
async fn probe_content_length(http: &reqwest::Client, url: &Url) -> Result<Option<u64>> {
    let response = http.head(url.clone()).send().await?.error_for_status()?;
    Ok(response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok()))
}

/// Tier-2 path: announce the upload, stream the content into a buffer,
/// re-upload it as a streamable video. The interim notice is removed on
/// both the success and the failure path.
async fn upload_buffered(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    url: &Url,
) -> Result<()> {
    let notice = bot
        .send_message(msg.chat.id, "Uploading large video...")
        .await?;

    let sent = buffer_and_send(bot, http, msg, url).await;

    if let Err(err) = bot.delete_message(msg.chat.id, notice.id).await {
        warn!(error = %err, "failed to remove upload notice");
    }
    sent
}

async fn buffer_and_send(
    bot: &Bot,
    http: &reqwest::Client,
    msg: &Message,
    url: &Url,
) -> Result<()> {
    let response = http.get(url.clone()).send().await?.error_for_status()?;

    // The buffer is bounded by the tier-2 cutoff checked before this
    // path is entered; it is freed on every exit by ownership.
    let mut buffer = BytesMut::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }

    let video = InputFile::memory(buffer.freeze()).file_name("video.mp4");
    bot.send_video(msg.chat.id, video)
        .reply_parameters(ReplyParameters::new(msg.id))
        .supports_streaming(true)
        .await?;
    Ok(())
}
