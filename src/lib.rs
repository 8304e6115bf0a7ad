//! tweetgrab — a Telegram bot that mirrors media from Twitter/X links.
//!
//! The bot scans incoming messages for tweet links (including `t.co`
//! shortlinks), resolves the referenced posts through the vxtwitter
//! metadata API and re-posts the media back into the chat, picking the
//! transfer path that fits Telegram's upload size tiers.

/// Telegram bot handlers and media delivery
pub mod bot;
/// Configuration management
pub mod config;
/// TCP liveness responder for hosting-platform probes
pub mod health;
/// Process-wide usage counters
pub mod stats;
/// Tweet link extraction and media resolution
pub mod twitter;
