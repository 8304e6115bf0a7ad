//! Command and message handlers

use crate::bot::delivery;
use crate::config::Settings;
use crate::stats::Stats;
use crate::twitter;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

/// Commands understood by the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start the bot.")]
    Start,
    #[command(description = "how to use the bot.")]
    Help,
    #[command(description = "show usage counters.")]
    Stats,
    #[command(description = "reset usage counters.")]
    ResetStats,
}

/// Greet the user and explain what to send
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: &Bot, msg: &Message) -> Result<()> {
    let name = msg
        .from
        .as_ref()
        .map_or("there", |user| user.first_name.as_str());
    let text = format!(
        "Hi <b>{}</b>!\nSend a tweet link to download its media.",
        html_escape::encode_text(name)
    );
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// One-line usage help
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn help(bot: &Bot, msg: &Message) -> Result<()> {
    bot.send_message(
        msg.chat.id,
        "Send a tweet link to download its media in best quality.",
    )
    .await?;
    Ok(())
}

/// Render the usage counters
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn stats(bot: &Bot, msg: &Message, stats: &Stats) -> Result<()> {
    let (messages, media) = stats.snapshot();
    bot.send_message(
        msg.chat.id,
        format!("Stats:\nMessages handled: {messages}\nMedia delivered: {media}"),
    )
    .await?;
    Ok(())
}

/// Zero the usage counters
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn reset_stats(bot: &Bot, msg: &Message, stats: &Stats) -> Result<()> {
    stats.reset();
    bot.send_message(msg.chat.id, "Stats reset.").await?;
    Ok(())
}

/// Fallback for slash-commands the bot does not know
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn unknown_command(bot: &Bot, msg: &Message) -> Result<()> {
    bot.send_message(msg.chat.id, "Unknown command. Send /help to see what I can do.")
        .await?;
    Ok(())
}

/// Run the media pipeline for one plain-text message: extract tweet
/// ids, resolve each and deliver whatever media comes back.
///
/// Identifiers are processed strictly in extraction order; an error on
/// one tweet is reported inline and does not stop the rest.
///
/// # Errors
///
/// Returns an error only when a user-facing reply itself cannot be
/// sent; per-tweet and per-item failures are handled in place.
pub async fn handle_message(
    bot: &Bot,
    msg: &Message,
    http: &reqwest::Client,
    stats: &Stats,
    settings: &Settings,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    stats.inc_messages();

    let tweet_ids = twitter::extract_tweet_ids(http, text).await;
    if tweet_ids.is_empty() {
        bot.send_message(msg.chat.id, "No tweet ID found.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    for tweet_id in tweet_ids {
        match twitter::scrape_media(http, &settings.api_base_url, tweet_id).await {
            Ok(media) => {
                let outcomes = delivery::deliver_media(bot, http, msg, media).await;
                let delivered = outcomes
                    .iter()
                    .filter(|outcome| outcome.is_delivered())
                    .count() as u64;
                stats.add_media(delivered);
                info!(tweet_id, delivered, total = outcomes.len(), "handled tweet");

                if outcomes.is_empty() {
                    bot.send_message(msg.chat.id, "No supported media found.")
                        .reply_parameters(ReplyParameters::new(msg.id))
                        .await?;
                }
            }
            Err(err) => {
                warn!(tweet_id, error = %err, "failed to resolve tweet");
                bot.send_message(msg.chat.id, format!("Error processing tweet {tweet_id}: {err}"))
                    .reply_parameters(ReplyParameters::new(msg.id))
                    .await?;
            }
        }
    }
    Ok(())
}
