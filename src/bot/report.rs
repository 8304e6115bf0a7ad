//! Operator-facing error reporting
//!
//! Errors that escape a handler are logged, shipped to the operator
//! chat as an `error_report.txt` document and acknowledged to the
//! originating chat with a short error line.

use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::{ApiError, RequestError};
use tracing::{error, warn};

/// Frontend errors that are expected operational noise: the user
/// revoked the bot's access, or another poller grabbed the update
/// stream. Neither is worth an operator report.
fn is_operational_noise(err: &RequestError) -> bool {
    matches!(
        err,
        RequestError::Api(ApiError::BotBlocked | ApiError::TerminatedByOtherGetUpdates)
    )
}

/// Report an error that escaped a handler.
///
/// Best-effort on every step: a reporting failure is logged, never
/// propagated.
pub async fn report_unhandled(
    bot: &Bot,
    developer_chat_id: i64,
    msg: Option<&Message>,
    err: &anyhow::Error,
) {
    if let Some(request_err) = err.downcast_ref::<RequestError>() {
        if is_operational_noise(request_err) {
            return;
        }
    }

    error!("Unhandled error in update handling: {err:#}");

    let context = msg
        .and_then(|m| serde_json::to_string_pretty(m).ok())
        .unwrap_or_else(|| "<no message context>".to_string());
    let report = format!("#error_report\nmessage = {context}\n\n{err:?}");

    let document = InputFile::memory(report.into_bytes()).file_name("error_report.txt");
    if let Err(send_err) = bot
        .send_document(ChatId(developer_chat_id), document)
        .caption("Exception in runtime")
        .await
    {
        error!(error = %send_err, "failed to deliver error report to operator");
    }

    if let Some(m) = msg {
        if let Err(send_err) = bot.send_message(m.chat.id, format!("Error\n{err}")).await {
            warn!(error = %send_err, "failed to notify chat about error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_classification() {
        assert!(is_operational_noise(&RequestError::Api(
            ApiError::BotBlocked
        )));
        assert!(is_operational_noise(&RequestError::Api(
            ApiError::TerminatedByOtherGetUpdates
        )));
        assert!(!is_operational_noise(&RequestError::Api(
            ApiError::MessageNotModified
        )));
    }
}
