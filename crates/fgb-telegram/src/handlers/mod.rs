//! Telegram update handlers.
//!
//! Every message, whatever its kind, goes through the core pipeline: the
//! text (empty for media) is treated as a candidate share URL.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::error;

use fgb_core::{
    domain::{ChatId, UserId},
    messaging::types::InboundMessage,
    pipeline::handle_inbound,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let inbound = to_inbound(&msg);

    if let Err(e) = handle_inbound(
        &state.gate,
        state.resolver.as_ref(),
        state.messenger.as_ref(),
        inbound,
    )
    .await
    {
        error!("Failed to reply in chat {}: {e}", msg.chat.id.0);
    }

    Ok(())
}

fn to_inbound(msg: &Message) -> InboundMessage {
    let user = msg.from();
    InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        // Ids beyond i64 cannot match the configured owner; treat as anonymous.
        sender: user.and_then(|u| i64::try_from(u.id.0).ok()).map(UserId),
        username: user.and_then(|u| u.username.clone()),
        text: msg.text().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn text_message_maps_sender_and_text() {
        let msg = message(serde_json::json!({
            "message_id": 10,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
            "text": "https://www.fshare.vn/file/ABC123"
        }));

        let inbound = to_inbound(&msg);
        assert_eq!(inbound.chat_id, ChatId(555));
        assert_eq!(inbound.sender, Some(UserId(42)));
        assert_eq!(inbound.username.as_deref(), Some("alice"));
        assert_eq!(inbound.text, "https://www.fshare.vn/file/ABC123");
    }

    #[test]
    fn non_text_message_yields_empty_text() {
        let msg = message(serde_json::json!({
            "message_id": 11,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
            "location": {"longitude": 105.85, "latitude": 21.03}
        }));

        let inbound = to_inbound(&msg);
        assert_eq!(inbound.sender, Some(UserId(42)));
        assert!(inbound.username.is_none());
        assert!(inbound.text.is_empty());
    }

    #[test]
    fn out_of_range_user_id_maps_to_no_sender() {
        let msg = message(serde_json::json!({
            "message_id": 12,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Alice"},
            "from": {"id": u64::MAX, "is_bot": false, "first_name": "Alice"},
            "text": "https://www.fshare.vn/file/ABC123"
        }));

        let inbound = to_inbound(&msg);
        assert_eq!(inbound.sender, None);
        assert_eq!(inbound.text, "https://www.fshare.vn/file/ABC123");
    }
}
