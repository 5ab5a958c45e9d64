use crate::domain::{ChatId, UserId};

/// A text event delivered by the messaging platform.
///
/// Telegram-specific fields should live in the Telegram adapter.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub sender: Option<UserId>,
    pub username: Option<String>,
    pub text: String,
}
