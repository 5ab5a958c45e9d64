use tracing::warn;

use crate::{domain::UserId, messaging::types::InboundMessage};

/// Fixed reply for anyone who is not the configured owner.
pub const UNAUTHORIZED_REPLY: &str = "🚫 You are not authorized to use this bot.";

// ============== Authorization ==============

pub fn is_authorized(user_id: Option<UserId>, authorized: UserId) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    user_id == authorized
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Permit,
    Reject,
}

/// Single-owner gate evaluated before any network activity.
#[derive(Clone, Copy, Debug)]
pub struct AuthorizationGate {
    authorized: UserId,
}

impl AuthorizationGate {
    pub fn new(authorized: UserId) -> Self {
        Self { authorized }
    }

    pub fn check(&self, msg: &InboundMessage) -> GateDecision {
        if is_authorized(msg.sender, self.authorized) {
            return GateDecision::Permit;
        }
        match msg.sender {
            Some(UserId(id)) => warn!("Unauthorized access attempt from user ID: {id}"),
            None => warn!("Unauthorized access attempt from an anonymous sender"),
        }
        GateDecision::Reject
    }
}
