//! Per-message flow: authorization gate → link resolver → reply.

use tracing::{error, info};

use crate::{
    formatting::{escape_html, format_direct_link},
    messaging::{port::MessagingPort, types::InboundMessage},
    resolver::LinkResolver,
    security::{AuthorizationGate, GateDecision, UNAUTHORIZED_REPLY},
    Result,
};

/// Handle one inbound message end to end.
///
/// Only reply delivery failures are returned; resolution failures become a
/// user-facing reply.
pub async fn handle_inbound(
    gate: &AuthorizationGate,
    resolver: &dyn LinkResolver,
    messenger: &dyn MessagingPort,
    msg: InboundMessage,
) -> Result<()> {
    if gate.check(&msg) == GateDecision::Reject {
        messenger.send_text(msg.chat_id, UNAUTHORIZED_REPLY).await?;
        return Ok(());
    }

    let user_id = msg.sender.map(|u| u.0).unwrap_or_default();
    info!("📥 Received message from {user_id}: {}", msg.text);

    match resolver.resolve(msg.text.trim()).await {
        Ok(link) => {
            messenger
                .send_html(msg.chat_id, &format_direct_link(&link))
                .await?;
            info!("✅ Direct link sent: {}", link.url);
        }
        Err(e) => {
            let reply = e.to_string();
            messenger
                .send_html(msg.chat_id, &escape_html(&reply))
                .await?;
            error!("❌ Error: {reply}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{ChatId, MessageId, MessageRef, ResolvedLink, UserId},
        errors::{Error, ResolutionError},
    };

    const OWNER: i64 = 42;

    struct FakeResolver {
        calls: AtomicUsize,
        outcome: std::result::Result<ResolvedLink, ResolutionError>,
    }

    impl FakeResolver {
        fn new(outcome: std::result::Result<ResolvedLink, ResolutionError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LinkResolver for FakeResolver {
        async fn resolve(
            &self,
            _raw_url: &str,
        ) -> std::result::Result<ResolvedLink, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        fail: bool,
        sent: Mutex<Vec<(ChatId, String)>>,
    }

    impl FakeMessenger {
        fn sent(&self) -> Vec<(ChatId, String)> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, chat_id: ChatId, body: &str) -> Result<MessageRef> {
            if self.fail {
                return Err(Error::External("telegram error: blocked".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id, body.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(sent.len() as i32),
            })
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            self.record(chat_id, html)
        }

        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
            self.record(chat_id, text)
        }
    }

    fn msg(sender: Option<i64>, text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: ChatId(1000),
            sender: sender.map(UserId),
            username: Some("someone".to_string()),
            text: text.to_string(),
        }
    }

    fn link() -> ResolvedLink {
        ResolvedLink {
            url: "https://cdn.example.com/My%20File.mp4".to_string(),
            filename: "My_File.mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn strangers_get_fixed_rejection_and_resolver_is_not_called() {
        let gate = AuthorizationGate::new(UserId(OWNER));
        let resolver = FakeResolver::new(Ok(link()));
        let messenger = FakeMessenger::default();

        for sender in [Some(1), Some(OWNER + 1), Some(-OWNER), None] {
            handle_inbound(
                &gate,
                &resolver,
                &messenger,
                msg(sender, "https://www.fshare.vn/file/ABC123"),
            )
            .await
            .unwrap();
        }

        assert_eq!(resolver.calls(), 0);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 4);
        assert!(sent
            .iter()
            .all(|(chat, body)| *chat == ChatId(1000) && body == UNAUTHORIZED_REPLY));
    }

    #[tokio::test]
    async fn owner_gets_direct_link_in_code_span() {
        let gate = AuthorizationGate::new(UserId(OWNER));
        let resolver = FakeResolver::new(Ok(link()));
        let messenger = FakeMessenger::default();

        handle_inbound(
            &gate,
            &resolver,
            &messenger,
            msg(Some(OWNER), "  https://www.fshare.vn/file/ABC123 \n"),
        )
        .await
        .unwrap();

        assert_eq!(resolver.calls(), 1);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .1
            .contains("<code>https://cdn.example.com/My%20File.mp4</code>"));
    }

    #[tokio::test]
    async fn resolution_errors_are_reported_verbatim() {
        for (err, expected) in [
            (ResolutionError::InvalidUrl, "❌ Invalid Fshare URL!"),
            (ResolutionError::LoginFailed, "❌ Login failed!"),
            (
                ResolutionError::LinkUnavailable,
                "❌ Failed to get download link!",
            ),
        ] {
            let gate = AuthorizationGate::new(UserId(OWNER));
            let resolver = FakeResolver::new(Err(err));
            let messenger = FakeMessenger::default();

            handle_inbound(&gate, &resolver, &messenger, msg(Some(OWNER), "whatever"))
                .await
                .unwrap();

            assert_eq!(messenger.sent(), vec![(ChatId(1000), expected.to_string())]);
        }
    }

    #[tokio::test]
    async fn reply_failures_surface_to_the_adapter() {
        let gate = AuthorizationGate::new(UserId(OWNER));
        let resolver = FakeResolver::new(Ok(link()));
        let messenger = FakeMessenger {
            fail: true,
            ..Default::default()
        };

        let err = handle_inbound(
            &gate,
            &resolver,
            &messenger,
            msg(Some(OWNER), "https://www.fshare.vn/file/ABC123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }
}
