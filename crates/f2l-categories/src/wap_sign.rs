//! Wide-area progressive sign. Talks on the Game channel.

use std::sync::Arc;

use f2l_category::{
    Category, CategoryCore, CategoryError, HandlerTable, MethodAvailabilityTable, Transport,
    VersionState, register,
};
use f2l_protocol::{CategoryId, Channel, VersionType};

use crate::messages::wap_sign::{
    GetSignStateReply, GetSignStateRequest, SetSignTextNotification, SignState,
};

pub const VERSION: VersionType = VersionType::new(1, 0);

/// The WAP sign category. Outbound only.
pub struct WapSign<T: Transport> {
    core: CategoryCore<T>,
    handlers: HandlerTable<Self>,
}

impl<T: Transport> Category for WapSign<T> {
    type Transport = T;

    fn core(&self) -> &CategoryCore<T> {
        &self.core
    }

    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }
}

impl<T: Transport> WapSign<T> {
    /// Builds the category. It registers no inbound routes.
    pub fn new(transport: Arc<T>) -> Result<Arc<Self>, CategoryError> {
        let core = CategoryCore::new(
            CategoryId::WapSign,
            transport,
            VersionState::fixed(VERSION),
            MethodAvailabilityTable::new(),
        )?;
        let category = Arc::new(Self {
            core,
            handlers: HandlerTable::new(CategoryId::WapSign),
        });
        register(&category)?;
        Ok(category)
    }

    /// Puts `text` on the sign.
    pub fn set_sign_text(&self, text: impl Into<String>) -> Result<(), CategoryError> {
        let notification = self
            .core
            .create_notification(SetSignTextNotification { text: text.into() });
        self.core.send_message(Channel::Game, notification)
    }

    /// Reads back what the sign shows and whether it is online.
    pub async fn get_sign_state(&self) -> Result<SignState, CategoryError> {
        let request = self.core.create_basic_request(GetSignStateRequest {});
        let reply: GetSignStateReply = self
            .core
            .send_message_and_get_reply(Channel::Game, request)
            .await?;
        Ok(reply.state)
    }
}

#[cfg(test)]
mod tests {
    use f2l_category::MockTransport;
    use f2l_protocol::PayloadKind;

    use super::*;

    #[test]
    fn test_set_sign_text_sends_notification_on_game_channel() {
        let transport = MockTransport::new();
        let sign = WapSign::new(Arc::clone(&transport)).unwrap();

        sign.set_sign_text("JACKPOT $1,234").unwrap();

        let (channel, frame) = transport.last_sent().unwrap();
        assert_eq!(channel, Channel::Game);
        assert_eq!(frame.kind, PayloadKind::Notification);
        let body: SetSignTextNotification = transport.last_sent_body().unwrap();
        assert_eq!(body.text, "JACKPOT $1,234");
    }

    #[tokio::test]
    async fn test_get_sign_state_returns_state() {
        let transport = MockTransport::new();
        let sign = WapSign::new(Arc::clone(&transport)).unwrap();
        let state = SignState {
            text: "hello".into(),
            online: true,
        };
        transport.push_reply(&GetSignStateReply {
            state: state.clone(),
            ..Default::default()
        });

        assert_eq!(sign.get_sign_state().await.unwrap(), state);
        let (channel, _) = transport.last_sent().unwrap();
        assert_eq!(channel, Channel::Game);
    }

    #[test]
    fn test_has_no_inbound_routes() {
        let transport = MockTransport::new();
        let sign = WapSign::new(Arc::clone(&transport)).unwrap();
        assert!(sign.handlers().is_empty());
        assert!(!transport.has_route(CategoryId::WapSign, "SetSignTextNotification"));
    }
}
