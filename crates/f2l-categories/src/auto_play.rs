//! Auto-play control.

use std::sync::Arc;

use f2l_category::{
    Category, CategoryCore, CategoryError, HandlerTable, Inbound, MethodAvailabilityTable,
    Transport, VersionNegotiable, VersionState, register,
};
use f2l_protocol::{CategoryId, Channel, VersionType};

use crate::messages::auto_play::{
    AutoPlayConfig, AutoPlayOffNotification, AutoPlayOnReply, AutoPlayOnRequest,
    GetAutoPlayConfigReply, GetAutoPlayConfigRequest, IsAutoPlayOnReply, IsAutoPlayOnRequest,
    SetAutoPlayOnReply, SetAutoPlayOnRequest,
};

pub const SUPPORTED_VERSIONS: [VersionType; 2] = [VersionType::new(1, 0), VersionType::new(1, 1)];

const GET_AUTO_PLAY_CONFIG: &str = "GetAutoPlayConfig";

/// What the Logic does when the Foundation turns auto play on or off.
pub trait AutoPlayCallbacks: Send + Sync + 'static {
    /// The Foundation asks to start auto play. Return whether the Logic
    /// agreed; the answer goes back in the reply.
    fn process_auto_play_on_request(&self) -> bool;

    /// Auto play was stopped.
    fn process_auto_play_off(&self);
}

/// The auto play category.
pub struct AutoPlay<T: Transport> {
    core: CategoryCore<T>,
    handlers: HandlerTable<Self>,
    callbacks: Arc<dyn AutoPlayCallbacks>,
}

impl<T: Transport> Category for AutoPlay<T> {
    type Transport = T;

    fn core(&self) -> &CategoryCore<T> {
        &self.core
    }

    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }
}

impl<T: Transport> VersionNegotiable for AutoPlay<T> {
    fn category_id(&self) -> CategoryId {
        self.core.id()
    }

    fn version_state(&self) -> &VersionState {
        self.core.versions()
    }
}

impl<T: Transport> AutoPlay<T> {
    /// Builds the category and registers its inbound routes on `transport`.
    pub fn new(
        transport: Arc<T>,
        callbacks: Arc<dyn AutoPlayCallbacks>,
    ) -> Result<Arc<Self>, CategoryError> {
        let core = CategoryCore::new(
            CategoryId::AutoPlay,
            transport,
            VersionState::negotiable(SUPPORTED_VERSIONS)?,
            MethodAvailabilityTable::new().with(GET_AUTO_PLAY_CONFIG, VersionType::new(1, 1)),
        )?;

        let mut handlers = HandlerTable::new(CategoryId::AutoPlay);
        handlers.add_message_handler(|this: &Self, inbound: Inbound<AutoPlayOnRequest>| {
            let accepted = this.callbacks.process_auto_play_on_request();
            let reply = this.core.create_reply(
                AutoPlayOnReply {
                    accepted,
                    ..Default::default()
                },
                0,
                "",
            );
            this.core.send_reply(inbound.channel, inbound.id, reply)
        })?;
        handlers.add_message_handler(|this: &Self, _: Inbound<AutoPlayOffNotification>| {
            this.callbacks.process_auto_play_off();
            Ok(())
        })?;

        let category = Arc::new(Self {
            core,
            handlers,
            callbacks,
        });
        register(&category)?;
        Ok(category)
    }

    /// Asks the Foundation whether auto play is running.
    pub async fn is_auto_play_on(&self) -> Result<bool, CategoryError> {
        let request = self.core.create_basic_request(IsAutoPlayOnRequest {});
        let reply: IsAutoPlayOnReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.on)
    }

    /// Asks the Foundation to switch auto play. Returns whether it agreed.
    pub async fn set_auto_play_on(&self, on: bool) -> Result<bool, CategoryError> {
        let request = self.core.create_basic_request(SetAutoPlayOnRequest { on });
        let reply: SetAutoPlayOnReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.accepted)
    }

    /// Operator limits for auto play; `None` below 1.1.
    pub async fn get_auto_play_config(&self) -> Result<Option<AutoPlayConfig>, CategoryError> {
        if !self.core.is_method_supported(GET_AUTO_PLAY_CONFIG) {
            tracing::debug!(version = %self.core.version(), "auto play config not available");
            return Ok(None);
        }
        let request = self.core.create_basic_request(GetAutoPlayConfigRequest {});
        let reply: GetAutoPlayConfigReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(Some(reply.config))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use f2l_category::MockTransport;
    use f2l_protocol::PayloadKind;

    use super::*;

    #[derive(Default)]
    struct Switch {
        agree: AtomicBool,
        offs: AtomicU32,
    }

    impl AutoPlayCallbacks for Switch {
        fn process_auto_play_on_request(&self) -> bool {
            self.agree.load(Ordering::SeqCst)
        }

        fn process_auto_play_off(&self) {
            self.offs.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn setup() -> (Arc<MockTransport>, Arc<AutoPlay<MockTransport>>, Arc<Switch>) {
        let transport = MockTransport::new();
        let switch = Arc::new(Switch::default());
        let category = AutoPlay::new(Arc::clone(&transport), switch.clone()).unwrap();
        (transport, category, switch)
    }

    #[tokio::test]
    async fn test_set_auto_play_on_sends_flag_and_returns_accepted() {
        let (transport, category, _) = setup();
        transport.push_reply(&SetAutoPlayOnReply {
            accepted: true,
            ..Default::default()
        });

        assert!(category.set_auto_play_on(true).await.unwrap());
        let sent: SetAutoPlayOnRequest = transport.last_sent_body().unwrap();
        assert!(sent.on);
    }

    #[tokio::test]
    async fn test_is_auto_play_on_reads_reply() {
        let (transport, category, _) = setup();
        transport.push_reply(&IsAutoPlayOnReply {
            on: true,
            ..Default::default()
        });

        assert!(category.is_auto_play_on().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_auto_play_config_gated_at_1_1() {
        let (transport, category, _) = setup();
        category.set_version(1, 0).unwrap();

        assert_eq!(category.get_auto_play_config().await.unwrap(), None);
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_get_auto_play_config_at_1_1_returns_config() {
        let (transport, category, _) = setup();
        category.set_version(1, 1).unwrap();
        let config = AutoPlayConfig {
            max_games: 50,
            stop_on_feature: true,
        };
        transport.push_reply(&GetAutoPlayConfigReply {
            config,
            ..Default::default()
        });

        assert_eq!(category.get_auto_play_config().await.unwrap(), Some(config));
    }

    #[test]
    fn test_auto_play_on_request_replies_with_callback_answer() {
        let (transport, _category, switch) = setup();
        switch.agree.store(true, Ordering::SeqCst);
        let request =
            transport.inbound(CategoryId::AutoPlay, PayloadKind::Request, &AutoPlayOnRequest {});

        transport.deliver(&request).unwrap();

        let (_, reply) = transport.last_sent().unwrap();
        assert_eq!(reply.in_reply_to, Some(request.id));
        let body: AutoPlayOnReply = transport.last_sent_body().unwrap();
        assert!(body.accepted);
        assert!(body.status.is_ok());
    }

    #[test]
    fn test_auto_play_off_notification_reaches_callback() {
        let (transport, _category, switch) = setup();

        transport
            .deliver(&transport.inbound(
                CategoryId::AutoPlay,
                PayloadKind::Notification,
                &AutoPlayOffNotification {},
            ))
            .unwrap();

        assert_eq!(switch.offs.load(Ordering::SeqCst), 1);
    }
}
