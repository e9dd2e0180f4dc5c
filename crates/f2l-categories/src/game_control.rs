//! Betting and the game cycle.
//!
//! A game cycle, as driven by the Logic:
//!
//! ```text
//! commit_bet ─→ enroll_game_cycle ─→ start_playing ─→ adjust_outcome
//!                                                          │
//!              end_game_cycle ←── finalize_outcome ←───────┘
//! ```
//!
//! Every request is transactional: it carries the token of the
//! transaction in force when it was built.

use std::sync::Arc;

use f2l_category::{
    Category, CategoryCore, CategoryError, HandlerTable, Inbound, MethodAvailabilityTable,
    Transactional, Transport, VersionNegotiable, VersionState, register,
};
use f2l_protocol::{CategoryId, Channel, VersionType};

use crate::messages::game_control::{
    AdjustOutcomeReply, AdjustOutcomeRequest, BetCommittedNotification, ChangeCultureReply,
    ChangeCultureRequest, CommitBetReply, CommitBetRequest, EndGameCycleReply,
    EndGameCycleRequest, EnrollGameCycleReply, EnrollGameCycleRequest, EnrollResponseNotification,
    EnrollResult, FinalizeOutcomeReply, FinalizeOutcomeRequest, GameProgressNotification,
    GetDenominationMenuReply, GetDenominationMenuRequest, Outcome, OutcomeAdjustment,
    OutcomeResponseNotification, StartPlayingReply, StartPlayingRequest,
};
use crate::reply_code;

/// Versions this implementation can run at.
pub const SUPPORTED_VERSIONS: [VersionType; 2] = [VersionType::new(1, 0), VersionType::new(1, 1)];

const GET_DENOMINATION_MENU: &str = "GetDenominationMenu";
const REPORT_GAME_PROGRESS: &str = "ReportGameProgress";

/// What the Logic does when the Foundation talks to game control.
pub trait GameControlCallbacks: Send + Sync + 'static {
    /// The player-facing language changed. Returning `Err` rejects the
    /// change; the reason goes back to the Foundation.
    fn process_culture_change(&self, culture: &str) -> Result<(), String>;

    /// A bet was committed outside of `commit_bet` (e.g. by a button panel).
    fn process_bet_committed(&self, _notification: &BetCommittedNotification) {}

    /// Final answer to an enrollment that was accepted as pending.
    fn process_enroll_response(&self, _notification: &EnrollResponseNotification) {}

    /// Final answer to an outcome adjustment.
    fn process_outcome_response(&self, _notification: &OutcomeResponseNotification) {}
}

/// The game control category.
pub struct GameControl<T: Transport> {
    core: CategoryCore<T>,
    handlers: HandlerTable<Self>,
    callbacks: Arc<dyn GameControlCallbacks>,
}

impl<T: Transport> Category for GameControl<T> {
    type Transport = T;

    fn core(&self) -> &CategoryCore<T> {
        &self.core
    }

    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }
}

impl<T: Transport> Transactional for GameControl<T> {}

impl<T: Transport> VersionNegotiable for GameControl<T> {
    fn category_id(&self) -> CategoryId {
        self.core.id()
    }

    fn version_state(&self) -> &VersionState {
        self.core.versions()
    }
}

impl<T: Transport> GameControl<T> {
    /// Builds the category and registers its inbound routes on `transport`.
    pub fn new(
        transport: Arc<T>,
        callbacks: Arc<dyn GameControlCallbacks>,
    ) -> Result<Arc<Self>, CategoryError> {
        let core = CategoryCore::new(
            CategoryId::GameControl,
            transport,
            VersionState::negotiable(SUPPORTED_VERSIONS)?,
            MethodAvailabilityTable::new()
                .with(GET_DENOMINATION_MENU, VersionType::new(1, 1))
                .with(REPORT_GAME_PROGRESS, VersionType::new(1, 1)),
        )?;

        let mut handlers = HandlerTable::new(CategoryId::GameControl);
        handlers.add_message_handler(|this: &Self, inbound: Inbound<ChangeCultureRequest>| {
            let result = this
                .callbacks
                .process_culture_change(&inbound.message.culture);
            let (code, reason) = reply_code(result);
            let reply = this
                .core
                .create_reply(ChangeCultureReply::default(), code, &reason);
            this.core.send_reply(inbound.channel, inbound.id, reply)
        })?;
        handlers.add_message_handler(|this: &Self, inbound: Inbound<BetCommittedNotification>| {
            this.callbacks.process_bet_committed(&inbound.message);
            Ok(())
        })?;
        handlers.add_message_handler(
            |this: &Self, inbound: Inbound<EnrollResponseNotification>| {
                this.callbacks.process_enroll_response(&inbound.message);
                Ok(())
            },
        )?;
        handlers.add_message_handler(
            |this: &Self, inbound: Inbound<OutcomeResponseNotification>| {
                this.callbacks.process_outcome_response(&inbound.message);
                Ok(())
            },
        )?;

        let category = Arc::new(Self {
            core,
            handlers,
            callbacks,
        });
        register(&category)?;
        Ok(category)
    }

    /// Commits `bet` credits at `denomination`. Returns whether the
    /// Foundation accepted the bet.
    pub async fn commit_bet(&self, bet: u64, denomination: u32) -> Result<bool, CategoryError> {
        let request = self.create_transactional_request(CommitBetRequest {
            bet,
            denomination,
            ..Default::default()
        });
        let reply: CommitBetReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.committed)
    }

    /// Asks the Foundation to start a game cycle.
    pub async fn enroll_game_cycle(&self) -> Result<EnrollResult, CategoryError> {
        let request = self.create_transactional_request(EnrollGameCycleRequest::default());
        let reply: EnrollGameCycleReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.result)
    }

    /// Tells the Foundation play has started.
    pub async fn start_playing(&self) -> Result<bool, CategoryError> {
        let request = self.create_transactional_request(StartPlayingRequest::default());
        let reply: StartPlayingReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.started)
    }

    /// Proposes `outcome`; the Foundation may cap it.
    pub async fn adjust_outcome(
        &self,
        outcome: Outcome,
    ) -> Result<OutcomeAdjustment, CategoryError> {
        let request = self.create_transactional_request(AdjustOutcomeRequest {
            outcome,
            ..Default::default()
        });
        let reply: AdjustOutcomeReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.adjustment)
    }

    /// Locks in the adjusted outcome. Returns whether the Foundation
    /// accepted it.
    pub async fn finalize_outcome(&self) -> Result<bool, CategoryError> {
        let request = self.create_transactional_request(FinalizeOutcomeRequest::default());
        let reply: FinalizeOutcomeReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.finalized)
    }

    /// Closes the cycle.
    pub async fn end_game_cycle(&self, history_steps: u32) -> Result<bool, CategoryError> {
        let request = self.create_transactional_request(EndGameCycleRequest {
            history_steps,
            ..Default::default()
        });
        let reply: EndGameCycleReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(reply.ended)
    }

    /// Denominations the player may pick from.
    ///
    /// `None` below version 1.1; nothing is sent.
    pub async fn get_denomination_menu(&self) -> Result<Option<Vec<u32>>, CategoryError> {
        if !self.core.is_method_supported(GET_DENOMINATION_MENU) {
            tracing::debug!(version = %self.core.version(), "denomination menu not available");
            return Ok(None);
        }
        let request = self.create_transactional_request(GetDenominationMenuRequest::default());
        let reply: GetDenominationMenuReply = self
            .core
            .send_message_and_get_reply(Channel::Foundation, request)
            .await?;
        Ok(Some(reply.denominations))
    }

    /// Reports how far play has progressed. Does nothing below 1.1.
    pub fn report_game_progress(&self, step: u32) -> Result<(), CategoryError> {
        if !self.core.is_method_supported(REPORT_GAME_PROGRESS) {
            tracing::debug!(version = %self.core.version(), step, "progress report skipped");
            return Ok(());
        }
        let notification = self
            .core
            .create_notification(GameProgressNotification { step });
        self.core.send_message(Channel::Foundation, notification)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use f2l_category::MockTransport;
    use f2l_protocol::{PayloadKind, ReplyStatus};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        cultures: Mutex<Vec<String>>,
        bets: Mutex<Vec<BetCommittedNotification>>,
        enrollments: Mutex<Vec<bool>>,
        reject_culture: bool,
    }

    impl GameControlCallbacks for Recorder {
        fn process_culture_change(&self, culture: &str) -> Result<(), String> {
            self.cultures.lock().unwrap().push(culture.to_string());
            if self.reject_culture {
                Err(format!("{culture} not installed"))
            } else {
                Ok(())
            }
        }

        fn process_bet_committed(&self, notification: &BetCommittedNotification) {
            self.bets.lock().unwrap().push(notification.clone());
        }

        fn process_enroll_response(&self, notification: &EnrollResponseNotification) {
            self.enrollments.lock().unwrap().push(notification.accepted);
        }
    }

    fn setup(
        recorder: Recorder,
    ) -> (Arc<MockTransport>, Arc<GameControl<MockTransport>>, Arc<Recorder>) {
        let transport = MockTransport::new();
        let recorder = Arc::new(recorder);
        let category = GameControl::new(Arc::clone(&transport), recorder.clone()).unwrap();
        (transport, category, recorder)
    }

    #[test]
    fn test_new_registers_every_inbound_route() {
        let (transport, category, _) = setup(Recorder::default());
        for message_type in [
            "ChangeCultureRequest",
            "BetCommittedNotification",
            "EnrollResponseNotification",
            "OutcomeResponseNotification",
        ] {
            assert!(transport.has_route(CategoryId::GameControl, message_type));
        }
        assert_eq!(category.handlers().len(), 4);
        assert_eq!(category.supported_versions(), &SUPPORTED_VERSIONS);
    }

    #[tokio::test]
    async fn test_commit_bet_stamps_transaction_and_returns_committed() {
        let (transport, category, _) = setup(Recorder::default());
        transport.set_transaction("T42");
        transport.push_reply(&CommitBetReply {
            committed: true,
            ..Default::default()
        });

        assert!(category.commit_bet(50, 1).await.unwrap());

        let sent: CommitBetRequest = transport.last_sent_body().unwrap();
        assert_eq!(sent.transaction_id.as_str(), "T42");
        assert_eq!((sent.bet, sent.denomination), (50, 1));
    }

    #[tokio::test]
    async fn test_enroll_game_cycle_returns_result() {
        let (transport, category, _) = setup(Recorder::default());
        let result = EnrollResult {
            accepted: true,
            response_pending: true,
        };
        transport.push_reply(&EnrollGameCycleReply {
            result,
            ..Default::default()
        });

        assert_eq!(category.enroll_game_cycle().await.unwrap(), result);
    }

    #[tokio::test]
    async fn test_adjust_outcome_error_status_returns_foundation_reply() {
        let (transport, category, _) = setup(Recorder::default());
        transport.push_reply(&AdjustOutcomeReply {
            status: ReplyStatus::error(7, "denied"),
            ..Default::default()
        });

        let result = category
            .adjust_outcome(Outcome { award_credits: 1000 })
            .await;

        assert!(matches!(
            result,
            Err(CategoryError::FoundationReply { code: 7, ref description })
                if description == "denied"
        ));
    }

    #[tokio::test]
    async fn test_full_cycle_sends_requests_in_order() {
        let (transport, category, _) = setup(Recorder::default());
        transport.push_reply(&CommitBetReply { committed: true, ..Default::default() });
        transport.push_reply(&EnrollGameCycleReply::default());
        transport.push_reply(&StartPlayingReply { started: true, ..Default::default() });
        transport.push_reply(&AdjustOutcomeReply::default());
        transport.push_reply(&FinalizeOutcomeReply { finalized: true, ..Default::default() });
        transport.push_reply(&EndGameCycleReply { ended: true, ..Default::default() });

        category.commit_bet(10, 1).await.unwrap();
        category.enroll_game_cycle().await.unwrap();
        category.start_playing().await.unwrap();
        category.adjust_outcome(Outcome::default()).await.unwrap();
        category.finalize_outcome().await.unwrap();
        category.end_game_cycle(3).await.unwrap();

        let types: Vec<_> = transport
            .sent()
            .into_iter()
            .map(|(_, frame)| frame.message_type)
            .collect();
        assert_eq!(
            types,
            [
                "CommitBetRequest",
                "EnrollGameCycleRequest",
                "StartPlayingRequest",
                "AdjustOutcomeRequest",
                "FinalizeOutcomeRequest",
                "EndGameCycleRequest",
            ]
        );
    }

    #[tokio::test]
    async fn test_get_denomination_menu_at_1_1_returns_menu() {
        let (transport, category, _) = setup(Recorder::default());
        category.set_version(1, 1).unwrap();
        transport.push_reply(&GetDenominationMenuReply {
            denominations: vec![1, 5, 25],
            ..Default::default()
        });

        let menu = category.get_denomination_menu().await.unwrap();

        assert_eq!(menu, Some(vec![1, 5, 25]));
        let (_, frame) = transport.last_sent().unwrap();
        assert_eq!(frame.version, VersionType::new(1, 1));
    }

    #[tokio::test]
    async fn test_get_denomination_menu_at_1_0_returns_none_without_sending() {
        let (transport, category, _) = setup(Recorder::default());
        category.set_version(1, 0).unwrap();

        assert_eq!(category.get_denomination_menu().await.unwrap(), None);
        assert_eq!(transport.sent_count(), 0);
    }

    #[test]
    fn test_report_game_progress_gated_by_version() {
        let (transport, category, _) = setup(Recorder::default());

        category.report_game_progress(1).unwrap();
        assert_eq!(transport.sent_count(), 0);

        category.set_version(1, 1).unwrap();
        category.report_game_progress(2).unwrap();
        let (_, frame) = transport.last_sent().unwrap();
        assert_eq!(frame.kind, PayloadKind::Notification);
        assert_eq!(
            transport.last_sent_body::<GameProgressNotification>().unwrap().step,
            2
        );
    }

    #[test]
    fn test_set_version_unsupported_keeps_state() {
        let (_, category, _) = setup(Recorder::default());

        let result = category.set_version(2, 0);

        assert!(matches!(result, Err(CategoryError::UnsupportedVersion { .. })));
        assert_eq!(category.version(), VersionType::UNNEGOTIATED);
    }

    #[test]
    fn test_change_culture_accepted_replies_ok() {
        let (transport, _category, recorder) = setup(Recorder::default());
        let request = transport.inbound(
            CategoryId::GameControl,
            PayloadKind::Request,
            &ChangeCultureRequest {
                culture: "fr-CA".into(),
            },
        );

        transport.deliver(&request).unwrap();

        assert_eq!(*recorder.cultures.lock().unwrap(), vec!["fr-CA".to_string()]);
        let (_, reply) = transport.last_sent().unwrap();
        assert_eq!(reply.kind, PayloadKind::Reply);
        assert_eq!(reply.in_reply_to, Some(request.id));
        let body: ChangeCultureReply = transport.last_sent_body().unwrap();
        assert!(body.status.is_ok());
        assert!(body.status.description.is_none());
    }

    #[test]
    fn test_change_culture_rejected_replies_with_reason() {
        let (transport, _category, _) = setup(Recorder {
            reject_culture: true,
            ..Default::default()
        });
        let request = transport.inbound(
            CategoryId::GameControl,
            PayloadKind::Request,
            &ChangeCultureRequest {
                culture: "xx-XX".into(),
            },
        );

        transport.deliver(&request).unwrap();

        let body: ChangeCultureReply = transport.last_sent_body().unwrap();
        assert_eq!(body.status, ReplyStatus::error(1, "xx-XX not installed"));
    }

    #[test]
    fn test_notifications_reach_callbacks_without_reply() {
        let (transport, _category, recorder) = setup(Recorder::default());
        let bet = BetCommittedNotification {
            bet: 20,
            denomination: 5,
        };

        transport
            .deliver(&transport.inbound(CategoryId::GameControl, PayloadKind::Notification, &bet))
            .unwrap();
        transport
            .deliver(&transport.inbound(
                CategoryId::GameControl,
                PayloadKind::Notification,
                &EnrollResponseNotification { accepted: true },
            ))
            .unwrap();

        assert_eq!(*recorder.bets.lock().unwrap(), vec![bet]);
        assert_eq!(*recorder.enrollments.lock().unwrap(), vec![true]);
        assert_eq!(transport.sent_count(), 0);
    }
}
