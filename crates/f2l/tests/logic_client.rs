//! End-to-end tests: a scripted Foundation on one end of a connection,
//! a `LogicClient` on the other.

use std::sync::{Arc, Mutex};

use f2l::prelude::*;
use f2l::categories::messages::connect::{NegotiateVersionsReply, ParkReply, ParkRequest};
use f2l::categories::messages::game_control::{
    AdjustOutcomeReply, ChangeCultureReply, ChangeCultureRequest, CommitBetReply, CommitBetRequest,
    EndGameCycleReply, EnrollGameCycleReply, FinalizeOutcomeReply, StartPlayingReply,
};
use f2l::protocol::{
    Channel, Codec, Frame, JsonCodec, Message, MessageId, PayloadKind, ReplyStatus,
};
use f2l::transport::{Connection, MemoryConnection};

#[derive(Default)]
struct Logic {
    cultures: Mutex<Vec<String>>,
    parked: Mutex<bool>,
}

impl GameControlCallbacks for Logic {
    fn process_culture_change(&self, culture: &str) -> Result<(), String> {
        if culture.is_empty() {
            return Err("empty culture".into());
        }
        self.cultures.lock().unwrap().push(culture.to_string());
        Ok(())
    }
}

impl ConnectCallbacks for Logic {
    fn process_park(&self) -> Result<(), String> {
        *self.parked.lock().unwrap() = true;
        Ok(())
    }

    fn process_shutdown(&self, _reason: &str) {}
}

fn client(logic: &Arc<Logic>, connection: impl Connection) -> LogicClient {
    LogicClient::builder()
        .game_control(logic.clone())
        .connect_callbacks(logic.clone())
        .build(connection)
        .unwrap()
}

fn reply<M: Message>(request: &Frame, body: &M) -> Frame {
    Frame {
        id: MessageId(50_000 + request.id.0),
        in_reply_to: Some(request.id),
        channel: request.channel,
        category: request.category,
        version: request.version,
        kind: PayloadKind::Reply,
        message_type: M::MESSAGE_TYPE.into(),
        transaction: None,
        body: JsonCodec.encode(body).unwrap(),
    }
}

fn request<M: Message>(id: u64, category: CategoryId, body: &M) -> Frame {
    Frame {
        id: MessageId(id),
        in_reply_to: None,
        channel: Channel::Foundation,
        category,
        version: VersionType::new(1, 0),
        kind: PayloadKind::Request,
        message_type: M::MESSAGE_TYPE.into(),
        transaction: None,
        body: JsonCodec.encode(body).unwrap(),
    }
}

/// Answers every game-cycle request; a bet above 100 is refused with
/// code 3. Returns the requests it saw once the client hangs up.
async fn foundation(peer: impl Connection) -> Vec<Frame> {
    let mut seen = Vec::new();
    while let Ok(Some(bytes)) = peer.recv().await {
        let request: Frame = JsonCodec.decode(&bytes).unwrap();
        let answer = match request.message_type.as_str() {
            "NegotiateVersionsRequest" => reply(
                &request,
                &NegotiateVersionsReply {
                    selected: vec![CategoryVersion {
                        category: CategoryId::GameControl,
                        version: VersionType::new(1, 1),
                    }],
                    ..Default::default()
                },
            ),
            "CommitBetRequest" => {
                let body: CommitBetRequest = request.decode_body(&JsonCodec).unwrap();
                let status = if body.bet > 100 {
                    ReplyStatus::error(3, "bet over limit")
                } else {
                    ReplyStatus::ok()
                };
                reply(
                    &request,
                    &CommitBetReply {
                        status,
                        committed: body.bet <= 100,
                    },
                )
            }
            "EnrollGameCycleRequest" => reply(
                &request,
                &EnrollGameCycleReply {
                    result: EnrollResult {
                        accepted: true,
                        response_pending: false,
                    },
                    ..Default::default()
                },
            ),
            "StartPlayingRequest" => reply(
                &request,
                &StartPlayingReply {
                    started: true,
                    ..Default::default()
                },
            ),
            "AdjustOutcomeRequest" => reply(
                &request,
                &AdjustOutcomeReply {
                    adjustment: OutcomeAdjustment {
                        award_credits: 500,
                        capped: true,
                    },
                    ..Default::default()
                },
            ),
            "FinalizeOutcomeRequest" => reply(
                &request,
                &FinalizeOutcomeReply {
                    finalized: true,
                    ..Default::default()
                },
            ),
            "EndGameCycleRequest" => reply(
                &request,
                &EndGameCycleReply {
                    ended: true,
                    ..Default::default()
                },
            ),
            "GameProgressNotification" => {
                seen.push(request);
                continue;
            }
            other => panic!("unexpected request {other}"),
        };
        seen.push(request);
        peer.send(&JsonCodec.encode(&answer).unwrap()).await.unwrap();
    }
    seen
}

#[tokio::test]
async fn test_full_game_cycle_shares_one_transaction() {
    let (local, peer) = MemoryConnection::pair();
    let foundation = tokio::spawn(foundation(peer));
    let logic = Arc::new(Logic::default());
    let client = client(&logic, local);

    let selected = client.negotiate().await.unwrap();
    assert_eq!(selected.len(), 1);

    let scope = client.begin_transaction();
    let token = scope.token().clone();
    let game = client.game_control();
    assert!(game.commit_bet(10, 1).await.unwrap());
    assert!(game.enroll_game_cycle().await.unwrap().accepted);
    assert!(game.start_playing().await.unwrap());
    game.report_game_progress(1).unwrap();
    let adjustment = game
        .adjust_outcome(Outcome {
            award_credits: 9_000,
        })
        .await
        .unwrap();
    assert_eq!(adjustment.award_credits, 500);
    assert!(adjustment.capped);
    assert!(game.finalize_outcome().await.unwrap());
    assert!(game.end_game_cycle(3).await.unwrap());
    drop(scope);

    client.close().await;
    let seen = foundation.await.unwrap();
    let types: Vec<_> = seen.iter().map(|f| f.message_type.as_str()).collect();
    assert_eq!(
        types,
        [
            "NegotiateVersionsRequest",
            "CommitBetRequest",
            "EnrollGameCycleRequest",
            "StartPlayingRequest",
            "GameProgressNotification",
            "AdjustOutcomeRequest",
            "FinalizeOutcomeRequest",
            "EndGameCycleRequest",
        ]
    );
    let commit: CommitBetRequest = seen[1].decode_body(&JsonCodec).unwrap();
    assert_eq!(commit.transaction_id, token);
    assert!(seen[1..].iter().all(|f| f.version == VersionType::new(1, 1)));
}

#[tokio::test]
async fn test_refused_bet_surfaces_foundation_code() {
    let (local, peer) = MemoryConnection::pair();
    let foundation = tokio::spawn(foundation(peer));
    let logic = Arc::new(Logic::default());
    let client = client(&logic, local);
    client.negotiate().await.unwrap();

    let err: F2lError = client.game_control().commit_bet(500, 1).await.unwrap_err().into();

    assert_eq!(err.foundation_code(), Some(3));
    assert!(err.to_string().contains("bet over limit"));
    client.close().await;
    foundation.await.unwrap();
}

#[tokio::test]
async fn test_inbound_requests_reach_callbacks_and_are_answered() {
    let (local, peer) = MemoryConnection::pair();
    let logic = Arc::new(Logic::default());
    let client = client(&logic, local);

    let park = request(7, CategoryId::Connect, &ParkRequest {});
    peer.send(&JsonCodec.encode(&park).unwrap()).await.unwrap();
    let answer: Frame = JsonCodec.decode(&peer.recv().await.unwrap().unwrap()).unwrap();
    assert_eq!(answer.in_reply_to, Some(MessageId(7)));
    let body: ParkReply = answer.decode_body(&JsonCodec).unwrap();
    assert!(body.status.is_ok());
    assert!(*logic.parked.lock().unwrap());

    let culture = request(
        8,
        CategoryId::GameControl,
        &ChangeCultureRequest {
            culture: String::new(),
        },
    );
    peer.send(&JsonCodec.encode(&culture).unwrap()).await.unwrap();
    let answer: Frame = JsonCodec.decode(&peer.recv().await.unwrap().unwrap()).unwrap();
    let body: ChangeCultureReply = answer.decode_body(&JsonCodec).unwrap();
    assert_eq!(body.status.code, f2l::categories::CALLBACK_REFUSED);
    assert_eq!(body.status.description.as_deref(), Some("empty culture"));
    assert!(logic.cultures.lock().unwrap().is_empty());

    client.close().await;
}

#[tokio::test]
async fn test_build_without_connect_callbacks_fails() {
    let (local, _peer) = MemoryConnection::pair();
    let logic = Arc::new(Logic::default());

    let result = LogicClient::builder().game_control(logic).build(local);

    assert!(matches!(result, Err(F2lError::MissingCallbacks("connect"))));
}

#[tokio::test]
async fn test_optional_categories_absent_unless_configured() {
    let (local, _peer) = MemoryConnection::pair();
    let logic = Arc::new(Logic::default());
    let client = client(&logic, local);

    assert!(client.auto_play().is_none());
    assert!(client.voucher_print().is_none());
    client.close().await;
}

#[cfg(feature = "websocket")]
#[tokio::test]
async fn test_game_cycle_over_websocket() {
    use f2l::transport::{Listener, WebSocketListener};

    let mut listener = WebSocketListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let foundation = tokio::spawn(async move {
        let connection = listener.accept().await.unwrap();
        foundation(connection).await
    });

    let logic = Arc::new(Logic::default());
    let client = LogicClient::builder()
        .game_control(logic.clone())
        .connect_callbacks(logic)
        .connect_websocket(&format!("ws://{addr}"))
        .await
        .unwrap();

    client.negotiate().await.unwrap();
    let _scope = client.begin_transaction();
    assert!(client.game_control().commit_bet(1, 1).await.unwrap());

    client.close().await;
    let seen = foundation.await.unwrap();
    assert_eq!(seen.len(), 2);
}
