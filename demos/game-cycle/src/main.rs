//! Plays one game cycle against an in-process Foundation simulator.
//!
//! ```text
//! RUST_LOG=debug cargo run -p game-cycle
//! ```

use std::sync::Arc;

use f2l::categories::messages::auto_play::{IsAutoPlayOnReply, SetAutoPlayOnReply};
use f2l::categories::messages::connect::NegotiateVersionsReply;
use f2l::categories::messages::game_control::{
    AdjustOutcomeReply, AdjustOutcomeRequest, CommitBetReply, CommitBetRequest,
    EndGameCycleReply, EnrollGameCycleReply, FinalizeOutcomeReply, GetDenominationMenuReply,
    StartPlayingReply,
};
use f2l::categories::messages::voucher_print::VoucherPrintNotification;
use f2l::prelude::*;
use f2l::protocol::{Channel, Codec, Frame, JsonCodec, Message, MessageId, PayloadKind};
use f2l::transport::{Connection, MemoryConnection};

/// Largest award the simulated Foundation lets through.
const AWARD_CAP: u64 = 1_000;

// ---------------------------------------------------------------------------
// Logic callbacks
// ---------------------------------------------------------------------------

struct SlotLogic;

impl GameControlCallbacks for SlotLogic {
    fn process_culture_change(&self, culture: &str) -> Result<(), String> {
        tracing::info!(culture, "culture changed");
        Ok(())
    }
}

impl ConnectCallbacks for SlotLogic {
    fn process_park(&self) -> Result<(), String> {
        Err("a game cycle is in progress".into())
    }

    fn process_shutdown(&self, reason: &str) {
        tracing::warn!(reason, "foundation shutting down");
    }
}

impl AutoPlayCallbacks for SlotLogic {
    fn process_auto_play_on_request(&self) -> bool {
        false
    }

    fn process_auto_play_off(&self) {}
}

impl VoucherPrintCallbacks for SlotLogic {
    fn process_voucher_print_event(&self, event: VoucherPrintEvent) {
        tracing::info!(?event, "voucher printer");
    }
}

// ---------------------------------------------------------------------------
// Foundation simulator
// ---------------------------------------------------------------------------

fn frame<M: Message>(id: u64, template: &Frame, kind: PayloadKind, body: &M) -> Option<Frame> {
    Some(Frame {
        id: MessageId(id),
        in_reply_to: (kind == PayloadKind::Reply).then_some(template.id),
        channel: template.channel,
        category: template.category,
        version: template.version,
        kind,
        message_type: M::MESSAGE_TYPE.into(),
        transaction: None,
        body: JsonCodec.encode(body).ok()?,
    })
}

fn reply<M: Message>(id: u64, request: &Frame, body: &M) -> Option<Frame> {
    frame(id, request, PayloadKind::Reply, body)
}

fn answer(id: u64, request: &Frame) -> Option<Frame> {
    match request.message_type.as_str() {
        "NegotiateVersionsRequest" => {
            let selected = [CategoryId::GameControl, CategoryId::AutoPlay]
                .map(|category| CategoryVersion {
                    category,
                    version: VersionType::new(1, 1),
                })
                .to_vec();
            reply(id, request, &NegotiateVersionsReply {
                selected,
                ..Default::default()
            })
        }
        "GetDenominationMenuRequest" => reply(id, request, &GetDenominationMenuReply {
            denominations: vec![1, 5, 25],
            ..Default::default()
        }),
        "CommitBetRequest" => {
            let bet: CommitBetRequest = request.decode_body(&JsonCodec).ok()?;
            tracing::info!(bet = bet.bet, transaction = %bet.transaction_id, "foundation: bet");
            reply(id, request, &CommitBetReply {
                committed: true,
                ..Default::default()
            })
        }
        "EnrollGameCycleRequest" => reply(id, request, &EnrollGameCycleReply {
            result: EnrollResult {
                accepted: true,
                response_pending: false,
            },
            ..Default::default()
        }),
        "StartPlayingRequest" => reply(id, request, &StartPlayingReply {
            started: true,
            ..Default::default()
        }),
        "AdjustOutcomeRequest" => {
            let proposed: AdjustOutcomeRequest = request.decode_body(&JsonCodec).ok()?;
            let award = proposed.outcome.award_credits;
            reply(id, request, &AdjustOutcomeReply {
                adjustment: OutcomeAdjustment {
                    award_credits: award.min(AWARD_CAP),
                    capped: award > AWARD_CAP,
                },
                ..Default::default()
            })
        }
        "FinalizeOutcomeRequest" => reply(id, request, &FinalizeOutcomeReply {
            finalized: true,
            ..Default::default()
        }),
        "EndGameCycleRequest" => reply(id, request, &EndGameCycleReply {
            ended: true,
            ..Default::default()
        }),
        "IsAutoPlayOnRequest" => reply(id, request, &IsAutoPlayOnReply::default()),
        "SetAutoPlayOnRequest" => reply(id, request, &SetAutoPlayOnReply::default()),
        _ => None,
    }
}

/// Answers every request it understands until the Logic hangs up.
/// Announces a voucher print when the cycle ends.
async fn run_foundation(peer: MemoryConnection) -> usize {
    let mut next_id = 1_000;
    let mut answered = 0;
    while let Ok(Some(bytes)) = peer.recv().await {
        let Ok(request) = JsonCodec.decode::<Frame>(&bytes) else {
            continue;
        };
        if request.kind != PayloadKind::Request {
            tracing::debug!(message = %request.message_type, "foundation: notification");
            continue;
        }
        next_id += 1;
        let Some(reply) = answer(next_id, &request) else {
            tracing::warn!(message = %request.message_type, "foundation: no answer");
            continue;
        };
        let mut outgoing = vec![reply];
        if request.message_type == "EndGameCycleRequest" {
            next_id += 1;
            let mut template = request.clone();
            template.category = CategoryId::VoucherPrint;
            template.version = VersionType::new(1, 0);
            template.channel = Channel::Foundation;
            outgoing.extend(frame(
                next_id,
                &template,
                PayloadKind::Notification,
                &VoucherPrintNotification {
                    event: VoucherPrintEvent::PrintInitiated,
                },
            ));
        }
        for frame in outgoing {
            let Ok(bytes) = JsonCodec.encode(&frame) else {
                continue;
            };
            if peer.send(&bytes).await.is_err() {
                return answered;
            }
        }
        answered += 1;
    }
    answered
}

// ---------------------------------------------------------------------------
// One game cycle
// ---------------------------------------------------------------------------

async fn play_one_cycle(client: &LogicClient, bet: u64, award: u64) -> Result<u64, F2lError> {
    let game = client.game_control();
    let _transaction = client.begin_transaction();

    let denomination = game
        .get_denomination_menu()
        .await?
        .and_then(|menu| menu.first().copied())
        .unwrap_or(1);
    if !game.commit_bet(bet, denomination).await? {
        return Ok(0);
    }
    let enrolled = game.enroll_game_cycle().await?;
    if !enrolled.accepted {
        return Ok(0);
    }
    game.start_playing().await?;
    game.report_game_progress(1)?;
    let adjustment = game
        .adjust_outcome(Outcome {
            award_credits: award,
        })
        .await?;
    if adjustment.capped {
        tracing::info!(proposed = award, awarded = adjustment.award_credits, "award capped");
    }
    game.finalize_outcome().await?;
    game.end_game_cycle(3).await?;
    client.wap_sign().set_sign_text(format!("LAST WIN {}", adjustment.award_credits))?;
    Ok(adjustment.award_credits)
}

#[tokio::main]
async fn main() -> Result<(), F2lError> {
    init_tracing("info");

    let (logic_end, foundation_end) = MemoryConnection::pair();
    let foundation = tokio::spawn(run_foundation(foundation_end));

    let logic = Arc::new(SlotLogic);
    let client = LogicClient::builder()
        .game_control(logic.clone())
        .connect_callbacks(logic.clone())
        .auto_play(logic.clone())
        .voucher_print(logic)
        .build(logic_end)?;

    client.negotiate().await?;
    if let Some(auto_play) = client.auto_play() {
        tracing::info!(on = auto_play.is_auto_play_on().await?, "auto play");
    }
    let awarded = play_one_cycle(&client, 10, 2_500).await?;
    tracing::info!(awarded, "game cycle complete");

    client.close().await;
    if let Ok(answered) = foundation.await {
        tracing::info!(answered, "foundation done");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(connection: MemoryConnection) -> LogicClient {
        let logic = Arc::new(SlotLogic);
        LogicClient::builder()
            .game_control(logic.clone())
            .connect_callbacks(logic)
            .build(connection)
            .unwrap()
    }

    #[tokio::test]
    async fn test_play_one_cycle_award_is_capped() {
        let (local, peer) = MemoryConnection::pair();
        let foundation = tokio::spawn(run_foundation(peer));
        let client = client(local);

        client.negotiate().await.unwrap();
        let awarded = play_one_cycle(&client, 10, 2_500).await.unwrap();

        assert_eq!(awarded, AWARD_CAP);
        client.close().await;
        // negotiate, menu, then six cycle requests
        assert_eq!(foundation.await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_play_one_cycle_small_award_passes_through() {
        let (local, peer) = MemoryConnection::pair();
        let foundation = tokio::spawn(run_foundation(peer));
        let client = client(local);

        client.negotiate().await.unwrap();

        assert_eq!(play_one_cycle(&client, 1, 40).await.unwrap(), 40);
        client.close().await;
        foundation.await.unwrap();
    }

    #[test]
    fn test_answer_ignores_unknown_requests() {
        let request = Frame {
            id: MessageId(1),
            in_reply_to: None,
            channel: Channel::Foundation,
            category: CategoryId::GameControl,
            version: VersionType::new(1, 0),
            kind: PayloadKind::Request,
            message_type: "SomethingElseRequest".into(),
            transaction: None,
            body: Vec::new(),
        };
        assert!(answer(2, &request).is_none());
    }
}
