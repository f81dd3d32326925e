//! WebSocket session gateway.
//!
//! Two duplex channels per event, both addressed by the event's public
//! link: a voter channel that accepts ballot intents and receives pushed
//! state, and a display channel that passively receives the aggregated
//! display payload (with an explicit refresh request as the only inbound
//! message). All outbound frames form one closed tagged contract shared
//! with the admin broadcast path.

#![allow(missing_docs)]

use std::net::SocketAddr;

use axum::{
    extract::{
        ConnectInfo, Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use votehall_core::{CurrentCandidate, DisplayPayload, Tally, VoterIdentity};
use votehall_db::entities::{event, event::EventStatus, vote::VoteChoice};

use crate::middleware::AppState;
use crate::registry::PoolKind;

/// Close codes for refused connections.
const CLOSE_NOT_FOUND: u16 = 4004;
const CLOSE_UNAVAILABLE: u16 = 4003;
const CLOSE_OVERLOADED: u16 = 4008;

/// Client-to-server message on the voter channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoterClientMessage {
    /// Cast one ballot. `candidate_id` defaults to the candidate currently
    /// up for vote; grouped ballots name the chosen group member.
    CastVote {
        #[serde(default)]
        candidate_id: Option<String>,
        choice: VoteChoice,
        nonce: String,
        #[serde(default)]
        device_token: Option<String>,
    },
}

/// Server-to-client frame on the voter channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoterFrame {
    CurrentCandidate { data: CurrentCandidate },
    TallyUpdate { data: Tally },
    VoteConfirmed {
        choice: VoteChoice,
        candidate_id: String,
        auto_voted_candidate_ids: Vec<String>,
    },
    VotesCleared { message: String },
    Error { code: String, message: String },
}

/// Server-to-client frame on the display channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayFrame {
    DisplayUpdate {
        #[serde(flatten)]
        payload: Box<DisplayPayload>,
    },
}

fn to_json<T: Serialize>(frame: &T) -> String {
    serde_json::to_string(frame).unwrap_or_default()
}

/// Broadcast the current-candidate snapshot to the voter pool and the
/// display payload to the display pool.
///
/// Every state-changing path, voter or admin, funnels through here so
/// both client classes always see the same transition.
pub async fn push_event_state(state: &AppState, event: &event::Model) {
    match state.results_service.current_candidate(&event.id).await {
        Ok(current) => {
            let frame = to_json(&VoterFrame::CurrentCandidate { data: current });
            state
                .registry
                .broadcast(PoolKind::Voter, &event.link, &frame)
                .await;
        }
        Err(e) => warn!(event_id = %event.id, error = %e, "Failed to build current candidate"),
    }

    match state.results_service.display_payload(&event.id).await {
        Ok(payload) => {
            let frame = to_json(&DisplayFrame::DisplayUpdate {
                payload: Box::new(payload),
            });
            state
                .registry
                .broadcast(PoolKind::Display, &event.link, &frame)
                .await;
        }
        Err(e) => warn!(event_id = %event.id, error = %e, "Failed to build display payload"),
    }
}

/// Broadcast an updated tally for one candidate to the voter pool, then
/// the usual state pair to both pools.
pub async fn push_vote_result(state: &AppState, event: &event::Model, candidate_id: &str) {
    match state
        .results_service
        .candidate_tally(&event.id, candidate_id)
        .await
    {
        Ok(tally) => {
            let frame = to_json(&VoterFrame::TallyUpdate { data: tally });
            state
                .registry
                .broadcast(PoolKind::Voter, &event.link, &frame)
                .await;
        }
        Err(e) => warn!(event_id = %event.id, error = %e, "Failed to build tally"),
    }

    push_event_state(state, event).await;
}

/// Tell the voter pool that all votes of the event were cleared.
pub async fn push_votes_cleared(state: &AppState, event: &event::Model) {
    let frame = to_json(&VoterFrame::VotesCleared {
        message: "All votes for this event were cleared".to_string(),
    });
    state
        .registry
        .broadcast(PoolKind::Voter, &event.link, &frame)
        .await;
}

/// WebSocket handler for the voter channel.
pub async fn vote_ws_handler(
    ws: WebSocketUpgrade,
    Path(link): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_vote_socket(socket, link, addr, state))
}

async fn handle_vote_socket(mut socket: WebSocket, link: String, addr: SocketAddr, state: AppState) {
    let event = match state.event_service.get_event_by_link(&link).await {
        Ok(event) => event,
        Err(_) => {
            close_with(&mut socket, CLOSE_NOT_FOUND, "Event not found").await;
            return;
        }
    };

    // Finished events keep their voter channel so clients still receive the
    // completion broadcast instead of a silent drop.
    if !matches!(event.status, EventStatus::Active | EventStatus::Finished) {
        close_with(&mut socket, CLOSE_UNAVAILABLE, "Event is not available").await;
        return;
    }

    let mut sub = match state.registry.subscribe(PoolKind::Voter, &event.link).await {
        Ok(sub) => sub,
        Err(_) => {
            close_with(&mut socket, CLOSE_OVERLOADED, "Too many live connections").await;
            return;
        }
    };

    info!(link = %event.link, voter = %addr.ip(), "Voter connected");

    let (mut sender, mut receiver) = socket.split();

    // Initial push: the candidate currently up and, if present, its tally.
    if let Ok(current) = state.results_service.current_candidate(&event.id).await {
        let candidate_id = current.candidate.as_ref().map(|c| c.id.clone());
        let sent = send_frame(&mut sender, &VoterFrame::CurrentCandidate { data: current }).await;
        if sent && let Some(candidate_id) = candidate_id
            && let Ok(tally) = state
                .results_service
                .candidate_tally(&event.id, &candidate_id)
                .await
        {
            send_frame(&mut sender, &VoterFrame::TallyUpdate { data: tally }).await;
        }
    }

    loop {
        tokio::select! {
            // Frames broadcast through the registry
            frame = sub.rx.recv() => {
                let Some(frame) = frame else { break };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            // Messages from this voter
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_voter_message(&state, &event, addr, text.as_str(), &mut sender).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(link = %event.link, error = %e, "Voter socket error");
                        break;
                    }
                }
            }
        }
    }

    state
        .registry
        .unsubscribe(PoolKind::Voter, &event.link, sub.id)
        .await;
    info!(link = %event.link, voter = %addr.ip(), "Voter disconnected");
}

async fn handle_voter_message(
    state: &AppState,
    event: &event::Model,
    addr: SocketAddr,
    text: &str,
    sender: &mut SplitSink<WebSocket, Message>,
) {
    let message = match serde_json::from_str::<VoterClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            send_frame(
                sender,
                &VoterFrame::Error {
                    code: "BAD_REQUEST".to_string(),
                    message: format!("Invalid message: {e}"),
                },
            )
            .await;
            return;
        }
    };

    let VoterClientMessage::CastVote {
        candidate_id,
        choice,
        nonce,
        device_token,
    } = message;

    if nonce.trim().is_empty() {
        send_frame(
            sender,
            &VoterFrame::Error {
                code: "BAD_REQUEST".to_string(),
                message: "Missing nonce".to_string(),
            },
        )
        .await;
        return;
    }

    let voter = VoterIdentity {
        addr: addr.ip().to_string(),
        device: device_token.filter(|t| !t.trim().is_empty()),
    };

    let admitted = state
        .session_service
        .admit_vote(&event.id, candidate_id.as_deref(), &voter, choice, &nonce)
        .await;

    match admitted {
        Ok(admitted) => {
            send_frame(
                sender,
                &VoterFrame::VoteConfirmed {
                    choice: admitted.choice,
                    candidate_id: admitted.candidate_id.clone(),
                    auto_voted_candidate_ids: admitted.auto_voted_candidate_ids.clone(),
                },
            )
            .await;

            push_vote_result(state, event, &admitted.candidate_id).await;
        }
        Err(e) => {
            // A rejected ballot is answered on this connection only; the
            // pools see nothing.
            send_frame(
                sender,
                &VoterFrame::Error {
                    code: e.error_code().to_string(),
                    message: e.to_string(),
                },
            )
            .await;
        }
    }
}

/// WebSocket handler for the display channel.
pub async fn display_ws_handler(
    ws: WebSocketUpgrade,
    Path(link): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_display_socket(socket, link, state))
}

async fn handle_display_socket(mut socket: WebSocket, link: String, state: AppState) {
    let event = match state.event_service.get_event_by_link(&link).await {
        Ok(event) => event,
        Err(_) => {
            close_with(&mut socket, CLOSE_NOT_FOUND, "Event not found").await;
            return;
        }
    };

    let mut sub = match state.registry.subscribe(PoolKind::Display, &event.link).await {
        Ok(sub) => sub,
        Err(_) => {
            close_with(&mut socket, CLOSE_OVERLOADED, "Too many live connections").await;
            return;
        }
    };

    info!(link = %event.link, "Display connected");

    let (mut sender, mut receiver) = socket.split();

    send_display_payload(&state, &event, &mut sender).await;

    loop {
        tokio::select! {
            frame = sub.rx.recv() => {
                let Some(frame) = frame else { break };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    // Displays are otherwise passive; "refresh" re-sends
                    // the payload on demand.
                    Some(Ok(Message::Text(text))) => {
                        if text.as_str().trim() == "refresh" {
                            send_display_payload(&state, &event, &mut sender).await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(link = %event.link, error = %e, "Display socket error");
                        break;
                    }
                }
            }
        }
    }

    state
        .registry
        .unsubscribe(PoolKind::Display, &event.link, sub.id)
        .await;
    info!(link = %event.link, "Display disconnected");
}

async fn send_display_payload(
    state: &AppState,
    event: &event::Model,
    sender: &mut SplitSink<WebSocket, Message>,
) {
    match state.results_service.display_payload(&event.id).await {
        Ok(payload) => {
            send_frame(
                sender,
                &DisplayFrame::DisplayUpdate {
                    payload: Box::new(payload),
                },
            )
            .await;
        }
        Err(e) => warn!(event_id = %event.id, error = %e, "Failed to build display payload"),
    }
}

/// Serialize and send one frame; returns whether the send succeeded.
async fn send_frame<T: Serialize>(sender: &mut SplitSink<WebSocket, Message>, frame: &T) -> bool {
    sender
        .send(Message::Text(to_json(frame).into()))
        .await
        .is_ok()
}

async fn close_with(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_frame_serialization() {
        let frame = VoterFrame::VoteConfirmed {
            choice: VoteChoice::Yes,
            candidate_id: "c1".to_string(),
            auto_voted_candidate_ids: vec!["c2".to_string()],
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"vote_confirmed\""));
        assert!(json.contains("\"choice\":\"yes\""));
        assert!(json.contains("\"auto_voted_candidate_ids\":[\"c2\"]"));
    }

    #[test]
    fn test_error_frame_distinct_from_confirmation() {
        let frame = VoterFrame::Error {
            code: "ALREADY_VOTED".to_string(),
            message: "Already voted for this candidate".to_string(),
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"code\":\"ALREADY_VOTED\""));
    }

    #[test]
    fn test_cast_vote_parsing() {
        let json = r#"{"type":"cast_vote","choice":"neutral","nonce":"n-1"}"#;
        let message: VoterClientMessage = serde_json::from_str(json).unwrap();

        let VoterClientMessage::CastVote {
            candidate_id,
            choice,
            nonce,
            device_token,
        } = message;
        assert!(candidate_id.is_none());
        assert_eq!(choice, VoteChoice::Neutral);
        assert_eq!(nonce, "n-1");
        assert!(device_token.is_none());
    }

    #[test]
    fn test_cast_vote_rejects_unknown_choice() {
        let json = r#"{"type":"cast_vote","choice":"maybe","nonce":"n-1"}"#;
        assert!(serde_json::from_str::<VoterClientMessage>(json).is_err());
    }

    #[test]
    fn test_display_frame_is_flattened() {
        use votehall_core::{Tally, TimerInfo};

        let frame = DisplayFrame::DisplayUpdate {
            payload: Box::new(DisplayPayload {
                candidate: None,
                group_siblings: Vec::new(),
                group_tallies: Vec::new(),
                timer: TimerInfo::idle(15),
                tally: Tally::default(),
                event_status: EventStatus::Active,
                event_completed: false,
                final_results: None,
            }),
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"display_update\""));
        // Flattened payload fields sit at the top level.
        assert!(json.contains("\"event_status\":\"active\""));
    }
}
