//! Channel to the remote game database.
//!
//! The remote side owns all authoritative state; this module only maintains a
//! subscription stream (snapshot, then incremental insert/update frames) and
//! forwards fire-and-forget reducer calls. A call never returns the mutated
//! row — effects are observed through later table events, possibly never
//! (server-side rejections are not surfaced).
//!
//! The connection is an explicitly owned object with a spawn/cancel
//! lifecycle, not a module-level singleton. While disconnected, every call
//! fails fast with `NotConnected` and cached reads stay visible upstream.

use crate::error::GameError;
use common::config::Spacetime;
use common::types::{
    RawChatMessage, RawCheckIn, RawGuess, RawLogEvent, RawPrizeConfig, RawRound, RawUserStats,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One row of some subscribed table, tagged with its table name on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "snake_case")]
pub enum TableRow {
    Rounds(RawRound),
    Guesses(RawGuess),
    Logs(RawLogEvent),
    ChatMessages(RawChatMessage),
    PrizeConfig(RawPrizeConfig),
    UserStats(RawUserStats),
    Checkins(RawCheckIn),
}

/// Names of the tables we subscribe to, in subscription order.
pub const SUBSCRIBED_TABLES: [&str; 7] = [
    "rounds",
    "guesses",
    "logs",
    "chat_messages",
    "prize_config",
    "user_stats",
    "checkins",
];

/// Inbound frames. `Connected` announces the reducer capability set for this
/// deployment; a missing capability surfaces as `Unsupported` to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected {
        identity: String,
        reducers: Vec<String>,
    },
    Snapshot {
        rows: Vec<TableRow>,
    },
    Insert {
        row: TableRow,
    },
    Update {
        row: TableRow,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { tables: Vec<String> },
    Call { call: ReducerCall },
}

/// Remote procedures. Arguments mirror the reducer signatures; identifiers
/// stay 64-bit integers end to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reducer", content = "args", rename_all = "snake_case")]
pub enum ReducerCall {
    CreateRound {
        round_number: i64,
        duration_minutes: i64,
        prize: String,
        block_number: Option<i64>,
    },
    SubmitGuess {
        round_id: u64,
        fid: i64,
        username: String,
        guess: i64,
        pfp_url: Option<String>,
    },
    EndRoundManually {
        round_id: u64,
    },
    UpdateRoundResult {
        round_id: u64,
        actual_tx_count: i64,
        block_hash: String,
        winning_fid: i64,
    },
    SendChatMessage {
        round_id: String,
        address: String,
        username: String,
        message: String,
        pfp_url: String,
        msg_type: String,
    },
    DailyCheckin {
        user_identifier: String,
        username: String,
        pfp_url: String,
    },
    GetActiveRound,
    GetPrizeConfig,
}

impl ReducerCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRound { .. } => "create_round",
            Self::SubmitGuess { .. } => "submit_guess",
            Self::EndRoundManually { .. } => "end_round_manually",
            Self::UpdateRoundResult { .. } => "update_round_result",
            Self::SendChatMessage { .. } => "send_chat_message",
            Self::DailyCheckin { .. } => "daily_checkin",
            Self::GetActiveRound => "get_active_round",
            Self::GetPrizeConfig => "get_prize_config",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Write side of the channel, safe to clone across tasks.
pub trait Remote: Send + Sync {
    fn state(&self) -> ConnectionState;

    /// Whether the current deployment exposes the named reducer. Always
    /// false while disconnected (no capability set has been announced).
    fn supports(&self, reducer: &str) -> bool;

    /// Enqueue a fire-and-forget reducer call. Fails fast while
    /// disconnected; never retried internally.
    fn call(&self, call: ReducerCall) -> Result<(), GameError>;
}

pub struct ConnectionHandle {
    state_rx: watch::Receiver<ConnectionState>,
    capabilities: Arc<RwLock<HashSet<String>>>,
    outbound: mpsc::UnboundedSender<ReducerCall>,
}

impl Remote for ConnectionHandle {
    fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    fn supports(&self, reducer: &str) -> bool {
        self.state() == ConnectionState::Connected
            && self
                .capabilities
                .read()
                .is_ok_and(|caps| caps.contains(reducer))
    }

    fn call(&self, call: ReducerCall) -> Result<(), GameError> {
        if self.state() != ConnectionState::Connected {
            return Err(GameError::NotConnected);
        }
        debug!(reducer = call.name(), "enqueueing reducer call");
        self.outbound
            .send(call)
            .map_err(|_| GameError::ChannelClosed)
    }
}

/// Spawn the connection task. Returns the call handle and the stream of
/// inbound table frames for the store pump.
pub fn spawn(
    cfg: Spacetime,
    cancel: CancellationToken,
) -> (Arc<ConnectionHandle>, mpsc::UnboundedReceiver<ServerFrame>) {
    let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let capabilities = Arc::new(RwLock::new(HashSet::new()));

    let handle = Arc::new(ConnectionHandle {
        state_rx,
        capabilities: Arc::clone(&capabilities),
        outbound: outbound_tx,
    });

    tokio::spawn(run(cfg, state_tx, capabilities, outbound_rx, frames_tx, cancel));

    (handle, frames_rx)
}

async fn run(
    cfg: Spacetime,
    state_tx: watch::Sender<ConnectionState>,
    capabilities: Arc<RwLock<HashSet<String>>>,
    mut outbound_rx: mpsc::UnboundedReceiver<ReducerCall>,
    frames_tx: mpsc::UnboundedSender<ServerFrame>,
    cancel: CancellationToken,
) {
    let url = format!("{}/database/{}/subscribe", cfg.host, cfg.db_name);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let _ = state_tx.send(ConnectionState::Connecting);
        info!(url = %url, attempt = attempt + 1, "connecting to game database");

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            res = tokio::time::timeout(
                Duration::from_secs(cfg.connect_timeout_secs),
                connect_async(&url),
            ) => res,
        };

        match connected {
            Ok(Ok((ws, _resp))) => {
                attempt = 0;
                let _ = state_tx.send(ConnectionState::Connected);
                info!("connected to game database");

                run_session(ws, &capabilities, &mut outbound_rx, &frames_tx, &cancel).await;

                // Subscription torn down: reset to disconnected and drop the
                // stale capability set.
                if let Ok(mut caps) = capabilities.write() {
                    caps.clear();
                }
                let _ = state_tx.send(ConnectionState::Disconnected);
                if cancel.is_cancelled() {
                    break;
                }
                warn!("game database connection lost");
            }
            Ok(Err(e)) => {
                let _ = state_tx.send(ConnectionState::Disconnected);
                warn!(error = %e, "connection attempt failed");
            }
            Err(_) => {
                let _ = state_tx.send(ConnectionState::Disconnected);
                warn!(timeout_secs = cfg.connect_timeout_secs, "connection attempt timed out");
            }
        }

        attempt += 1;
        if attempt > cfg.max_reconnect_attempts {
            warn!(
                attempts = attempt,
                "reconnect budget exhausted, staying disconnected"
            );
            break;
        }
        // Fixed delay with a linear multiplier per attempt.
        let delay = Duration::from_millis(cfg.reconnect_delay_ms * u64::from(attempt));
        tokio::select! {
            _ = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    let _ = state_tx.send(ConnectionState::Disconnected);
    debug!("connection task stopped");
}

async fn run_session<S>(
    ws: tokio_tungstenite::WebSocketStream<S>,
    capabilities: &RwLock<HashSet<String>>,
    outbound_rx: &mut mpsc::UnboundedReceiver<ReducerCall>,
    frames_tx: &mpsc::UnboundedSender<ServerFrame>,
    cancel: &CancellationToken,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    let subscribe = ClientFrame::Subscribe {
        tables: SUBSCRIBED_TABLES.iter().map(|t| (*t).to_string()).collect(),
    };
    if let Ok(json) = serde_json::to_string(&subscribe) {
        if sink.send(Message::Text(json)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return;
            }
            call = outbound_rx.recv() => {
                let Some(call) = call else { return };
                let frame = ClientFrame::Call { call };
                match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to encode reducer call"),
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerFrame>(&text) {
                            Ok(ServerFrame::Connected { identity, reducers }) => {
                                info!(identity = %identity, reducers = reducers.len(), "subscription established");
                                if let Ok(mut caps) = capabilities.write() {
                                    *caps = reducers.into_iter().collect();
                                }
                            }
                            Ok(frame) => {
                                if frames_tx.send(frame).is_err() {
                                    return;
                                }
                            }
                            Err(e) => warn!(error = %e, "unparseable server frame"),
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
