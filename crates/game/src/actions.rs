//! User-triggered actions: validate against cached state, then forward a
//! fire-and-forget reducer call. Every guard here is advisory — the remote
//! database re-checks everything — but failing fast keeps obviously invalid
//! traffic off the wire and gives the caller an immediate message.

use crate::checkin::{self, CheckInEstimate, CheckInPlan};
use crate::error::{ActionOutcome, GameError};
use crate::model::{MessageType, ParticipantId, RoundStatus};
use crate::remote::{ReducerCall, Remote};
use crate::store::GameStore;
use std::sync::Arc;
use tracing::info;

pub struct GameActions {
    remote: Arc<dyn Remote>,
}

impl GameActions {
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self { remote }
    }

    /// Submit a guess for the active round. Requires a Farcaster identity,
    /// an open round that has not expired, and no prior guess from this
    /// address (case-insensitive).
    pub fn submit_guess(
        &self,
        store: &GameStore,
        address: &str,
        username: &str,
        guess: i64,
        pfp_url: Option<String>,
        now_ms: i64,
    ) -> ActionOutcome {
        self.try_submit_guess(store, address, username, guess, pfp_url, now_ms)
            .into()
    }

    fn try_submit_guess(
        &self,
        store: &GameStore,
        address: &str,
        username: &str,
        guess: i64,
        pfp_url: Option<String>,
        now_ms: i64,
    ) -> Result<(), GameError> {
        let participant: ParticipantId = address.parse()?;
        let Some(fid) = participant.fid() else {
            return Err(GameError::Rejected(
                "guessing requires a farcaster identity",
            ));
        };
        let round = store
            .active_round()
            .ok_or(GameError::Rejected("no round is currently open"))?;
        if now_ms >= round.end_time {
            return Err(GameError::Rejected("the round has already ended"));
        }
        if store.has_user_guessed(round.id, address) {
            return Err(GameError::Rejected("you already guessed this round"));
        }

        info!(round_id = round.id, fid, guess, "submitting guess");
        self.remote.call(ReducerCall::SubmitGuess {
            round_id: round.id,
            fid,
            username: username.to_string(),
            guess,
            pfp_url,
        })
    }

    pub fn create_round(
        &self,
        round_number: i64,
        duration_minutes: i64,
        prize: String,
        block_number: Option<i64>,
    ) -> ActionOutcome {
        info!(round_number, duration_minutes, "creating round");
        self.remote
            .call(ReducerCall::CreateRound {
                round_number,
                duration_minutes,
                prize,
                block_number,
            })
            .into()
    }

    /// Close an open round ahead of its scheduled end.
    pub fn end_round(&self, store: &GameStore, round_id: u64) -> ActionOutcome {
        self.try_end_round(store, round_id).into()
    }

    fn try_end_round(&self, store: &GameStore, round_id: u64) -> Result<(), GameError> {
        match store.round(round_id) {
            Some(round) if round.status == RoundStatus::Open => {
                info!(round_id, "ending round");
                self.remote.call(ReducerCall::EndRoundManually { round_id })
            }
            Some(_) => Err(GameError::Rejected("the round is not open")),
            None => Err(GameError::Rejected("unknown round")),
        }
    }

    /// Record the settled result for a closed round. The winner must carry a
    /// Farcaster identity; the rounds table stores winners as fids.
    pub fn update_round_result(
        &self,
        round_id: u64,
        actual_tx_count: i64,
        block_hash: String,
        winning_address: &str,
    ) -> ActionOutcome {
        self.try_update_round_result(round_id, actual_tx_count, block_hash, winning_address)
            .into()
    }

    fn try_update_round_result(
        &self,
        round_id: u64,
        actual_tx_count: i64,
        block_hash: String,
        winning_address: &str,
    ) -> Result<(), GameError> {
        let winner: ParticipantId = winning_address.parse()?;
        let Some(winning_fid) = winner.fid() else {
            return Err(GameError::Rejected("the winner must have a farcaster identity"));
        };
        info!(round_id, actual_tx_count, winning_fid, "recording round result");
        self.remote.call(ReducerCall::UpdateRoundResult {
            round_id,
            actual_tx_count,
            block_hash,
            winning_fid,
        })
    }

    pub fn send_chat_message(
        &self,
        round_id: String,
        address: &str,
        username: String,
        message: String,
        pfp_url: String,
        kind: MessageType,
    ) -> ActionOutcome {
        self.try_send_chat_message(round_id, address, username, message, pfp_url, kind)
            .into()
    }

    fn try_send_chat_message(
        &self,
        round_id: String,
        address: &str,
        username: String,
        message: String,
        pfp_url: String,
        kind: MessageType,
    ) -> Result<(), GameError> {
        let participant: ParticipantId = address.parse()?;
        if message.trim().is_empty() {
            return Err(GameError::Rejected("cannot send an empty message"));
        }
        self.remote.call(ReducerCall::SendChatMessage {
            round_id,
            address: participant.to_string(),
            username,
            message,
            pfp_url,
            msg_type: kind.as_str().to_string(),
        })
    }

    /// Attempt today's check-in. Returns the client-side estimate to display
    /// until the authoritative `user_stats` update arrives.
    pub fn check_in(
        &self,
        store: &GameStore,
        address: &str,
        username: String,
        pfp_url: String,
        now_ms: i64,
    ) -> Result<CheckInEstimate, GameError> {
        let participant: ParticipantId = address.parse()?;
        if self.remote.state() != crate::remote::ConnectionState::Connected {
            return Err(GameError::NotConnected);
        }
        // Check-in is optional per deployment; absent reducer is a soft miss.
        if !self.remote.supports("daily_checkin") {
            return Err(GameError::Unsupported("daily_checkin"));
        }

        let user_identifier = participant.to_string();
        let own_records: Vec<_> = store
            .checkins()
            .iter()
            .filter(|c| c.user_identifier == user_identifier)
            .cloned()
            .collect();
        let plan = checkin::plan_checkin(store.user_stats_for(&user_identifier), &own_records, now_ms);
        let estimate = match plan {
            CheckInPlan::AlreadyCheckedIn => {
                return Err(GameError::Rejected("already checked in today"));
            }
            CheckInPlan::Accepted(estimate) => estimate,
        };

        info!(user = %user_identifier, streak = estimate.new_streak, "checking in");
        self.remote.call(ReducerCall::DailyCheckin {
            user_identifier,
            username,
            pfp_url,
        })?;
        Ok(estimate)
    }
}
