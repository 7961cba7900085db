//! Row converters: the single boundary between raw remote rows and typed view
//! models. Pure and total — a trusted source means no validation failures.
//!
//! Remote timestamps are seconds-since-epoch; view models carry milliseconds.
//! The wire format has no null marker for some optional numerics, so a zero
//! raw value reads as absent (`block_number = 0` means "no target block").

use crate::model::{
    ChatMessage, CheckInRecord, Guess, LogEvent, MessageType, PrizeConfiguration, Round,
    RoundStatus, UserStats,
};
use common::types::{
    RawChatMessage, RawCheckIn, RawGuess, RawLogEvent, RawPrizeConfig, RawRound, RawUserStats,
};

fn to_millis(secs: i64) -> i64 {
    secs * 1000
}

/// Zero doubles as "absent" where the wire cannot express null.
fn nonzero(v: Option<i64>) -> Option<i64> {
    v.filter(|&n| n != 0)
}

fn nonempty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn fid_address(fid: i64) -> String {
    format!("fid-{fid}")
}

pub fn convert_round(r: &RawRound) -> Round {
    Round {
        id: r.round_id,
        round_number: r.round_number,
        start_time: to_millis(r.start_time),
        end_time: to_millis(r.end_time),
        prize: r.prize.clone(),
        status: RoundStatus::from_str_loose(&r.status),
        block_number: nonzero(r.block_number),
        actual_tx_count: nonzero(r.actual_tx_count),
        winning_address: nonzero(r.winning_fid).map(fid_address),
        second_place_address: nonzero(r.second_place_winner_fid).map(fid_address),
        block_hash: nonempty(r.block_hash.clone()),
        created_at: to_millis(r.created_at),
        duration_minutes: r.duration_minutes,
    }
}

pub fn convert_guess(g: &RawGuess) -> Guess {
    Guess {
        id: g.guess_id,
        round_id: g.round_id,
        address: fid_address(g.fid),
        username: g.username.clone(),
        guess: g.guess,
        pfp_url: g.pfp_url.clone().unwrap_or_default(),
        submitted_at: to_millis(g.submitted_at),
    }
}

pub fn convert_log(l: &RawLogEvent) -> LogEvent {
    LogEvent {
        id: l.log_id,
        event_type: l.event_type.clone(),
        details: l.details.clone(),
        timestamp: to_millis(l.timestamp),
    }
}

pub fn convert_chat_message(c: &RawChatMessage) -> ChatMessage {
    ChatMessage {
        id: c.chat_id,
        round_id: c.round_id.clone(),
        address: c.address.clone(),
        username: c.username.clone(),
        message: c.message.clone(),
        pfp_url: c.pfp_url.clone(),
        timestamp: to_millis(c.timestamp),
        kind: MessageType::from_str_loose(&c.msg_type),
    }
}

pub fn convert_prize_config(p: &RawPrizeConfig) -> PrizeConfiguration {
    PrizeConfiguration {
        id: p.config_id,
        jackpot_amount: p.jackpot_amount,
        first_place_amount: p.first_place_amount,
        second_place_amount: p.second_place_amount,
        currency_type: p.currency_type.clone(),
        updated_at: to_millis(p.updated_at),
    }
}

pub fn convert_user_stats(s: &RawUserStats) -> UserStats {
    UserStats {
        user_identifier: s.user_identifier.clone(),
        username: s.username.clone(),
        pfp_url: s.pfp_url.clone(),
        total_points: s.total_points,
        current_streak: s.current_streak,
        longest_streak: s.longest_streak,
        last_checkin_date: to_millis(s.last_checkin_date),
        total_checkins: s.total_checkins,
        created_at: to_millis(s.created_at),
        updated_at: to_millis(s.updated_at),
    }
}

pub fn convert_checkin(c: &RawCheckIn) -> CheckInRecord {
    CheckInRecord {
        checkin_id: c.checkin_id,
        user_identifier: c.user_identifier.clone(),
        username: c.username.clone(),
        pfp_url: c.pfp_url.clone(),
        checkin_date: to_millis(c.checkin_date),
        points_earned: c.points_earned,
        streak_count: c.streak_count,
    }
}
