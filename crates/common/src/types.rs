use serde::{Deserialize, Serialize};

/// Raw rows as delivered by the remote database bindings.
///
/// Field names follow the generated camelCase bindings; timestamps are
/// seconds-since-epoch and ids are 64-bit. Conversion to view models (ms
/// timestamps, `fid-` addresses) happens in one place, `game::convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRound {
    pub round_id: u64,
    pub round_number: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_minutes: i64,
    pub prize: String,
    pub status: String,
    #[serde(default)]
    pub block_number: Option<i64>,
    #[serde(default)]
    pub actual_tx_count: Option<i64>,
    #[serde(default)]
    pub winning_fid: Option<i64>,
    #[serde(default)]
    pub second_place_winner_fid: Option<i64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGuess {
    pub guess_id: u64,
    pub round_id: u64,
    pub fid: i64,
    pub username: String,
    pub guess: i64,
    #[serde(default)]
    pub pfp_url: Option<String>,
    pub submitted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEvent {
    pub log_id: u64,
    pub event_type: String,
    pub details: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatMessage {
    pub chat_id: u64,
    pub round_id: String,
    pub address: String,
    pub username: String,
    pub message: String,
    pub pfp_url: String,
    pub timestamp: i64,
    pub msg_type: String,
}

/// Singleton prize configuration row (latest row wins on the client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrizeConfig {
    pub config_id: u8,
    pub jackpot_amount: i64,
    pub first_place_amount: i64,
    pub second_place_amount: i64,
    pub currency_type: String,
    pub token_contract_address: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserStats {
    pub stat_id: u64,
    pub user_identifier: String,
    pub username: String,
    pub pfp_url: String,
    pub total_points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_checkin_date: i64,
    pub total_checkins: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCheckIn {
    pub checkin_id: u64,
    pub user_identifier: String,
    pub username: String,
    pub pfp_url: String,
    pub checkin_date: i64,
    pub points_earned: i64,
    pub streak_count: i64,
}
