use crate::error::GameError;
use std::fmt;
use std::str::FromStr;

/// Round lifecycle. At most one round is `Open` at any time; the constraint
/// is enforced by the remote database and assumed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Open,
    Closed,
    Finished,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Finished => "finished",
        }
    }

    /// Unknown statuses from the wire degrade to `Closed` — a round we cannot
    /// classify must not accept guesses.
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "open" => Self::Open,
            "finished" => Self::Finished,
            _ => Self::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Guess,
    System,
    Winner,
    Chat,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guess => "guess",
            Self::System => "system",
            Self::Winner => "winner",
            Self::Chat => "chat",
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "guess" => Self::Guess,
            "system" => Self::System,
            "winner" => Self::Winner,
            _ => Self::Chat,
        }
    }
}

/// A participant identifier: either a Farcaster id rendered as `fid-<n>` or a
/// hex wallet address. Everything else is rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantId {
    Fid(i64),
    Wallet(String),
}

impl ParticipantId {
    pub fn fid(&self) -> Option<i64> {
        match self {
            Self::Fid(fid) => Some(*fid),
            Self::Wallet(_) => None,
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fid(fid) => write!(f, "fid-{fid}"),
            Self::Wallet(addr) => f.write_str(addr),
        }
    }
}

impl FromStr for ParticipantId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("fid-") {
            let fid: i64 = digits
                .parse()
                .map_err(|_| GameError::InvalidAddress(s.to_string()))?;
            if fid <= 0 {
                return Err(GameError::InvalidAddress(s.to_string()));
            }
            return Ok(Self::Fid(fid));
        }
        if let Some(hex) = s.strip_prefix("0x") {
            if hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(Self::Wallet(s.to_ascii_lowercase()));
            }
        }
        Err(GameError::InvalidAddress(s.to_string()))
    }
}

/// One instance of the prediction game tied to a target Bitcoin block.
/// All timestamps are milliseconds-since-epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub id: u64,
    pub round_number: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub prize: String,
    pub status: RoundStatus,
    pub block_number: Option<i64>,
    pub actual_tx_count: Option<i64>,
    pub winning_address: Option<String>,
    pub second_place_address: Option<String>,
    pub block_hash: Option<String>,
    pub created_at: i64,
    pub duration_minutes: i64,
}

/// A single user's predicted transaction count for a round. Immutable once
/// created; one per `(round, address)` pair, enforced remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub id: u64,
    pub round_id: u64,
    pub address: String,
    pub username: String,
    pub guess: i64,
    pub pfp_url: String,
    pub submitted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub round_id: String,
    pub address: String,
    pub username: String,
    pub message: String,
    pub pfp_url: String,
    pub timestamp: i64,
    pub kind: MessageType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub id: u64,
    pub event_type: String,
    pub details: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeConfiguration {
    pub id: u8,
    pub jackpot_amount: i64,
    pub first_place_amount: i64,
    pub second_place_amount: i64,
    pub currency_type: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRecord {
    pub checkin_id: u64,
    pub user_identifier: String,
    pub username: String,
    pub pfp_url: String,
    pub checkin_date: i64,
    pub points_earned: i64,
    pub streak_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_identifier: String,
    pub username: String,
    pub pfp_url: String,
    pub weekly_checkins: u32,
    pub current_streak: i64,
    pub total_points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_status_loose_parse() {
        assert_eq!(RoundStatus::from_str_loose("open"), RoundStatus::Open);
        assert_eq!(RoundStatus::from_str_loose("closed"), RoundStatus::Closed);
        assert_eq!(
            RoundStatus::from_str_loose("finished"),
            RoundStatus::Finished
        );
        // Unknown degrades to closed, never to open
        assert_eq!(RoundStatus::from_str_loose("paused"), RoundStatus::Closed);
    }

    #[test]
    fn test_participant_id_parses_fid() {
        let id: ParticipantId = "fid-12345".parse().unwrap();
        assert_eq!(id, ParticipantId::Fid(12345));
        assert_eq!(id.to_string(), "fid-12345");
    }

    #[test]
    fn test_participant_id_parses_wallet_lowercased() {
        let id: ParticipantId = "0xAbCdEf0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        match id {
            ParticipantId::Wallet(addr) => {
                assert_eq!(addr, "0xabcdef0123456789abcdef0123456789abcdef01");
            }
            ParticipantId::Fid(_) => panic!("expected wallet"),
        }
    }

    #[test]
    fn test_participant_id_rejects_bad_shapes() {
        for bad in [
            "",
            "satoshi",
            "fid-",
            "fid-0",
            "fid--3",
            "fid-abc",
            "0x1234",                                      // too short
            "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz", // not hex
        ] {
            let res: Result<ParticipantId, _> = bad.parse();
            assert!(
                matches!(res, Err(GameError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_message_type_roundtrip() {
        for kind in [
            MessageType::Guess,
            MessageType::System,
            MessageType::Winner,
            MessageType::Chat,
        ] {
            assert_eq!(MessageType::from_str_loose(kind.as_str()), kind);
        }
    }
}
