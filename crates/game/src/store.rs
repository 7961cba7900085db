//! Reactive state store: the client-side projection of the remote tables.
//!
//! Populated by a bulk snapshot when the subscription is established and by
//! incremental insert/update frames afterwards. Inserts are idempotent
//! (deduplicated by primary id), updates replace the matching row, chat is
//! capped to the most recent rows by timestamp, and the prize configuration
//! is latest-row-wins. Derived views recompute on demand; change
//! notifications go out on a broadcast channel so observers are decoupled
//! from any UI framework. Single-owner, no interior locking.

use crate::checkin;
use crate::convert;
use crate::leaderboard;
use crate::model::{
    ChatMessage, CheckInRecord, Guess, LeaderboardEntry, LogEvent, PrizeConfiguration, Round,
    RoundStatus, UserStats,
};
use crate::remote::{ServerFrame, TableRow};
use tokio::sync::broadcast;

/// Which cached collection changed. Consumers recompute whatever derived
/// state depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Rounds,
    Guesses,
    Logs,
    Chat,
    PrizeConfig,
    UserStats,
    CheckIns,
}

pub struct GameStore {
    rounds: Vec<Round>,
    guesses: Vec<Guess>,
    logs: Vec<LogEvent>,
    chat_messages: Vec<ChatMessage>,
    prize_config: Option<PrizeConfiguration>,
    user_stats: Vec<UserStats>,
    checkins: Vec<CheckInRecord>,
    chat_history_limit: usize,
    leaderboard_window_days: u32,
    leaderboard_size: usize,
    changes_tx: broadcast::Sender<StoreChange>,
}

impl GameStore {
    pub fn new(chat_history_limit: usize, leaderboard_window_days: u32, leaderboard_size: usize) -> Self {
        let (changes_tx, _) = broadcast::channel(256);
        Self {
            rounds: Vec::new(),
            guesses: Vec::new(),
            logs: Vec::new(),
            chat_messages: Vec::new(),
            prize_config: None,
            user_stats: Vec::new(),
            checkins: Vec::new(),
            chat_history_limit,
            leaderboard_window_days,
            leaderboard_size,
            changes_tx,
        }
    }

    pub fn from_config(game: &common::config::Game) -> Self {
        Self::new(
            game.chat_history_limit,
            game.leaderboard_window_days,
            game.leaderboard_size,
        )
    }

    /// Subscribe to change notifications. Receivers that lag simply miss
    /// notifications and catch up on the next recompute.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes_tx.subscribe()
    }

    /// Apply one inbound frame from the remote channel.
    pub fn apply(&mut self, frame: &ServerFrame) {
        match frame {
            ServerFrame::Connected { .. } => {}
            ServerFrame::Snapshot { rows } => {
                for row in rows {
                    self.apply_row(row, false);
                }
            }
            ServerFrame::Insert { row } => self.apply_row(row, false),
            ServerFrame::Update { row } => self.apply_row(row, true),
        }
    }

    fn apply_row(&mut self, row: &TableRow, is_update: bool) {
        let change = match row {
            TableRow::Rounds(raw) => {
                let round = convert::convert_round(raw);
                if is_update {
                    upsert(&mut self.rounds, round, |r| r.id);
                } else if !insert_unique(&mut self.rounds, round, |r| r.id) {
                    return;
                }
                StoreChange::Rounds
            }
            TableRow::Guesses(raw) => {
                let guess = convert::convert_guess(raw);
                if !insert_unique(&mut self.guesses, guess, |g| g.id) {
                    return;
                }
                StoreChange::Guesses
            }
            TableRow::Logs(raw) => {
                let log = convert::convert_log(raw);
                if !insert_unique(&mut self.logs, log, |l| l.id) {
                    return;
                }
                StoreChange::Logs
            }
            TableRow::ChatMessages(raw) => {
                let msg = convert::convert_chat_message(raw);
                if self.chat_messages.iter().any(|m| m.id == msg.id) {
                    return;
                }
                // Newest first, capped to the history limit.
                let pos = self
                    .chat_messages
                    .iter()
                    .position(|m| m.timestamp <= msg.timestamp)
                    .unwrap_or(self.chat_messages.len());
                self.chat_messages.insert(pos, msg);
                self.chat_messages.truncate(self.chat_history_limit);
                StoreChange::Chat
            }
            TableRow::PrizeConfig(raw) => {
                // Singleton: the latest row wins regardless of insert/update.
                self.prize_config = Some(convert::convert_prize_config(raw));
                StoreChange::PrizeConfig
            }
            TableRow::UserStats(raw) => {
                let stats = convert::convert_user_stats(raw);
                upsert(&mut self.user_stats, stats, |s| s.user_identifier.clone());
                StoreChange::UserStats
            }
            TableRow::Checkins(raw) => {
                let record = convert::convert_checkin(raw);
                if !insert_unique(&mut self.checkins, record, |c| c.checkin_id) {
                    return;
                }
                StoreChange::CheckIns
            }
        };

        metrics::counter!("store_rows_applied", "table" => table_name(row)).increment(1);
        let _ = self.changes_tx.send(change);
    }

    // ── cached collections ──

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn logs(&self) -> &[LogEvent] {
        &self.logs
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        &self.chat_messages
    }

    pub fn prize_config(&self) -> Option<&PrizeConfiguration> {
        self.prize_config.as_ref()
    }

    pub fn checkins(&self) -> &[CheckInRecord] {
        &self.checkins
    }

    pub fn user_stats_for(&self, user_identifier: &str) -> Option<&UserStats> {
        self.user_stats
            .iter()
            .find(|s| s.user_identifier == user_identifier)
    }

    // ── derived views ──

    /// The single open round, if any. Uniqueness is a remote invariant; if it
    /// is ever violated the first cached open round wins.
    pub fn active_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|r| r.status == RoundStatus::Open)
    }

    pub fn round(&self, round_id: u64) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub fn guesses_for_round(&self, round_id: u64) -> Vec<&Guess> {
        self.guesses.iter().filter(|g| g.round_id == round_id).collect()
    }

    /// Advisory duplicate-guess guard; the authoritative uniqueness
    /// constraint lives remote-side.
    pub fn has_user_guessed(&self, round_id: u64, address: &str) -> bool {
        self.guesses
            .iter()
            .any(|g| g.round_id == round_id && g.address.eq_ignore_ascii_case(address))
    }

    pub fn has_checked_in_today(&self, user_identifier: &str, now_ms: i64) -> bool {
        let today = checkin::day_start(now_ms);
        self.checkins
            .iter()
            .any(|c| c.user_identifier == user_identifier && checkin::day_start(c.checkin_date) == today)
    }

    pub fn weekly_leaderboard(&self, now_ms: i64) -> Vec<LeaderboardEntry> {
        leaderboard::weekly_leaderboard(
            &self.checkins,
            &self.user_stats,
            self.leaderboard_window_days,
            now_ms,
            self.leaderboard_size,
        )
    }
}

fn table_name(row: &TableRow) -> &'static str {
    match row {
        TableRow::Rounds(_) => "rounds",
        TableRow::Guesses(_) => "guesses",
        TableRow::Logs(_) => "logs",
        TableRow::ChatMessages(_) => "chat_messages",
        TableRow::PrizeConfig(_) => "prize_config",
        TableRow::UserStats(_) => "user_stats",
        TableRow::Checkins(_) => "checkins",
    }
}

/// Append unless a row with the same id is already cached. Returns false on
/// a duplicate (idempotent insert).
fn insert_unique<T, K: PartialEq>(rows: &mut Vec<T>, row: T, key: impl Fn(&T) -> K) -> bool {
    let id = key(&row);
    if rows.iter().any(|r| key(r) == id) {
        return false;
    }
    rows.push(row);
    true
}

/// Replace the row with the same key, or append when no match exists (an
/// update for a row the snapshot never delivered).
fn upsert<T, K: PartialEq>(rows: &mut Vec<T>, row: T, key: impl Fn(&T) -> K) {
    let id = key(&row);
    if let Some(existing) = rows.iter_mut().find(|r| key(r) == id) {
        *existing = row;
    } else {
        rows.push(row);
    }
}
