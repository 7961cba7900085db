//! Background round watcher.
//!
//! Ticks over the cached rounds and drives the round lifecycle forward:
//! open rounds past their end time get closed, and closed rounds with a
//! target block but no recorded result get settled against the block
//! explorer. All decisions are made on a snapshot of the cache; the store
//! lock is never held across network calls.

use crate::error::GameError;
use crate::model::{Guess, ParticipantId, Round, RoundStatus};
use crate::remote::{ReducerCall, Remote};
use crate::settlement;
use crate::store::GameStore;
use common::explorer::ExplorerClient;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct RoundWatcher {
    remote: Arc<dyn Remote>,
    explorer: ExplorerClient,
    tick_interval: Duration,
    // Rounds already acted on this session, so a slow remote echo does not
    // trigger duplicate calls on the next tick.
    ended: HashSet<u64>,
    settled: HashSet<u64>,
}

/// A closed round waiting for its block result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSettlement {
    pub round_id: u64,
    pub block_number: u64,
}

impl RoundWatcher {
    pub fn new(remote: Arc<dyn Remote>, explorer: ExplorerClient, tick_interval_ms: u64) -> Self {
        Self {
            remote,
            explorer,
            tick_interval: Duration::from_millis(tick_interval_ms),
            ended: HashSet::new(),
            settled: HashSet::new(),
        }
    }

    pub async fn run(mut self, store: Arc<Mutex<GameStore>>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval_ms = self.tick_interval.as_millis() as u64, "round watcher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("round watcher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick(&store).await;
                }
            }
        }
    }

    async fn tick(&mut self, store: &Mutex<GameStore>) {
        let now_ms = chrono::Utc::now().timestamp_millis();

        // Snapshot what this tick needs, then release the lock.
        let (expired, pending, guesses) = {
            let store = store.lock().await;
            let expired = expired_open_round(store.rounds(), now_ms)
                .filter(|id| !self.ended.contains(id));
            let pending = pending_settlement(store.rounds())
                .filter(|p| !self.settled.contains(&p.round_id));
            let guesses: Vec<Guess> = pending
                .as_ref()
                .map(|p| {
                    store
                        .guesses_for_round(p.round_id)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            (expired, pending, guesses)
        };

        if let Some(round_id) = expired {
            info!(round_id, "round past its end time, closing");
            match self.remote.call(ReducerCall::EndRoundManually { round_id }) {
                Ok(()) => {
                    self.ended.insert(round_id);
                }
                Err(e) => debug!(round_id, error = %e, "close deferred"),
            }
        }

        if let Some(pending) = pending {
            if let Err(e) = self.settle_round(&pending, &guesses).await {
                warn!(round_id = pending.round_id, error = %e, "settlement attempt failed");
            }
        }
    }

    async fn settle_round(
        &mut self,
        pending: &PendingSettlement,
        guesses: &[Guess],
    ) -> anyhow::Result<()> {
        let block_hash = self
            .explorer
            .block_hash_at_height(pending.block_number)
            .await?;
        let actual_tx_count = self.explorer.tx_count(&block_hash).await? as i64;
        info!(
            round_id = pending.round_id,
            block = pending.block_number,
            actual_tx_count,
            "target block resolved"
        );

        let outcome = match settlement::settle(guesses, actual_tx_count) {
            Ok(outcome) => outcome,
            Err(GameError::NoEntries) => {
                // Nothing to rank; leave the round closed and stop retrying.
                warn!(round_id = pending.round_id, "no guesses to settle");
                self.settled.insert(pending.round_id);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let winning_fid = outcome
            .winner
            .guess
            .address
            .parse::<ParticipantId>()
            .ok()
            .and_then(|p| p.fid());
        let Some(winning_fid) = winning_fid else {
            // Guess addresses are always fid-form; anything else is a cache
            // anomaly worth surfacing.
            error!(
                round_id = pending.round_id,
                winner = %outcome.winner.guess.address,
                "winner has no farcaster identity, skipping result"
            );
            self.settled.insert(pending.round_id);
            return Ok(());
        };

        info!(
            round_id = pending.round_id,
            winning_fid,
            diff = outcome.winner.diff,
            "recording settled result"
        );
        self.remote.call(ReducerCall::UpdateRoundResult {
            round_id: pending.round_id,
            actual_tx_count,
            block_hash,
            winning_fid,
        })?;
        self.settled.insert(pending.round_id);
        metrics::counter!("rounds_settled").increment(1);
        Ok(())
    }
}

/// The open round whose end time has passed, if any.
pub fn expired_open_round(rounds: &[Round], now_ms: i64) -> Option<u64> {
    rounds
        .iter()
        .find(|r| r.status == RoundStatus::Open && now_ms >= r.end_time)
        .map(|r| r.id)
}

/// A closed round with a target block but no recorded result yet.
pub fn pending_settlement(rounds: &[Round]) -> Option<PendingSettlement> {
    rounds
        .iter()
        .filter(|r| r.status == RoundStatus::Closed && r.actual_tx_count.is_none())
        .find_map(|r| {
            let block_number = r.block_number?;
            u64::try_from(block_number).ok().map(|block_number| PendingSettlement {
                round_id: r.id,
                block_number,
            })
        })
}
