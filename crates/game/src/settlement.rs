//! Round settlement: rank guesses against the actual transaction count of the
//! target block. Closest absolute difference wins; ties go to the earliest
//! submission. The sort is stable, so a full tie (not expected given the
//! one-guess-per-address constraint) preserves insertion order.

use crate::error::GameError;
use crate::model::Guess;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGuess {
    pub guess: Guess,
    pub diff: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub ranked: Vec<RankedGuess>,
    pub winner: RankedGuess,
    pub runner_up: Option<RankedGuess>,
}

pub fn settle(guesses: &[Guess], actual_tx_count: i64) -> Result<RoundOutcome, GameError> {
    if guesses.is_empty() {
        return Err(GameError::NoEntries);
    }

    let mut ranked: Vec<RankedGuess> = guesses
        .iter()
        .map(|g| RankedGuess {
            diff: g.guess.abs_diff(actual_tx_count),
            guess: g.clone(),
        })
        .collect();
    ranked.sort_by_key(|r| (r.diff, r.guess.submitted_at));

    let winner = ranked[0].clone();
    let runner_up = ranked.get(1).cloned();

    Ok(RoundOutcome {
        ranked,
        winner,
        runner_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_guess(id: u64, fid: i64, guess: i64, submitted_at: i64) -> Guess {
        Guess {
            id,
            round_id: 1,
            address: format!("fid-{fid}"),
            username: format!("user{fid}"),
            guess,
            pfp_url: String::new(),
            submitted_at,
        }
    }

    #[test]
    fn test_settle_empty_fails() {
        for actual in [0, 1, 3000] {
            assert_eq!(settle(&[], actual), Err(GameError::NoEntries));
        }
    }

    #[test]
    fn test_settle_single_guess() {
        let guesses = vec![make_guess(1, 100, 2500, 1000)];
        let outcome = settle(&guesses, 3000).unwrap();
        assert_eq!(outcome.winner.guess.address, "fid-100");
        assert_eq!(outcome.winner.diff, 500);
        assert!(outcome.runner_up.is_none());
        assert_eq!(outcome.ranked.len(), 1);
    }

    #[test]
    fn test_settle_closest_wins_earliest_breaks_ties() {
        // A guesses exactly; B and C are both off by 5, B submitted earlier.
        let guesses = vec![
            make_guess(1, 1, 100, 1000), // A: diff 0
            make_guess(2, 2, 105, 500),  // B: diff 5, t=500
            make_guess(3, 3, 95, 2000),  // C: diff 5, t=2000
        ];
        let outcome = settle(&guesses, 100).unwrap();
        let order: Vec<&str> = outcome
            .ranked
            .iter()
            .map(|r| r.guess.address.as_str())
            .collect();
        assert_eq!(order, vec!["fid-1", "fid-2", "fid-3"]);
        assert_eq!(outcome.winner.guess.address, "fid-1");
        assert_eq!(outcome.runner_up.unwrap().guess.address, "fid-2");
    }

    #[test]
    fn test_settle_overshoot_and_undershoot_rank_equally() {
        let guesses = vec![
            make_guess(1, 1, 2990, 2000), // diff 10, later
            make_guess(2, 2, 3010, 1000), // diff 10, earlier
        ];
        let outcome = settle(&guesses, 3000).unwrap();
        assert_eq!(outcome.winner.guess.address, "fid-2");
    }

    #[test]
    fn test_settle_ordering_invariant_holds() {
        let guesses = vec![
            make_guess(1, 1, 42, 900),
            make_guess(2, 2, 0, 100),
            make_guess(3, 3, 9000, 300),
            make_guess(4, 4, 41, 800),
            make_guess(5, 5, 43, 700),
        ];
        let outcome = settle(&guesses, 42).unwrap();
        for pair in outcome.ranked.windows(2) {
            let (x, y) = (&pair[0], &pair[1]);
            assert!(
                x.diff < y.diff
                    || (x.diff == y.diff && x.guess.submitted_at <= y.guess.submitted_at),
                "ranking violated between {} and {}",
                x.guess.address,
                y.guess.address
            );
        }
    }

    #[test]
    fn test_settle_full_tie_preserves_insertion_order() {
        // Same diff and same timestamp: stable sort keeps input order.
        let guesses = vec![
            make_guess(1, 1, 95, 1000),
            make_guess(2, 2, 105, 1000),
        ];
        let outcome = settle(&guesses, 100).unwrap();
        assert_eq!(outcome.winner.guess.address, "fid-1");
    }

    #[test]
    fn test_settle_input_not_mutated() {
        let guesses = vec![make_guess(1, 1, 50, 200), make_guess(2, 2, 10, 100)];
        let snapshot = guesses.clone();
        let _ = settle(&guesses, 10).unwrap();
        assert_eq!(guesses, snapshot);
    }
}
