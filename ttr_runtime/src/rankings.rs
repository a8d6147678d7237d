//! Tournament standings from completed-match records.
//!
//! A match counts as a win for the side with more sets and a loss for the
//! other; level set counts count for neither. Only players who appear in at
//! least one of the given matches are ranked.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::repository::{MatchRecord, Player};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub player_id: u64,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
}

/// Sorted by wins descending, losses ascending, then name.
pub fn compute_rankings(players: &[Player], matches: &[MatchRecord]) -> Vec<Ranking> {
    let mut tally: BTreeMap<u64, (u32, u32)> = BTreeMap::new();
    for m in matches {
        let (winner, loser) = match m.sets_player1.cmp(&m.sets_player2) {
            Ordering::Greater => (Some(m.player1_id), Some(m.player2_id)),
            Ordering::Less => (Some(m.player2_id), Some(m.player1_id)),
            Ordering::Equal => (None, None),
        };
        for id in [m.player1_id, m.player2_id] {
            let entry = tally.entry(id).or_default();
            if winner == Some(id) {
                entry.0 += 1;
            }
            if loser == Some(id) {
                entry.1 += 1;
            }
        }
    }

    let mut rankings: Vec<Ranking> = tally
        .into_iter()
        .map(|(player_id, (wins, losses))| Ranking {
            player_id,
            name: players
                .iter()
                .find(|p| p.id == player_id)
                .map(Player::full_name)
                .unwrap_or_else(|| format!("#{}", player_id)),
            wins,
            losses,
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.losses.cmp(&b.losses))
            .then_with(|| a.name.cmp(&b.name))
    });
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, first: &str) -> Player {
        Player {
            id,
            first_name: first.to_string(),
            last_name: String::new(),
        }
    }

    fn record(id: u64, p1: u64, p2: u64, s1: u32, s2: u32) -> MatchRecord {
        MatchRecord {
            id,
            player1_id: p1,
            player2_id: p2,
            sets_player1: s1,
            sets_player2: s2,
            tournament_id: Some(1),
            played_at_unix: 0,
        }
    }

    #[test]
    fn orders_by_wins_then_losses_then_name() {
        let players = [player(1, "Cleo"), player(2, "Ana"), player(3, "Ben"), player(4, "Dan")];
        let matches = [
            record(1, 1, 2, 3, 1),
            record(2, 3, 4, 0, 3),
            record(3, 1, 3, 3, 2),
            record(4, 2, 4, 3, 0),
        ];
        let table = compute_rankings(&players, &matches);
        let order: Vec<(&str, u32, u32)> = table
            .iter()
            .map(|r| (r.name.as_str(), r.wins, r.losses))
            .collect();
        assert_eq!(
            order,
            vec![("Cleo", 2, 0), ("Ana", 1, 1), ("Dan", 1, 1), ("Ben", 0, 2)]
        );
    }

    #[test]
    fn level_sets_count_for_nobody() {
        let players = [player(1, "A"), player(2, "B")];
        let table = compute_rankings(&players, &[record(1, 1, 2, 1, 1)]);
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.wins == 0 && r.losses == 0));
    }
}
