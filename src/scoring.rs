//! Scoring collaborator
//!
//! The orchestrator only sees the [`Scoring`] trait. [`Scoreboard`] is the
//! basic implementation: flat points per target kind, top-three placement
//! points per round and a win for the round leader.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::round::PlayerId;
use crate::settings::GameMode;
use crate::sim::target::TargetKind;

/// Placement points for 1st, 2nd and 3rd in a round
pub const PLACEMENT_POINTS: [u32; 3] = [3, 2, 1];

/// One player's finish in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub player_id: PlayerId,
    /// 1-based
    pub place: u32,
    pub score: u32,
    pub points: u32,
}

/// Outcome handed back when a round is finalized
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub winner_id: Option<PlayerId>,
    pub placements: Vec<Placement>,
}

/// Game-long totals for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub player_id: PlayerId,
    pub score: u32,
    pub wins: u32,
    pub leaderboard_points: u32,
}

pub trait Scoring {
    /// Clear per-round scores
    fn start_new_round(&mut self);

    /// Credit a hit; returns the damage to apply to the target
    fn register_hit(&mut self, player: PlayerId, kind: TargetKind, distance: f32) -> u32;

    /// Finalize the current round
    fn handle_round_end(&mut self) -> RoundResult;

    /// Game total
    fn score(&self, player: PlayerId) -> u32;
    fn wins(&self, player: PlayerId) -> u32;
    fn leaderboard_points(&self, player: PlayerId) -> u32;

    /// Forget everything (new game)
    fn reset(&mut self);
}

/// Sort standings for display: placement points, then wins, then score
pub fn rank_standings(standings: &mut [Standing]) {
    standings.sort_by(|a, b| {
        b.leaderboard_points
            .cmp(&a.leaderboard_points)
            .then(b.wins.cmp(&a.wins))
            .then(b.score.cmp(&a.score))
            .then(a.player_id.cmp(&b.player_id))
    });
}

/// Collect standings for `players` from a scoring collaborator
pub fn standings_for(scoring: &dyn Scoring, players: &[PlayerId]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players
        .iter()
        .map(|&player_id| Standing {
            player_id,
            score: scoring.score(player_id),
            wins: scoring.wins(player_id),
            leaderboard_points: scoring.leaderboard_points(player_id),
        })
        .collect();
    rank_standings(&mut standings);
    standings
}

#[derive(Debug, Clone, Default)]
struct PlayerTotals {
    score: u32,
    wins: u32,
    points: u32,
}

/// Basic in-memory scoring
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    mode: GameMode,
    round: BTreeMap<PlayerId, u32>,
    totals: BTreeMap<PlayerId, PlayerTotals>,
}

impl Scoreboard {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn round_score(&self, player: PlayerId) -> u32 {
        self.round.get(&player).copied().unwrap_or(0)
    }

    // Per-mode normalization is switched off; round scores compare raw.
    fn normalized(&self, raw: u32) -> u32 {
        raw
    }
}

impl Scoring for Scoreboard {
    fn start_new_round(&mut self) {
        self.round.clear();
    }

    fn register_hit(&mut self, player: PlayerId, kind: TargetKind, _distance: f32) -> u32 {
        let points = kind.profile().hit_points;
        *self.round.entry(player).or_insert(0) += points;
        self.totals.entry(player).or_default().score += points;
        1
    }

    fn handle_round_end(&mut self) -> RoundResult {
        let mut ranked: Vec<(PlayerId, u32)> = self
            .round
            .iter()
            .map(|(&p, &s)| (p, self.normalized(s)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let placements: Vec<Placement> = ranked
            .iter()
            .enumerate()
            .map(|(i, &(player_id, score))| Placement {
                player_id,
                place: i as u32 + 1,
                score,
                points: PLACEMENT_POINTS.get(i).copied().unwrap_or(0),
            })
            .collect();

        for p in &placements {
            self.totals.entry(p.player_id).or_default().points += p.points;
        }

        let winner_id = placements.first().filter(|p| p.score > 0).map(|p| p.player_id);
        if let Some(winner) = winner_id {
            self.totals.entry(winner).or_default().wins += 1;
        }

        RoundResult { winner_id, placements }
    }

    fn score(&self, player: PlayerId) -> u32 {
        self.totals.get(&player).map(|t| t.score).unwrap_or(0)
    }

    fn wins(&self, player: PlayerId) -> u32 {
        self.totals.get(&player).map(|t| t.wins).unwrap_or(0)
    }

    fn leaderboard_points(&self, player: PlayerId) -> u32 {
        self.totals.get(&player).map(|t| t.points).unwrap_or(0)
    }

    fn reset(&mut self) {
        self.round.clear();
        self.totals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);
    const D: PlayerId = PlayerId(4);

    #[test]
    fn test_hits_accumulate() {
        let mut board = Scoreboard::new(GameMode::Multiplayer);
        assert_eq!(board.register_hit(A, TargetKind::Static, 5.0), 1);
        board.register_hit(A, TargetKind::Parabolic, 20.0);
        assert_eq!(board.round_score(A), 45);
        assert_eq!(board.score(A), 45);
        assert_eq!(board.score(B), 0);
    }

    #[test]
    fn test_round_end_placements() {
        let mut board = Scoreboard::new(GameMode::Multiplayer);
        board.start_new_round();
        for (player, hits) in [(A, 1), (B, 3), (C, 2), (D, 1)] {
            for _ in 0..hits {
                board.register_hit(player, TargetKind::Static, 1.0);
            }
        }
        let result = board.handle_round_end();
        assert_eq!(result.winner_id, Some(B));
        let order: Vec<_> = result.placements.iter().map(|p| p.player_id).collect();
        assert_eq!(order, vec![B, C, A, D]);
        let points: Vec<_> = result.placements.iter().map(|p| p.points).collect();
        assert_eq!(points, vec![3, 2, 1, 0]);
        assert_eq!(board.wins(B), 1);
        assert_eq!(board.leaderboard_points(C), 2);
    }

    #[test]
    fn test_round_scores_reset_but_totals_persist() {
        let mut board = Scoreboard::new(GameMode::Solo);
        board.register_hit(A, TargetKind::Wander, 1.0);
        board.handle_round_end();
        board.start_new_round();
        assert_eq!(board.round_score(A), 0);
        assert_eq!(board.score(A), 15);
        assert_eq!(board.handle_round_end().winner_id, None);
        board.reset();
        assert_eq!(board.leaderboard_points(A), 0);
    }

    #[test]
    fn test_standings_sorted_by_points() {
        let mut board = Scoreboard::new(GameMode::Multiplayer);
        board.register_hit(B, TargetKind::Static, 1.0);
        board.handle_round_end();
        let standings = standings_for(&board, &[A, B]);
        assert_eq!(standings[0].player_id, B);
        assert_eq!(standings[0].leaderboard_points, 3);
        assert_eq!(standings[1].player_id, A);
    }
}
