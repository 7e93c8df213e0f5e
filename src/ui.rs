//! UI payloads sent to players
//!
//! Serialized as JSON objects tagged by `type` with camelCase fields, e.g.
//! `{"type":"roundUpdate","round":1,"totalRounds":3,...}`. Times are whole
//! seconds.

use serde::{Deserialize, Serialize};

use crate::round::PlayerId;
use crate::scoring::{Placement, Standing};
use crate::settings::GameMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_rounds: u32,
    pub completed_rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiMessage {
    RoundUpdate {
        round: u32,
        total_rounds: u32,
        remaining_rounds: u32,
        time_remaining: u64,
    },
    RoundEnd {
        round: u32,
        total_rounds: u32,
        /// Absent after the final round
        next_round_in: Option<u64>,
        winner_id: Option<PlayerId>,
        placements: Vec<Placement>,
    },
    WaitingForPlayers {
        current: usize,
        required: usize,
        remaining: usize,
    },
    GameEnd {
        winner: Option<PlayerId>,
        standings: Vec<Standing>,
        stats: GameStats,
        next_game_in: u64,
    },
    /// First player into an empty arena picks the mode
    ModeSelection {
        player_id: PlayerId,
        modes: Vec<GameMode>,
    },
    LeaderboardUpdate {
        entries: Vec<Standing>,
    },
}

impl UiMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            UiMessage::RoundUpdate { .. } => "roundUpdate",
            UiMessage::RoundEnd { .. } => "roundEnd",
            UiMessage::WaitingForPlayers { .. } => "waitingForPlayers",
            UiMessage::GameEnd { .. } => "gameEnd",
            UiMessage::ModeSelection { .. } => "modeSelection",
            UiMessage::LeaderboardUpdate { .. } => "leaderboardUpdate",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
