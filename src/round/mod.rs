//! Round lifecycle
//!
//! The [`RoundOrchestrator`] is a timer-driven state machine. It owns a
//! [`Timers`](crate::sim::Timers) wheel and the arena, and talks to the host
//! only through [`ArenaHost`] (player enumeration and UI delivery).

pub mod orchestrator;
pub mod players;
pub mod spawner;
pub mod transition;

pub use orchestrator::RoundOrchestrator;
pub use players::PlayerTracker;
pub use spawner::{RoundSpawner, spawns_needed};
pub use transition::RoundTransition;

use serde::{Deserialize, Serialize};

use crate::ui::UiMessage;

/// Player identifier assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

/// What the orchestrator needs from the hosting world
pub trait ArenaHost {
    /// Players currently present, in a stable order
    fn player_ids(&self) -> Vec<PlayerId>;

    /// Deliver a UI payload to one player
    fn send_data(&mut self, player: PlayerId, message: &UiMessage);

    fn player_count(&self) -> usize {
        self.player_ids().len()
    }

    fn broadcast(&mut self, message: &UiMessage) {
        for player in self.player_ids() {
            self.send_data(player, message);
        }
    }
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    Idle,
    WaitingForPlayers,
    Countdown,
    RoundActive,
    /// Round over, cooling down before the next countdown
    Transition,
    GameEnd,
}

/// Scheduled work; each variant is dispatched by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CountdownDone,
    RoundEnd,
    RoundUpdate,
    TransitionEnd,
    InitialSpawn,
    SpawnTick,
    PlayerPoll,
    GameEndReset,
    RestartAfterReset,
}
