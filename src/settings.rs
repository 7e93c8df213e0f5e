//! Game and round configuration
//!
//! Configuration is immutable once an orchestrator is built. Everything here
//! round-trips through JSON so hosts can ship tuning as data.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::bounds::MovementBounds;
use crate::sim::movement::VerticalBand;
use crate::sim::target::TargetKind;

/// Configuration validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_rounds must be at least 1")]
    NoRounds,
    #[error("required_players must be at least 1")]
    NoPlayersRequired,
    #[error("round table is empty")]
    EmptyRoundTable,
    #[error("round {round}: min_targets ({min}) exceeds max_targets ({max})")]
    TargetRange { round: usize, min: u32, max: u32 },
    #[error("round {round}: duration must be positive")]
    ZeroDuration { round: usize },
    #[error("round {round}: spawn interval must be positive")]
    ZeroSpawnInterval { round: usize },
    #[error("round {round}: no block type has a positive weight")]
    NoBlockWeights { round: usize },
    #[error("round {round}: speed multiplier must be a positive number, got {value}")]
    BadSpeedMultiplier { round: usize, value: f32 },
    #[error("layout: {field} is not finite")]
    NonFiniteLayout { field: &'static str },
    #[error("layout: vertical band {min_y}..{max_y} (start {start_y}) is inverted or outside the movement bounds")]
    BadVerticalBand { min_y: f32, max_y: f32, start_y: f32 },
    #[error("layout: safe spawn position {0} is outside the movement bounds")]
    SafeSpawnOutside(Vec3),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Solo,
    #[default]
    Multiplayer,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Solo => "solo",
            GameMode::Multiplayer => "multiplayer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" | "single" => Some(GameMode::Solo),
            "multiplayer" | "multi" => Some(GameMode::Multiplayer),
            _ => None,
        }
    }

    /// Players needed before a fresh game may start
    pub fn required_players(&self) -> usize {
        match self {
            GameMode::Solo => 1,
            GameMode::Multiplayer => 2,
        }
    }
}

/// Whole-game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub max_rounds: u32,
    pub required_players: usize,
    /// Cooldown between a round ending and the next countdown
    pub transition_duration_ms: u64,
    pub mode: GameMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::multiplayer()
    }
}

impl GameConfig {
    pub fn solo() -> Self {
        Self::for_mode(GameMode::Solo)
    }

    pub fn multiplayer() -> Self {
        Self::for_mode(GameMode::Multiplayer)
    }

    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            max_rounds: 3,
            required_players: mode.required_players(),
            transition_duration_ms: 5000,
            mode,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.required_players == 0 {
            return Err(ConfigError::NoPlayersRequired);
        }
        Ok(())
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-round tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    pub duration_ms: u64,
    pub min_targets: u32,
    pub max_targets: u32,
    pub block_spawn_interval_ms: u64,
    pub speed_multiplier: f32,
    /// Relative spawn weights (need not sum to 1)
    pub block_types: Vec<(TargetKind, f32)>,
}

impl RoundConfig {
    fn validate(&self, round: usize) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration { round });
        }
        if self.block_spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroSpawnInterval { round });
        }
        if self.min_targets > self.max_targets {
            return Err(ConfigError::TargetRange {
                round,
                min: self.min_targets,
                max: self.max_targets,
            });
        }
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0) {
            return Err(ConfigError::BadSpeedMultiplier {
                round,
                value: self.speed_multiplier,
            });
        }
        if !self.block_types.iter().any(|(_, w)| *w > 0.0) {
            return Err(ConfigError::NoBlockWeights { round });
        }
        Ok(())
    }
}

/// Round configs indexed by 1-based round number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoundConfig>", into = "Vec<RoundConfig>")]
pub struct RoundTable {
    rounds: Vec<RoundConfig>,
}

impl TryFrom<Vec<RoundConfig>> for RoundTable {
    type Error = ConfigError;

    fn try_from(rounds: Vec<RoundConfig>) -> Result<Self, Self::Error> {
        Self::new(rounds)
    }
}

impl From<RoundTable> for Vec<RoundConfig> {
    fn from(table: RoundTable) -> Self {
        table.rounds
    }
}

impl Default for RoundTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoundTable {
    pub fn new(rounds: Vec<RoundConfig>) -> Result<Self, ConfigError> {
        if rounds.is_empty() {
            return Err(ConfigError::EmptyRoundTable);
        }
        for (i, round) in rounds.iter().enumerate() {
            round.validate(i + 1)?;
        }
        Ok(Self { rounds })
    }

    /// Built-in progression: static-heavy first round, more movers later
    pub fn standard() -> Self {
        use TargetKind::*;
        Self {
            rounds: vec![
                RoundConfig {
                    duration_ms: 60_000,
                    min_targets: 4,
                    max_targets: 8,
                    block_spawn_interval_ms: 3000,
                    speed_multiplier: 1.0,
                    block_types: vec![(Static, 0.5), (Wander, 0.3), (Horizontal, 0.2)],
                },
                RoundConfig {
                    duration_ms: 60_000,
                    min_targets: 5,
                    max_targets: 10,
                    block_spawn_interval_ms: 2500,
                    speed_multiplier: 1.2,
                    block_types: vec![
                        (Static, 0.2),
                        (Wander, 0.25),
                        (Horizontal, 0.2),
                        (Vertical, 0.15),
                        (PopUp, 0.2),
                    ],
                },
                RoundConfig {
                    duration_ms: 75_000,
                    min_targets: 6,
                    max_targets: 12,
                    block_spawn_interval_ms: 2000,
                    speed_multiplier: 1.4,
                    block_types: vec![
                        (Static, 0.1),
                        (Wander, 0.15),
                        (Horizontal, 0.15),
                        (Vertical, 0.15),
                        (PopUp, 0.15),
                        (Rising, 0.1),
                        (Parabolic, 0.1),
                        (Pendulum, 0.1),
                    ],
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Config for 1-based `round`; rounds past the table reuse the last entry
    pub fn for_round(&self, round: u32) -> &RoundConfig {
        let idx = (round.max(1) as usize - 1).min(self.rounds.len() - 1);
        if idx + 1 != round.max(1) as usize {
            log::debug!("Round {} beyond table, using round {} config", round, idx + 1);
        }
        &self.rounds[idx]
    }
}

/// Static arena geometry used for spawning and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaLayout {
    /// Volume moving targets live in
    pub movement_bounds: MovementBounds,
    /// Wide open area for static targets
    pub static_spawn_area: MovementBounds,
    /// Solid platforms (targets keep clear of their edges)
    pub platforms: Vec<MovementBounds>,
    /// Floor height; pop-up and rising targets start here
    pub ground_y: f32,
    pub vertical_band: VerticalBand,
    /// Used when no clear spot is found
    pub safe_spawn_position: Vec3,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            movement_bounds: MovementBounds::new(Vec3::new(-30.0, 2.0, -30.0), Vec3::new(30.0, 18.0, 30.0)),
            static_spawn_area: MovementBounds::new(Vec3::new(-40.0, 1.0, -40.0), Vec3::new(40.0, 12.0, 40.0)),
            platforms: vec![
                MovementBounds::new(Vec3::new(-6.0, 0.0, -6.0), Vec3::new(6.0, 1.5, 6.0)),
                MovementBounds::new(Vec3::new(18.0, 0.0, 18.0), Vec3::new(26.0, 4.0, 26.0)),
                MovementBounds::new(Vec3::new(-26.0, 0.0, 18.0), Vec3::new(-18.0, 4.0, 26.0)),
            ],
            ground_y: 2.0,
            vertical_band: VerticalBand {
                min_y: 4.0,
                max_y: 14.0,
                start_y: 8.0,
            },
            safe_spawn_position: Vec3::new(0.0, 10.0, -14.0),
        }
    }
}

impl ArenaLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let boxes = [
            ("movementBounds", &self.movement_bounds),
            ("staticSpawnArea", &self.static_spawn_area),
        ];
        for (field, bounds) in boxes {
            if !bounds.is_finite() {
                return Err(ConfigError::NonFiniteLayout { field });
            }
        }
        if !self.platforms.iter().all(MovementBounds::is_finite) {
            return Err(ConfigError::NonFiniteLayout { field: "platforms" });
        }
        if !self.ground_y.is_finite() {
            return Err(ConfigError::NonFiniteLayout { field: "groundY" });
        }
        if !self.safe_spawn_position.is_finite() {
            return Err(ConfigError::NonFiniteLayout {
                field: "safeSpawnPosition",
            });
        }

        let band = self.vertical_band;
        let bounds = &self.movement_bounds;
        let ordered = band.min_y <= band.start_y && band.start_y <= band.max_y;
        let inside = !bounds.constrains_axis(1) || (band.min_y >= bounds.min.y && band.max_y <= bounds.max.y);
        if !(band.min_y.is_finite() && band.max_y.is_finite() && band.start_y.is_finite() && ordered && inside) {
            return Err(ConfigError::BadVerticalBand {
                min_y: band.min_y,
                max_y: band.max_y,
                start_y: band.start_y,
            });
        }
        if !bounds.contains(self.safe_spawn_position) {
            return Err(ConfigError::SafeSpawnOutside(self.safe_spawn_position));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
