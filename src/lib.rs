//! Arena Targets - simulation core for an arena shooting mini-game
//!
//! Core modules:
//! - `sim`: Per-tick target simulation (movement behaviors, arena, timers)
//! - `round`: Round lifecycle (orchestrator, spawner, player tracking, transitions)
//! - `settings`: Game/round configuration and arena layout
//! - `scoring`: Scoring collaborator contract and a basic scoreboard
//! - `audio`: Audio cue collaborator
//! - `ui`: UI payloads sent to players

pub mod audio;
pub mod round;
pub mod scoring;
pub mod settings;
pub mod sim;
pub mod ui;

pub use round::{ArenaHost, PlayerId, RoundOrchestrator, RoundPhase};
pub use settings::{ArenaLayout, ConfigError, GameConfig, GameMode, RoundConfig, RoundTable};

use glam::Vec3;

/// Tuning constants
pub mod consts {
    /// Fixed simulation step used by the demo host (62.5 Hz)
    pub const SIM_DT_MS: u64 = 16;

    // === Wander ===
    /// Reversals closer together than this are ignored (prevents visible jitter)
    pub const REVERSAL_COOLDOWN_MS: f32 = 800.0;
    /// Bob amplitude range for wandering targets
    pub const WANDER_BOB_AMPLITUDE_MIN: f32 = 1.0;
    pub const WANDER_BOB_AMPLITUDE_MAX: f32 = 3.0;
    /// Bob frequency (Hz)
    pub const WANDER_BOB_FREQUENCY: f32 = 0.4;

    // === Anti-stuck ===
    /// Number of recent positions kept for stuck detection
    pub const POSITION_HISTORY_LEN: usize = 10;
    /// Average per-tick displacement below this counts as a stuck check
    pub const STUCK_DISPLACEMENT_THRESHOLD: f32 = 0.01;
    /// Consecutive stuck checks before escape mode kicks in
    pub const STUCK_CHECKS_TO_ESCAPE: u32 = 5;
    /// Boundary contacts inside the ping-pong window that trigger escape
    pub const PING_PONG_CONTACTS: usize = 3;
    pub const PING_PONG_WINDOW_MS: f32 = 1500.0;
    /// Escape mode duration
    pub const ESCAPE_DURATION_MS: f32 = 2000.0;
    /// Immediate positional push applied when escape starts
    pub const ESCAPE_PUSH_DISTANCE: f32 = 0.5;
    /// Escape travels faster than normal motion so the correction reads clearly
    pub const ESCAPE_SPEED_MULTIPLIER: f32 = 1.5;
    /// Floor for escape speed (zero-speed targets still get unstuck)
    pub const ESCAPE_MIN_SPEED: f32 = 2.0;

    // === Sine wave ===
    pub const HORIZONTAL_WAVE_SMOOTHING: f32 = 0.1;
    /// Gentler smoothing for vertical waves to avoid height snapping
    pub const VERTICAL_WAVE_SMOOTHING: f32 = 0.03;

    // === Lift (pop-up / rising) ===
    pub const POPUP_RISE_MULTIPLIER: f32 = 2.0;
    pub const RISING_SHOOT_MULTIPLIER: f32 = 4.0;

    // === Spawning ===
    /// Delay between staggered initial spawns
    pub const INITIAL_SPAWN_STAGGER_MS: u64 = 1000;
    /// Fast interval as a fraction of the configured interval
    pub const FAST_SPAWN_INTERVAL_FACTOR: f32 = 0.6;
    /// Extra targets per additional player (0.0 disables player scaling)
    pub const PLAYER_SCALING_FACTOR: f32 = 0.0;
    /// Moving targets keep this far inside their movement bounds at spawn
    pub const SPAWN_SAFETY_MARGIN: f32 = 2.0;
    /// Minimum horizontal distance from any platform edge
    pub const PLATFORM_EDGE_CLEARANCE: f32 = 1.5;
    /// Minimum distance between a new target and existing ones
    pub const MIN_TARGET_SPACING: f32 = 3.0;
    pub const SPAWN_PLACEMENT_ATTEMPTS: u32 = 10;

    // === Rounds ===
    /// Settling delay between a start request and the round going live
    pub const COUNTDOWN_MS: u64 = 3000;
    /// Player poll period while waiting for players
    pub const PLAYER_POLL_INTERVAL_MS: u64 = 1000;
    /// Round update broadcast period
    pub const ROUND_UPDATE_INTERVAL_MS: u64 = 1000;
    /// Standings are shown this long before the game resets
    pub const GAME_END_RESET_DELAY_MS: u64 = 10_000;
    /// Delay before a reset game restarts when players are already present
    pub const RESET_RESTART_DELAY_MS: u64 = 2000;

    /// Damage applied per hit when no scoring collaborator is available
    pub const FALLBACK_HIT_DAMAGE: u32 = 1;
}

/// Milliseconds to whole seconds, rounded up (UI countdowns never show 0 early)
#[inline]
pub fn ms_to_display_secs(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

/// Unit direction in the XZ plane from an angle (radians)
#[inline]
pub fn planar_direction(theta: f32) -> Vec3 {
    Vec3::new(theta.cos(), 0.0, theta.sin())
}

/// Horizontal unit vector perpendicular to `dir` (falls back to +X)
#[inline]
pub fn horizontal_perpendicular(dir: Vec3) -> Vec3 {
    let perp = Vec3::new(-dir.z, 0.0, dir.x);
    if perp.length_squared() < 1e-6 {
        Vec3::X
    } else {
        perp.normalize()
    }
}
