//! Adaptive target spawner
//!
//! Keeps the live population between the round's min and max. A staggered
//! burst fills up to the minimum, then a recurring tick tops up using
//! [`spawns_needed`]. If the population collapses below half the minimum the
//! tick interval drops to 60% for the rest of the round.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::planar_direction;
use crate::settings::{ArenaLayout, RoundConfig};
use crate::sim::arena::Arena;
use crate::sim::movement::MovementBehavior;
use crate::sim::target::{TargetBody, TargetId, TargetKind};
use crate::sim::timer::{TimerId, Timers};

use super::TimerEvent;

/// Targets to add this tick given `live` targets and the scaled population range
pub fn spawns_needed(live: u32, min: u32, max: u32) -> u32 {
    if live >= max {
        return 0;
    }
    let wanted = if live == 0 {
        3
    } else if live == 1 || live < min {
        2
    } else {
        // Below a quarter of max or not, keep trickling one at a time
        1
    };
    wanted.min(max - live)
}

/// Population range scaled by player count
pub fn scaled_range(min: u32, max: u32, player_count: usize) -> (u32, u32) {
    let scale = 1.0 + PLAYER_SCALING_FACTOR * player_count.saturating_sub(1) as f32;
    let min = (min as f32 * scale).ceil() as u32;
    let max = ((max as f32 * scale).ceil() as u32).max(min);
    (min, max)
}

#[derive(Debug, Clone)]
pub struct RoundSpawner {
    layout: ArenaLayout,
    rng: Pcg32,
    config: Option<RoundConfig>,
    min_targets: u32,
    max_targets: u32,
    interval_ms: u64,
    fast_mode: bool,
    initial_remaining: u32,
    initial_timer: Option<TimerId>,
    tick_timer: Option<TimerId>,
}

impl RoundSpawner {
    pub fn new(layout: ArenaLayout, seed: u64) -> Self {
        Self {
            layout,
            rng: Pcg32::seed_from_u64(seed),
            config: None,
            min_targets: 0,
            max_targets: 0,
            interval_ms: 0,
            fast_mode: false,
            initial_remaining: 0,
            initial_timer: None,
            tick_timer: None,
        }
    }

    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    pub fn is_spawning(&self) -> bool {
        self.tick_timer.is_some()
    }

    pub fn is_fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Scaled (min, max) for the current round
    pub fn population_range(&self) -> (u32, u32) {
        (self.min_targets, self.max_targets)
    }

    /// Clear the arena and begin populating it for a new round
    pub fn start_spawning(
        &mut self,
        config: &RoundConfig,
        player_count: usize,
        arena: &mut Arena,
        timers: &mut Timers<TimerEvent>,
    ) {
        self.stop_spawning(timers);
        let cleared = arena.clear();
        if cleared > 0 {
            log::debug!("Cleared {} leftover targets", cleared);
        }

        let (min, max) = scaled_range(config.min_targets, config.max_targets, player_count);
        self.min_targets = min;
        self.max_targets = max;
        self.interval_ms = config.block_spawn_interval_ms;
        self.fast_mode = false;
        self.config = Some(config.clone());

        // Burst: one now, the rest one per second
        self.initial_remaining = min;
        if self.initial_remaining > 0 {
            self.spawn_initial(arena, timers.now_ms());
            if self.initial_remaining > 0 {
                self.initial_timer = Some(timers.set_interval(INITIAL_SPAWN_STAGGER_MS, TimerEvent::InitialSpawn));
            }
        }
        self.tick_timer = Some(timers.set_interval(self.interval_ms, TimerEvent::SpawnTick));
        log::info!(
            "Spawning started: {}..{} targets every {} ms",
            min,
            max,
            self.interval_ms
        );
    }

    fn spawn_initial(&mut self, arena: &mut Arena, now_ms: u64) {
        self.initial_remaining = self.initial_remaining.saturating_sub(1);
        if (arena.live_count() as u32) < self.min_targets {
            self.spawn_one(arena, now_ms);
        }
    }

    /// Staggered burst step
    pub fn on_initial_spawn(&mut self, arena: &mut Arena, timers: &mut Timers<TimerEvent>) {
        if self.config.is_none() {
            return;
        }
        self.spawn_initial(arena, timers.now_ms());
        if self.initial_remaining == 0 {
            timers.clear_slot(&mut self.initial_timer);
        }
    }

    /// Recurring top-up
    pub fn on_spawn_tick(&mut self, arena: &mut Arena, timers: &mut Timers<TimerEvent>) {
        if self.config.is_none() {
            return;
        }
        let live = arena.live_count() as u32;

        if !self.fast_mode && live * 2 < self.min_targets {
            self.fast_mode = true;
            self.interval_ms = ((self.interval_ms as f32 * FAST_SPAWN_INTERVAL_FACTOR).round() as u64).max(1);
            timers.clear_slot(&mut self.tick_timer);
            self.tick_timer = Some(timers.set_interval(self.interval_ms, TimerEvent::SpawnTick));
            log::info!(
                "Population low ({}/{}), spawn interval now {} ms",
                live,
                self.min_targets,
                self.interval_ms
            );
        }

        let needed = spawns_needed(live, self.min_targets, self.max_targets);
        for _ in 0..needed {
            self.spawn_one(arena, timers.now_ms());
        }
    }

    /// Cancel timers; live targets are left alone
    pub fn stop_spawning(&mut self, timers: &mut Timers<TimerEvent>) {
        timers.clear_slot(&mut self.initial_timer);
        timers.clear_slot(&mut self.tick_timer);
        self.initial_remaining = 0;
        self.config = None;
    }

    pub fn cleanup(&mut self, arena: &mut Arena, timers: &mut Timers<TimerEvent>) {
        self.stop_spawning(timers);
        arena.clear();
    }

    /// Weighted draw over the round's block types
    pub fn choose_kind(&mut self) -> TargetKind {
        let Some(config) = &self.config else {
            return TargetKind::Static;
        };
        let total: f32 = config.block_types.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return TargetKind::Static;
        }
        let mut roll = self.rng.random_range(0.0..total);
        for (kind, weight) in &config.block_types {
            let weight = weight.max(0.0);
            if roll < weight {
                return *kind;
            }
            roll -= weight;
        }
        // Float rounding can leave a sliver past the last bucket
        config
            .block_types
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map(|(k, _)| *k)
            .unwrap_or(TargetKind::Static)
    }

    fn is_clear(&self, p: Vec3, arena: &Arena) -> bool {
        let near_platform = self.layout.platforms.iter().any(|platform| {
            platform.contains(p) || platform.horizontal_edge_distance(p).abs() < PLATFORM_EDGE_CLEARANCE
        });
        if near_platform {
            return false;
        }
        arena.positions().all(|other| other.distance(p) >= MIN_TARGET_SPACING)
    }

    /// Pick a clear spot for `kind`, falling back to the safe position
    pub fn spawn_position(&mut self, kind: TargetKind, arena: &Arena) -> Vec3 {
        let area = if kind.is_static() {
            self.layout.static_spawn_area
        } else {
            self.layout.movement_bounds.inset(SPAWN_SAFETY_MARGIN)
        };
        for _ in 0..SPAWN_PLACEMENT_ATTEMPTS {
            let mut p = area.random_point(&mut self.rng);
            match kind {
                TargetKind::PopUp | TargetKind::Rising => p.y = self.layout.ground_y,
                TargetKind::Vertical => p.y = self.layout.vertical_band.start_y,
                _ => {}
            }
            if self.is_clear(p, arena) {
                return p;
            }
        }
        log::warn!(
            "No clear spawn spot for {} after {} attempts, using fallback",
            kind.as_str(),
            SPAWN_PLACEMENT_ATTEMPTS
        );
        self.layout.safe_spawn_position
    }

    fn initial_direction(&mut self, kind: TargetKind) -> Vec3 {
        match kind {
            // Wave targets travel along their base axis
            TargetKind::Horizontal => {
                if self.rng.random_bool(0.5) { Vec3::X } else { Vec3::NEG_X }
            }
            TargetKind::Vertical => {
                if self.rng.random_bool(0.5) { Vec3::Z } else { Vec3::NEG_Z }
            }
            TargetKind::PopUp | TargetKind::Rising => Vec3::Y,
            _ => planar_direction(self.rng.random_range(0.0..std::f32::consts::TAU)),
        }
    }

    /// Create one target of a randomly chosen kind
    pub fn spawn_one(&mut self, arena: &mut Arena, now_ms: u64) -> TargetId {
        let kind = self.choose_kind();
        self.spawn_kind(kind, arena, now_ms)
    }

    pub fn spawn_kind(&mut self, kind: TargetKind, arena: &mut Arena, now_ms: u64) -> TargetId {
        let profile = kind.profile();
        let speed_multiplier = self.config.as_ref().map(|c| c.speed_multiplier).unwrap_or(1.0);
        let position = self.spawn_position(kind, arena);
        let direction = self.initial_direction(kind);
        let bounds = if kind.is_static() {
            self.layout.static_spawn_area
        } else {
            self.layout.movement_bounds
        };

        let mut body = TargetBody::new(
            position,
            direction,
            profile.base_speed * speed_multiplier,
            bounds,
            profile.oscillate,
        );
        let behavior = MovementBehavior::for_kind(kind, &body, &self.layout, &mut self.rng);
        for p in behavior.trajectory_extremes(position) {
            body.bounds = body.bounds.expanded_to(p);
        }
        arena.spawn(kind, body, behavior, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RoundTable;
    use proptest::prelude::*;

    fn round() -> RoundConfig {
        RoundTable::standard().for_round(1).clone()
    }

    fn drain(timers: &mut Timers<TimerEvent>, until: u64, spawner: &mut RoundSpawner, arena: &mut Arena) {
        while let Some((_, event)) = timers.pop_due(until) {
            match event {
                TimerEvent::InitialSpawn => spawner.on_initial_spawn(arena, timers),
                TimerEvent::SpawnTick => spawner.on_spawn_tick(arena, timers),
                _ => {}
            }
        }
        timers.advance_to(until);
    }

    #[test]
    fn test_spawns_needed_rule() {
        assert_eq!(spawns_needed(0, 4, 8), 3);
        assert_eq!(spawns_needed(1, 4, 8), 2);
        assert_eq!(spawns_needed(3, 4, 8), 2);
        assert_eq!(spawns_needed(5, 4, 8), 1);
        assert_eq!(spawns_needed(8, 4, 8), 0);
        // Never overshoots max
        assert_eq!(spawns_needed(0, 1, 2), 2);
    }

    #[test]
    fn test_player_scaling_disabled() {
        assert_eq!(scaled_range(4, 8, 1), (4, 8));
        assert_eq!(scaled_range(4, 8, 6), (4, 8));
    }

    #[test]
    fn test_start_clears_arena_and_bursts() {
        let mut timers = Timers::new();
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 7);
        spawner.spawn_kind(TargetKind::Static, &mut arena, 0);
        let leftover = arena.targets()[0].id;

        let mut config = round();
        config.block_spawn_interval_ms = 60_000;
        spawner.start_spawning(&config, 2, &mut arena, &mut timers);
        assert!(arena.get(leftover).is_none());
        assert_eq!(arena.live_count(), 1);

        // One more per second until the minimum is reached
        drain(&mut timers, 1000, &mut spawner, &mut arena);
        assert_eq!(arena.live_count(), 2);
        drain(&mut timers, 5000, &mut spawner, &mut arena);
        assert_eq!(arena.live_count(), config.min_targets as usize);
    }

    #[test]
    fn test_fast_mode_is_one_way() {
        let mut timers = Timers::new();
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 9);
        let mut config = round();
        // Tick before the staggered burst gets going
        config.block_spawn_interval_ms = 500;
        spawner.start_spawning(&config, 1, &mut arena, &mut timers);
        arena.clear();

        drain(&mut timers, 500, &mut spawner, &mut arena);
        assert!(spawner.is_fast_mode());
        let fast = spawner.interval_ms();
        assert_eq!(fast, 300);

        // Population recovers; interval stays fast
        drain(&mut timers, 60_000, &mut spawner, &mut arena);
        assert!(arena.live_count() as u32 >= config.min_targets);
        assert!(spawner.is_fast_mode());
        assert_eq!(spawner.interval_ms(), fast);
    }

    #[test]
    fn test_never_exceeds_max() {
        let mut timers = Timers::new();
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 11);
        let config = round();
        spawner.start_spawning(&config, 2, &mut arena, &mut timers);
        drain(&mut timers, 120_000, &mut spawner, &mut arena);
        assert_eq!(arena.live_count() as u32, config.max_targets);
    }

    #[test]
    fn test_stop_cancels_timers() {
        let mut timers = Timers::new();
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 3);
        spawner.start_spawning(&round(), 1, &mut arena, &mut timers);
        let live = arena.live_count();
        spawner.stop_spawning(&mut timers);
        assert!(timers.is_empty());
        assert!(!spawner.is_spawning());
        assert_eq!(arena.live_count(), live);
        spawner.cleanup(&mut arena, &mut timers);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_weighted_choice_respects_zero_weight() {
        let mut timers = Timers::new();
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 5);
        let mut config = round();
        config.block_types = vec![(TargetKind::Static, 0.0), (TargetKind::Pendulum, 2.0)];
        spawner.start_spawning(&config, 1, &mut arena, &mut timers);
        for _ in 0..50 {
            assert_eq!(spawner.choose_kind(), TargetKind::Pendulum);
        }
    }

    #[test]
    fn test_crowded_arena_falls_back_to_safe_spot() {
        let mut layout = ArenaLayout::default();
        // One platform covering the whole open area
        layout.platforms = vec![crate::sim::bounds::MovementBounds::new(
            Vec3::splat(-100.0),
            Vec3::splat(100.0),
        )];
        let safe = layout.safe_spawn_position;
        let mut spawner = RoundSpawner::new(layout, 1);
        let arena = Arena::new();
        assert_eq!(spawner.spawn_position(TargetKind::Static, &arena), safe);
    }

    #[test]
    fn test_spawned_targets_start_in_bounds() {
        let mut arena = Arena::new();
        let mut spawner = RoundSpawner::new(ArenaLayout::default(), 21);
        for kind in TargetKind::ALL {
            let id = spawner.spawn_kind(kind, &mut arena, 0);
            let target = arena.get(id).unwrap();
            assert!(target.body.is_within_bounds(), "{:?}", kind);
            assert_eq!(target.health, kind.profile().health);
        }
    }

    proptest! {
        #[test]
        fn prop_spawns_needed_bounded(live in 0u32..40, min in 0u32..20, extra in 0u32..20) {
            let max = min + extra;
            let n = spawns_needed(live, min, max);
            prop_assert!(live + n <= max.max(live));
            prop_assert!(n <= 3);
            if live < max {
                prop_assert!(n >= 1);
            }
        }
    }
}
