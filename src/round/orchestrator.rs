//! Round state machine
//!
//! ```text
//! Idle ─▶ WaitingForPlayers ─▶ Countdown ─▶ RoundActive ─▶ Transition ─▶ Countdown ...
//!                                                   │
//!                                                   └─(last round)─▶ GameEnd ─▶ reset
//! ```
//!
//! Every entry point checks the current phase first, so repeated or racing
//! calls collapse to a single effect.

use crate::audio::{AudioSink, NullAudio, SoundCue};
use crate::consts::*;
use crate::ms_to_display_secs;
use crate::scoring::{RoundResult, Scoring, Standing, rank_standings, standings_for};
use crate::settings::{ArenaLayout, ConfigError, GameConfig, GameMode, RoundConfig, RoundTable};
use crate::sim::arena::{Arena, HitOutcome};
use crate::sim::target::TargetId;
use crate::sim::timer::{TimerId, Timers};
use crate::ui::{GameStats, UiMessage};

use super::players::PlayerTracker;
use super::spawner::RoundSpawner;
use super::transition::RoundTransition;
use super::{ArenaHost, PlayerId, RoundPhase, TimerEvent};

pub struct RoundOrchestrator {
    config: GameConfig,
    rounds: RoundTable,
    phase: RoundPhase,
    current_round: u32,
    game_in_progress: bool,
    round_start_ms: u64,
    round_duration_ms: u64,

    timers: Timers<TimerEvent>,
    arena: Arena,
    spawner: RoundSpawner,
    players: PlayerTracker,
    transition: RoundTransition,
    scoring: Option<Box<dyn Scoring>>,
    audio: Box<dyn AudioSink>,
    warned_no_scoring: bool,

    countdown_timer: Option<TimerId>,
    round_timer: Option<TimerId>,
    update_timer: Option<TimerId>,
    reset_timer: Option<TimerId>,
    restart_timer: Option<TimerId>,
}

impl RoundOrchestrator {
    /// Build an orchestrator with no scoring and silent audio
    pub fn new(config: GameConfig, rounds: RoundTable, layout: ArenaLayout, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        layout.validate()?;
        Ok(Self {
            players: PlayerTracker::new(config.required_players),
            transition: RoundTransition::new(config.transition_duration_ms),
            config,
            rounds,
            phase: RoundPhase::Idle,
            current_round: 0,
            game_in_progress: false,
            round_start_ms: 0,
            round_duration_ms: 0,
            timers: Timers::new(),
            arena: Arena::new(),
            spawner: RoundSpawner::new(layout, seed),
            scoring: None,
            audio: Box::new(NullAudio),
            warned_no_scoring: false,
            countdown_timer: None,
            round_timer: None,
            update_timer: None,
            reset_timer: None,
            restart_timer: None,
        })
    }

    pub fn with_scoring(mut self, scoring: Box<dyn Scoring>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    // --- Queries ---

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::RoundActive
    }

    pub fn is_shooting_allowed(&self) -> bool {
        self.is_active() && !self.players.is_waiting()
    }

    pub fn remaining_rounds(&self) -> u32 {
        self.config.max_rounds.saturating_sub(self.current_round)
    }

    pub fn is_waiting_for_players(&self) -> bool {
        self.players.is_waiting()
    }

    pub fn is_in_transition(&self) -> bool {
        self.transition.is_in_transition()
    }

    pub fn game_in_progress(&self) -> bool {
        self.game_in_progress
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Time left in the active round (zero otherwise)
    pub fn remaining_round_ms(&self) -> u64 {
        if !self.is_active() {
            return 0;
        }
        (self.round_start_ms + self.round_duration_ms).saturating_sub(self.timers.now_ms())
    }

    pub fn remaining_transition_ms(&self) -> u64 {
        self.transition.remaining_ms(self.timers.now_ms())
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn scoring(&self) -> Option<&dyn Scoring> {
        self.scoring.as_deref()
    }

    /// Scaled target population range of the current round
    pub fn population_range(&self) -> (u32, u32) {
        self.spawner.population_range()
    }

    // --- Entry points ---

    /// Kick off the next round (or the wait for players / game end)
    pub fn start_round(&mut self, host: &mut dyn ArenaHost) {
        match self.phase {
            RoundPhase::RoundActive
            | RoundPhase::Countdown
            | RoundPhase::GameEnd
            | RoundPhase::WaitingForPlayers => return,
            RoundPhase::Idle | RoundPhase::Transition => {}
        }
        if self.transition.is_in_transition() {
            return;
        }
        if self.current_round >= self.config.max_rounds {
            self.enter_game_end(host);
            return;
        }

        let count = host.player_count();
        if !self.game_in_progress && !self.players.has_enough(count) {
            if self.players.start_waiting(&mut self.timers) {
                self.phase = RoundPhase::WaitingForPlayers;
                self.send_waiting(host, count);
            }
            return;
        }
        self.begin_countdown();
    }

    /// Finish the active round; no-op otherwise
    pub fn end_round(&mut self, host: &mut dyn ArenaHost) {
        if self.phase != RoundPhase::RoundActive {
            return;
        }
        self.timers.clear_slot(&mut self.round_timer);
        self.timers.clear_slot(&mut self.update_timer);
        self.spawner.cleanup(&mut self.arena, &mut self.timers);

        let result = match self.scoring.as_deref_mut() {
            Some(scoring) => scoring.handle_round_end(),
            None => RoundResult::default(),
        };
        self.audio.play(SoundCue::RoundEnd);

        let final_round = self.current_round >= self.config.max_rounds;
        log::info!(
            "Round {}/{} over, winner: {:?}",
            self.current_round,
            self.config.max_rounds,
            result.winner_id
        );

        host.broadcast(&UiMessage::RoundEnd {
            round: self.current_round,
            total_rounds: self.config.max_rounds,
            next_round_in: (!final_round).then(|| ms_to_display_secs(self.transition.duration_ms())),
            winner_id: result.winner_id,
            placements: result.placements,
        });
        let entries = self.standings(host);
        host.broadcast(&UiMessage::LeaderboardUpdate { entries });

        if final_round {
            self.enter_game_end(host);
        } else {
            self.phase = RoundPhase::Transition;
            self.transition.start(&mut self.timers);
        }
    }

    /// Back to round zero; restarts or waits depending on who is present
    pub fn reset_game(&mut self, host: &mut dyn ArenaHost) {
        self.cancel_timers();
        self.spawner.cleanup(&mut self.arena, &mut self.timers);
        self.players.stop_waiting(&mut self.timers);
        self.transition.cancel(&mut self.timers);
        if let Some(scoring) = self.scoring.as_deref_mut() {
            scoring.reset();
        }
        self.current_round = 0;
        self.game_in_progress = false;
        self.round_start_ms = 0;
        self.round_duration_ms = 0;
        self.phase = RoundPhase::Idle;
        log::info!("Game reset");

        if self.players.has_enough(host.player_count()) {
            self.restart_timer = Some(
                self.timers
                    .set_timeout(RESET_RESTART_DELAY_MS, TimerEvent::RestartAfterReset),
            );
        } else {
            self.start_round(host);
        }
    }

    /// A player left. Before the first round this can drop the lobby below
    /// the requirement; a running game carries on.
    pub fn handle_player_leave(&mut self, host: &mut dyn ArenaHost) {
        if self.phase == RoundPhase::GameEnd || self.game_in_progress {
            return;
        }
        if !self.players.has_enough(host.player_count()) {
            log::info!("Not enough players before game start, resetting");
            self.reset_game(host);
        }
    }

    /// A projectile thrown by `player` hit `target` from `distance` away
    pub fn handle_projectile_hit(&mut self, target: TargetId, player: PlayerId, distance: f32) -> Option<HitOutcome> {
        if !self.is_shooting_allowed() {
            return None;
        }
        let kind = self.arena.get(target)?.kind;
        let damage = match self.scoring.as_deref_mut() {
            Some(scoring) => scoring.register_hit(player, kind, distance),
            None => {
                if !self.warned_no_scoring {
                    log::warn!("No scoring collaborator, using fixed hit damage");
                    self.warned_no_scoring = true;
                }
                FALLBACK_HIT_DAMAGE
            }
        };
        let outcome = self.arena.apply_hit(target, damage);
        if outcome == Some(HitOutcome::Destroyed) {
            log::debug!("{:?} destroyed {:?} ({})", player, target, kind.as_str());
        }
        outcome
    }

    /// Advance the clock by `dt_ms`: fire due timers in order, then move targets
    pub fn update(&mut self, dt_ms: u64, host: &mut dyn ArenaHost) {
        let count = host.player_count();
        if self.players.observe_count(count) {
            if let Some(first) = host.player_ids().first().copied() {
                host.send_data(
                    first,
                    &UiMessage::ModeSelection {
                        player_id: first,
                        modes: vec![GameMode::Solo, GameMode::Multiplayer],
                    },
                );
            }
        }

        let until = self.timers.now_ms() + dt_ms;
        while let Some((id, event)) = self.timers.pop_due(until) {
            self.dispatch(id, event, host);
        }
        self.timers.advance_to(until);

        let removed = self.arena.tick(dt_ms as f32);
        if !removed.is_empty() {
            log::debug!("{} targets left the arena", removed.len());
        }
    }

    /// Cancel everything and drop all targets
    pub fn cleanup(&mut self) {
        self.cancel_timers();
        self.spawner.cleanup(&mut self.arena, &mut self.timers);
        self.players.cleanup(&mut self.timers);
        self.transition.cleanup(&mut self.timers);
        self.phase = RoundPhase::Idle;
    }

    // --- Internals ---

    fn dispatch(&mut self, id: TimerId, event: TimerEvent, host: &mut dyn ArenaHost) {
        match event {
            TimerEvent::CountdownDone => {
                self.countdown_timer = None;
                self.begin_round(host);
            }
            TimerEvent::RoundEnd => {
                self.round_timer = None;
                self.end_round(host);
            }
            TimerEvent::RoundUpdate => {
                if self.is_active() {
                    self.send_round_update(host);
                }
            }
            TimerEvent::TransitionEnd => {
                if self.transition.complete(id) {
                    self.phase = RoundPhase::Idle;
                    self.start_round(host);
                }
            }
            TimerEvent::InitialSpawn => {
                if self.is_active() {
                    self.spawner.on_initial_spawn(&mut self.arena, &mut self.timers);
                }
            }
            TimerEvent::SpawnTick => {
                if self.is_active() {
                    self.spawner.on_spawn_tick(&mut self.arena, &mut self.timers);
                }
            }
            TimerEvent::PlayerPoll => {
                // Only the waiting phase owns the poll
                if self.phase != RoundPhase::WaitingForPlayers {
                    self.players.stop_waiting(&mut self.timers);
                    return;
                }
                let count = host.player_count();
                if self.players.poll(&mut self.timers, count) {
                    self.phase = RoundPhase::Idle;
                    self.begin_countdown();
                } else {
                    self.send_waiting(host, count);
                }
            }
            TimerEvent::GameEndReset => {
                self.reset_timer = None;
                self.reset_game(host);
            }
            TimerEvent::RestartAfterReset => {
                self.restart_timer = None;
                self.start_round(host);
            }
        }
    }

    fn begin_countdown(&mut self) {
        if self.countdown_timer.is_some() {
            return;
        }
        self.players.stop_waiting(&mut self.timers);
        self.phase = RoundPhase::Countdown;
        self.countdown_timer = Some(self.timers.set_timeout(COUNTDOWN_MS, TimerEvent::CountdownDone));
        log::debug!("Countdown to round {}", self.current_round + 1);
    }

    fn begin_round(&mut self, host: &mut dyn ArenaHost) {
        if self.phase == RoundPhase::RoundActive {
            return;
        }
        if self.current_round >= self.config.max_rounds {
            self.enter_game_end(host);
            return;
        }

        self.current_round += 1;
        self.game_in_progress = true;
        self.round_start_ms = self.timers.now_ms();
        let round: RoundConfig = self.rounds.for_round(self.current_round).clone();
        self.round_duration_ms = round.duration_ms;

        if let Some(scoring) = self.scoring.as_deref_mut() {
            scoring.start_new_round();
        }
        self.phase = RoundPhase::RoundActive;
        self.spawner
            .start_spawning(&round, host.player_count(), &mut self.arena, &mut self.timers);
        self.round_timer = Some(self.timers.set_timeout(round.duration_ms, TimerEvent::RoundEnd));
        self.update_timer = Some(
            self.timers
                .set_interval(ROUND_UPDATE_INTERVAL_MS, TimerEvent::RoundUpdate),
        );
        log::info!(
            "Round {}/{} started ({} s)",
            self.current_round,
            self.config.max_rounds,
            ms_to_display_secs(round.duration_ms)
        );
        self.send_round_update(host);
    }

    fn enter_game_end(&mut self, host: &mut dyn ArenaHost) {
        if self.phase == RoundPhase::GameEnd {
            return;
        }
        self.cancel_timers();
        self.transition.cancel(&mut self.timers);
        self.players.stop_waiting(&mut self.timers);
        self.spawner.cleanup(&mut self.arena, &mut self.timers);
        self.phase = RoundPhase::GameEnd;
        self.game_in_progress = false;

        let standings = self.standings(host);
        let winner = standings
            .first()
            .filter(|s| s.leaderboard_points > 0)
            .map(|s| s.player_id);
        log::info!("Game over after {} rounds, winner: {:?}", self.current_round, winner);

        host.broadcast(&UiMessage::GameEnd {
            winner,
            standings,
            stats: GameStats {
                total_rounds: self.config.max_rounds,
                completed_rounds: self.current_round,
            },
            next_game_in: ms_to_display_secs(GAME_END_RESET_DELAY_MS),
        });
        self.reset_timer = Some(self.timers.set_timeout(GAME_END_RESET_DELAY_MS, TimerEvent::GameEndReset));
    }

    fn standings(&self, host: &dyn ArenaHost) -> Vec<Standing> {
        let players = host.player_ids();
        match self.scoring.as_deref() {
            Some(scoring) => standings_for(scoring, &players),
            None => {
                let mut standings: Vec<Standing> = players
                    .into_iter()
                    .map(|player_id| Standing {
                        player_id,
                        score: 0,
                        wins: 0,
                        leaderboard_points: 0,
                    })
                    .collect();
                rank_standings(&mut standings);
                standings
            }
        }
    }

    fn send_round_update(&self, host: &mut dyn ArenaHost) {
        host.broadcast(&UiMessage::RoundUpdate {
            round: self.current_round,
            total_rounds: self.config.max_rounds,
            remaining_rounds: self.remaining_rounds(),
            time_remaining: ms_to_display_secs(self.remaining_round_ms()),
        });
    }

    fn send_waiting(&self, host: &mut dyn ArenaHost, count: usize) {
        let required = self.players.required();
        host.broadcast(&UiMessage::WaitingForPlayers {
            current: count,
            required,
            remaining: required.saturating_sub(count),
        });
    }

    fn cancel_timers(&mut self) {
        self.timers.clear_slot(&mut self.countdown_timer);
        self.timers.clear_slot(&mut self.round_timer);
        self.timers.clear_slot(&mut self.update_timer);
        self.timers.clear_slot(&mut self.reset_timer);
        self.timers.clear_slot(&mut self.restart_timer);
    }
}
