//! Arena Targets headless demo
//!
//! Runs one full game at a fixed 16 ms step against a scripted host: players
//! trickle in, throw at random live targets, and every UI payload is logged
//! as JSON. Usage: `arena-sim [seed]`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use arena_targets::audio::LogAudio;
use arena_targets::consts::SIM_DT_MS;
use arena_targets::scoring::Scoreboard;
use arena_targets::ui::UiMessage;
use arena_targets::{ArenaHost, ArenaLayout, GameConfig, PlayerId, RoundOrchestrator, RoundPhase, RoundTable};

/// Players join at these clock times (ms)
const JOIN_SCHEDULE_MS: [u64; 3] = [0, 2_500, 40_000];
/// Each present player throws this often
const THROW_INTERVAL_MS: u64 = 700;
/// Fraction of throws that connect
const HIT_CHANCE: f64 = 0.35;
/// Give up if the game somehow never ends
const MAX_SIM_MS: u64 = 30 * 60 * 1000;

struct ScriptedHost {
    players: Vec<PlayerId>,
    messages: usize,
}

impl ArenaHost for ScriptedHost {
    fn player_ids(&self) -> Vec<PlayerId> {
        self.players.clone()
    }

    fn send_data(&mut self, player: PlayerId, message: &UiMessage) {
        self.messages += 1;
        match message.to_json() {
            Ok(json) => log::info!("-> {:?}: {}", player, json),
            Err(e) => log::warn!("Failed to encode {} for {:?}: {}", message.kind(), player, e),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    log::info!("Arena Targets demo starting (seed {})", seed);

    let config = GameConfig::default();
    let mode = config.mode;
    let mut orch = match RoundOrchestrator::new(config, RoundTable::standard(), ArenaLayout::default(), seed) {
        Ok(orch) => orch
            .with_scoring(Box::new(Scoreboard::new(mode)))
            .with_audio(Box::new(LogAudio::new())),
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut host = ScriptedHost {
        players: Vec::new(),
        messages: 0,
    };
    let mut rng = Pcg32::seed_from_u64(seed ^ 0xdead_beef);
    let mut joined = 0;
    let mut next_throw_ms = THROW_INTERVAL_MS;
    let mut hits = 0u32;

    orch.start_round(&mut host);

    while orch.now_ms() < MAX_SIM_MS {
        let now = orch.now_ms();

        while joined < JOIN_SCHEDULE_MS.len() && JOIN_SCHEDULE_MS[joined] <= now {
            joined += 1;
            host.players.push(PlayerId(joined as u32));
            log::info!("Player {} joined", joined);
        }

        if now >= next_throw_ms {
            next_throw_ms += THROW_INTERVAL_MS;
            let live: Vec<_> = orch.arena().targets().iter().map(|t| (t.id, t.position())).collect();
            for player in host.player_ids() {
                if live.is_empty() || !rng.random_bool(HIT_CHANCE) {
                    continue;
                }
                let (target, position) = live[rng.random_range(0..live.len())];
                let distance = position.length();
                if orch.handle_projectile_hit(target, player, distance).is_some() {
                    hits += 1;
                }
            }
        }

        orch.update(SIM_DT_MS, &mut host);

        if orch.phase() == RoundPhase::GameEnd {
            break;
        }
    }

    log::info!(
        "Finished at {:.1} s: {} rounds, {} hits, {} messages sent",
        orch.now_ms() as f64 / 1000.0,
        orch.current_round(),
        hits,
        host.messages
    );
    orch.cleanup();
}
