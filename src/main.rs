//! Native headless runner
//!
//! Plays rounds with a simple bot against a simulated 60 Hz host clock.
//!
//! Usage: `hopscotch [seed] [rounds] [config.json]`

use hopscotch::best_score::JsonFileBestScore;
use hopscotch::engine::{FrameControl, GameEngine, RoundSummary};
use hopscotch::renderer::HeadlessRenderer;
use hopscotch::settings::EngineConfig;
use hopscotch::sim::{GamePhase, jump_distance};
use hopscotch::{consts, planar};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const HOST_FRAME_MS: f64 = 1000.0 / 60.0;
/// Largest aim error (world units) the bot makes on a jump
const AIM_NOISE: f32 = 1.6;
/// Give up on a round after this many host frames
const MAX_FRAMES_PER_ROUND: usize = 60 * 60 * 10;
const BEST_SCORE_FILE: &str = "hopscotch_best.json";

type Engine = GameEngine<HeadlessRenderer, JsonFileBestScore>;

/// Charge time needed to cover `distance`
fn charge_for(distance: f32, max_charge_ms: f64) -> f64 {
    let span = jump_distance(1.0) - jump_distance(0.0);
    let power = ((distance - jump_distance(0.0)) / span).clamp(0.0, 1.0);
    f64::from(power) * max_charge_ms
}

/// Distance from the player to the next block on the path
fn gap_to_next(engine: &Engine) -> Option<f32> {
    let state = engine.game()?;
    let next = state.block_at(state.session.current_block_index + 1)?;
    Some(planar(state.player.position).distance(planar(next.position)))
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RoundOutcome {
    jumps: usize,
    finished: bool,
}

impl RoundOutcome {
    fn unfinished(jumps: usize) -> Self {
        Self {
            jumps,
            finished: false,
        }
    }

    /// The engine's summary, only if it belongs to this round
    fn summary(&self, engine: &Engine) -> Option<RoundSummary> {
        engine.last_round().filter(|_| self.finished)
    }
}

/// Play one round until game over or until the frame budget runs out
fn play_round(engine: &mut Engine, rng: &mut Pcg32, now: &mut f64) -> RoundOutcome {
    let max_charge_ms = engine.config().max_charge_ms;
    let mut charge: Option<(f64, f64)> = None;
    let mut jumps = 0;

    for _ in 0..MAX_FRAMES_PER_ROUND {
        let Some(state) = engine.game() else {
            log::warn!("Engine destroyed mid-round");
            return RoundOutcome::unfinished(jumps);
        };
        let phase = state.session.phase;
        let clock = state.clock_ms;

        match phase {
            GamePhase::GameOver => {
                return RoundOutcome {
                    jumps,
                    finished: true,
                };
            }
            GamePhase::Waiting if state.in_play => {
                let gap = gap_to_next(engine).unwrap_or(consts::STEP_MIN_DISTANCE);
                let aimed = gap + rng.random_range(-AIM_NOISE..=AIM_NOISE);
                charge = Some((clock, charge_for(aimed, max_charge_ms)));
                engine.start_charging();
            }
            GamePhase::Charging => {
                if let Some((started, hold)) = charge {
                    if clock - started >= hold {
                        engine.jump();
                        charge = None;
                        jumps += 1;
                    }
                }
            }
            _ => {}
        }

        if engine.frame(*now) == FrameControl::Stop {
            log::warn!("Frame loop stopped mid-round");
            return RoundOutcome::unfinished(jumps);
        }
        *now += HOST_FRAME_MS;
    }

    log::warn!("Round did not finish within {} frames", MAX_FRAMES_PER_ROUND);
    RoundOutcome::unfinished(jumps)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Hopscotch (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let rounds: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(3);

    let config = match args.get(3) {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let store = JsonFileBestScore::open(BEST_SCORE_FILE);
    let mut engine = match GameEngine::new(config, seed, HeadlessRenderer::new(), store) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    engine.on_game_over(|| log::debug!("Game over callback"));
    engine.start();

    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(1));
    let mut now = 0.0;

    for round in 1..=rounds {
        if round == 1 {
            engine.start_game();
        } else {
            engine.restart();
        }

        let outcome = play_round(&mut engine, &mut rng, &mut now);
        let jumps = outcome.jumps;
        match outcome.summary(&engine) {
            Some(summary) => log::info!(
                "Round {}: score {} in {} jumps (best {}{})",
                round,
                summary.score,
                jumps,
                summary.best,
                if summary.new_record { ", new record" } else { "" }
            ),
            None => log::info!("Round {}: unfinished after {} jumps", round, jumps),
        }
    }

    let stats = engine.governor().stats();
    let pool = engine.game().map(|s| s.pool.stats()).unwrap_or_default();
    log::info!(
        "Quality {} ({:.1} fps avg), pool created {} reused {} destroyed {}",
        stats.level.as_str(),
        stats.average_fps,
        pool.created,
        pool.reused,
        pool.destroyed
    );

    engine.destroy();
    println!("Best score: {}", engine.best_score());
}
