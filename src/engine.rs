//! Frame scheduler and public control surface
//!
//! The host calls `frame(timestamp_ms)` once per display frame and keeps
//! calling while it returns `FrameControl::Continue`. Everything the round
//! produces (score, power, block churn, game over) is dispatched from here to
//! callbacks, the renderer and the best-score store.

use serde::{Deserialize, Serialize};

use crate::best_score::BestScoreStore;
use crate::governor::PerformanceGovernor;
use crate::renderer::{FrameView, Renderer};
use crate::settings::{ConfigError, EngineConfig};
use crate::sim::state::{GameEvent, GameState};
use crate::sim::tick::tick;

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Outcome of the last finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u64,
    /// Best score after this round
    pub best: u64,
    pub new_record: bool,
}

type ScoreCallback = Box<dyn FnMut(u64)>;
type PowerCallback = Box<dyn FnMut(f32)>;
type GameOverCallback = Box<dyn FnMut()>;

#[derive(Default)]
struct Callbacks {
    score_change: Option<ScoreCallback>,
    power_change: Option<PowerCallback>,
    game_over: Option<GameOverCallback>,
}

pub struct GameEngine<R: Renderer, S: BestScoreStore> {
    config: EngineConfig,
    state: Option<GameState>,
    governor: PerformanceGovernor,
    renderer: R,
    store: S,
    callbacks: Callbacks,
    running: bool,
    paused: bool,
    destroyed: bool,
    /// Timestamp of the last processed frame
    last_timestamp: Option<f64>,
    last_round: Option<RoundSummary>,
}

impl<R: Renderer, S: BestScoreStore> GameEngine<R, S> {
    /// Build the engine and hand the initial path to the renderer
    pub fn new(config: EngineConfig, seed: u64, renderer: R, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            state: Some(GameState::new(config.clone(), seed)),
            governor: PerformanceGovernor::new(&config),
            config,
            renderer,
            store,
            callbacks: Callbacks::default(),
            running: false,
            paused: false,
            destroyed: false,
            last_timestamp: None,
            last_round: None,
        };
        engine.flush_events();
        log::info!("Engine initialized with seed: {}", seed);
        Ok(engine)
    }

    pub fn on_score_change(&mut self, callback: impl FnMut(u64) + 'static) {
        self.callbacks.score_change = Some(Box::new(callback));
    }

    /// Charge power as a percentage in [0, 100]
    pub fn on_power_change(&mut self, callback: impl FnMut(f32) + 'static) {
        self.callbacks.power_change = Some(Box::new(callback));
    }

    pub fn on_game_over(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.game_over = Some(Box::new(callback));
    }

    /// Begin accepting frames
    pub fn start(&mut self) {
        if self.destroyed {
            log::debug!("Ignoring start on destroyed engine");
            return;
        }
        if self.running {
            return;
        }
        self.running = true;
        self.last_timestamp = None;
        log::info!("Frame loop started");
    }

    pub fn pause(&mut self) {
        if !self.running || self.paused {
            return;
        }
        self.paused = true;
        log::info!("Paused");
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        // Time spent paused must not show up as one huge dt
        self.last_timestamp = None;
        log::info!("Resumed");
    }

    /// Stop the frame loop and release every block. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.running = false;
        self.paused = false;

        if let Some(mut state) = self.state.take() {
            state.teardown();
            let events = state.drain_events();
            self.dispatch(events);
        }
        self.callbacks = Callbacks::default();
        log::info!("Engine destroyed");
    }

    pub fn start_game(&mut self) {
        self.with_state(GameState::start_game);
    }

    pub fn restart(&mut self) {
        self.with_state(GameState::restart);
    }

    pub fn start_charging(&mut self) {
        self.with_state(GameState::start_charging);
    }

    pub fn jump(&mut self) {
        self.with_state(GameState::jump);
    }

    /// Process one host frame
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameControl {
        if self.destroyed || !self.running {
            return FrameControl::Stop;
        }
        if self.paused {
            return FrameControl::Continue;
        }

        let dt = match self.last_timestamp {
            None => 0.0,
            Some(last) => {
                let elapsed = timestamp_ms - last;
                if elapsed < self.config.min_frame_interval_ms {
                    log::trace!("Skipping frame ({:.2} ms since last)", elapsed);
                    return FrameControl::Continue;
                }
                (elapsed / 1000.0) as f32
            }
        };
        self.last_timestamp = Some(timestamp_ms);
        let dt = dt.min(self.config.max_frame_dt);

        let active = self
            .state
            .as_ref()
            .is_some_and(|s| s.in_play || s.player.is_jumping() || s.player.is_falling());
        if active {
            self.update(dt);
        }
        self.render();

        FrameControl::Continue
    }

    /// Advance the simulation by `dt` seconds and dispatch what happened
    pub fn update(&mut self, dt: f32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        self.governor.sample_frame(dt);
        let events = tick(state, dt, self.governor.update_breadth());
        self.dispatch(events);
    }

    fn render(&mut self) {
        if let Some(state) = &self.state {
            let view = FrameView::new(state, self.governor.level());
            self.renderer.render(&view);
        }
    }

    fn with_state(&mut self, op: impl FnOnce(&mut GameState)) {
        let Some(state) = self.state.as_mut() else {
            log::debug!("Ignoring input on destroyed engine");
            return;
        };
        op(state);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        if let Some(state) = self.state.as_mut() {
            let events = state.drain_events();
            self.dispatch(events);
        }
    }

    fn dispatch(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::ScoreChanged(score) => {
                    if let Some(cb) = self.callbacks.score_change.as_mut() {
                        cb(score);
                    }
                }
                GameEvent::PowerChanged(percent) => {
                    if let Some(cb) = self.callbacks.power_change.as_mut() {
                        cb(percent);
                    }
                }
                GameEvent::GameOver { score } => {
                    self.finish_round(score);
                    if let Some(cb) = self.callbacks.game_over.as_mut() {
                        cb();
                    }
                }
                GameEvent::BlockSpawned(block) => self.renderer.add(&block),
                GameEvent::BlockRecycled(id) => self.renderer.remove(id),
                GameEvent::Landed { .. } | GameEvent::Missed { .. } => {}
            }
        }
    }

    fn finish_round(&mut self, score: u64) {
        let previous = self.store.get();
        let new_record = score > previous;
        if new_record {
            self.store.set(score);
            log::info!("New best score: {} (was {})", score, previous);
        }
        self.last_round = Some(RoundSummary {
            score,
            best: previous.max(score),
            new_record,
        });
    }

    /// Current round state, `None` once destroyed
    pub fn game(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn best_score(&self) -> u64 {
        self.store.get()
    }

    pub fn last_round(&self) -> Option<RoundSummary> {
        self.last_round
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
