//! Simulation tick and round state machine
//!
//! `Waiting -> Charging -> Jumping -> {Waiting | Falling}`, and
//! `Falling -> GameOver` once the fall curve completes. Input entry points
//! read the clock as of the last tick and silently ignore transitions that
//! are not valid from the current phase.

use glam::{Vec2, Vec3};

use super::landing::{self, Landing};
use super::player::{Motion, MotionEvent};
use super::state::{GameEvent, GamePhase, GameSession, GameState};
use crate::consts::*;
use crate::planar;

/// Charge power in [0, 1] after holding for `elapsed_ms`
pub fn charge_power(elapsed_ms: f64, max_charge_ms: f64) -> f32 {
    if max_charge_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / max_charge_ms).clamp(0.0, 1.0) as f32
}

pub fn jump_distance(power: f32) -> f32 {
    JUMP_DISTANCE_BASE + power * JUMP_DISTANCE_SPAN
}

pub fn jump_height(power: f32) -> f32 {
    JUMP_HEIGHT_BASE + power * JUMP_HEIGHT_SPAN
}

/// Advance the game state by `dt` seconds.
///
/// Only blocks within `update_breadth` of the player get animated. Returns
/// every event produced since the last drain.
pub fn tick(state: &mut GameState, dt: f32, update_breadth: usize) -> Vec<GameEvent> {
    if !state.in_play && !state.player.is_jumping() && !state.player.is_falling() {
        return state.drain_events();
    }

    state.clock_ms += f64::from(dt) * 1000.0;
    let now = state.clock_ms;

    if let Motion::Charging { start_ms } = state.player.motion {
        let percent = (charge_power(now - start_ms, state.session.max_charge_ms) * 100.0).min(100.0);
        state.events.push(GameEvent::PowerChanged(percent));
    }

    match state.player.update(now) {
        Some(MotionEvent::JumpCompleted) => state.resolve_landing(),
        Some(MotionEvent::FallCompleted) => {
            state.session.phase = GamePhase::GameOver;
            log::info!("Game over! Final score: {}", state.session.score);
            state.events.push(GameEvent::GameOver {
                score: state.session.score,
            });
        }
        None => {}
    }

    // Presentation animation near the player only
    let from = state.session.current_block_index.saturating_sub(1);
    for (_, handle) in state.path.window(from..from + update_breadth) {
        if let Some(block) = state.pool.get_mut(handle) {
            block.animate(dt);
        }
    }

    if let Some(goal) = state.current_block().map(|b| b.position) {
        state.camera.update(goal, dt);
    }

    state.drain_events()
}

impl GameState {
    /// Put the round in play from the start block
    pub fn start_game(&mut self) {
        if self.in_play {
            log::debug!("Ignoring start_game: round already in play");
            return;
        }
        if self.session.phase != GamePhase::Waiting || self.session.current_block_index != 0 {
            self.reset_round();
        }
        self.begin_round();
        log::info!("Game started (seed {})", self.seed);
    }

    /// Throw away the current round and start a fresh one
    pub fn restart(&mut self) {
        self.reset_round();
        self.begin_round();
        log::info!("Game restarted");
    }

    pub fn start_charging(&mut self) {
        if !self.in_play || self.session.phase != GamePhase::Waiting {
            log::debug!("Ignoring start_charging in {:?}", self.session.phase);
            return;
        }
        self.player.start_charging(self.clock_ms);
        if self.player.is_charging() {
            self.session.phase = GamePhase::Charging;
        }
    }

    /// Release the charge and launch toward the next block
    pub fn jump(&mut self) {
        if self.session.phase != GamePhase::Charging {
            log::debug!("Ignoring jump in {:?}", self.session.phase);
            return;
        }
        let Motion::Charging { start_ms } = self.player.motion else {
            log::debug!("Ignoring jump: player is not charging");
            return;
        };

        let power = charge_power(self.clock_ms - start_ms, self.session.max_charge_ms);
        let distance = jump_distance(power);
        let height = jump_height(power);
        let direction = self
            .block_at(self.session.current_block_index + 1)
            .map(|b| planar(b.position) - planar(self.player.position))
            .unwrap_or(Vec2::Y);

        let launched = self.player.jump(
            self.clock_ms,
            self.config.jump_duration_ms,
            direction,
            distance,
            height,
        );
        if !launched {
            return;
        }
        self.session.phase = GamePhase::Jumping;
        self.events.push(GameEvent::PowerChanged(0.0));
        log::debug!("Jump: power {:.2}, distance {:.2}, height {:.2}", power, distance, height);
    }

    /// Score the finished jump, or start falling
    pub(crate) fn resolve_landing(&mut self) {
        let rules = self.config.landing_rules();
        let current = self.session.current_block_index;
        let point = self.player.position;

        match landing::resolve(&self.path, &self.pool, &rules, current, point) {
            Landing::Landed {
                index,
                handle,
                distance,
                tier,
            } => {
                let points = tier.points();
                self.session.score += u64::from(points);
                self.session.current_block_index = index;
                self.session.phase = GamePhase::Waiting;
                log::debug!(
                    "Landed on block {} ({:?}, distance {:.3}, +{})",
                    index,
                    tier,
                    distance,
                    points
                );
                self.events.push(GameEvent::Landed {
                    block_id: handle.id,
                    index,
                    distance,
                    tier,
                });
                self.events.push(GameEvent::ScoreChanged(self.session.score));

                while self.path.end().saturating_sub(index + 1) < self.config.min_blocks_ahead {
                    self.extend_path();
                }
                self.cleanup_behind();
            }
            Landing::Missed { nearest } => {
                log::debug!("Missed landing (nearest {:?})", nearest);
                self.session.phase = GamePhase::Falling;
                self.in_play = false;
                self.events.push(GameEvent::Missed { distance: nearest });
                self.player
                    .fall(self.clock_ms, self.config.fall_duration_ms, self.config.fall_depth);
            }
        }
    }

    /// Recycle the leading run of blocks far behind the player
    fn cleanup_behind(&mut self) {
        let count = landing::prunable_front(
            &self.path,
            &self.pool,
            self.session.current_block_index,
            self.player.position,
            self.config.cleanup_radius,
            self.config.cleanup_index_lag,
        );
        for _ in 0..count {
            let Some(handle) = self.path.pop_front() else {
                break;
            };
            if self.pool.release(handle) {
                self.events.push(GameEvent::BlockRecycled(handle.id));
            }
        }
    }

    /// Return every path block to the pool and take the round out of play
    pub fn teardown(&mut self) {
        for handle in self.path.clear() {
            if self.pool.release(handle) {
                self.events.push(GameEvent::BlockRecycled(handle.id));
            }
        }
        self.in_play = false;
        self.player.reset();
    }

    fn reset_round(&mut self) {
        self.teardown();
        self.camera.reset();
        self.session = GameSession::new(self.config.max_charge_ms);
        self.build_initial_path();
    }

    fn begin_round(&mut self) {
        self.in_play = true;
        self.session.phase = GamePhase::Waiting;
        self.session.score = 0;
        self.session.current_block_index = 0;
        self.player.set_position(Vec3::new(0.0, PLAYER_REST_Y, 0.0));
        self.events.push(GameEvent::ScoreChanged(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EngineConfig;
    use crate::sim::landing::LandingTier;
    use crate::sim::state::BlockKind;
    use proptest::prelude::*;

    const SIM_DT: f32 = 0.1;
    const BREADTH: usize = 10;

    fn new_state(seed: u64) -> GameState {
        GameState::new(EngineConfig::default(), seed)
    }

    /// Replace the generated path with `n` blocks spaced 5 apart along +Z
    fn straight_path(state: &mut GameState, n: usize) {
        for handle in state.path.clear() {
            state.pool.release(handle);
        }
        for i in 0..n {
            let kind = if i == 0 { BlockKind::Start } else { BlockKind::Normal };
            let handle = state.pool.acquire(Vec3::new(0.0, 0.0, 5.0 * i as f32), kind);
            state.path.push(handle);
        }
        state.drain_events();
    }

    fn tick_for(state: &mut GameState, seconds: f32) -> Vec<GameEvent> {
        let steps = (seconds / SIM_DT).round() as usize;
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(tick(state, SIM_DT, BREADTH));
        }
        events
    }

    /// Pretend a jump just finished at `point`
    fn land_at(state: &mut GameState, point: Vec3) {
        state.session.phase = GamePhase::Jumping;
        state.player.set_position(point);
        state.resolve_landing();
    }

    #[test]
    fn test_full_charge_gives_max_jump() {
        let mut state = new_state(1);
        straight_path(&mut state, 5);
        state.start_game();
        state.start_charging();
        assert_eq!(state.session.phase, GamePhase::Charging);

        let events = tick(&mut state, 2.0, BREADTH);
        assert!(events.contains(&GameEvent::PowerChanged(100.0)));

        state.jump();
        assert_eq!(state.session.phase, GamePhase::Jumping);
        let Motion::Jumping(arc) = state.player.motion else {
            panic!("expected a jump, got {:?}", state.player.motion);
        };
        assert!(((arc.end_pos - arc.start_pos).length() - 8.0).abs() < 1e-4);
        assert_eq!(arc.height, 4.0);
        // Aimed straight at block 1
        assert!(arc.end_pos.x.abs() < 1e-5);
        assert!(state.drain_events().contains(&GameEvent::PowerChanged(0.0)));
    }

    #[test]
    fn test_charge_jump_land_flow() {
        let mut state = new_state(2);
        straight_path(&mut state, 5);
        state.start_game();
        state.drain_events();

        state.start_charging();
        // Half power: 2 + 0.5 * 6 = 5, exactly the gap to block 1
        tick(&mut state, 1.0, BREADTH);
        state.jump();
        let events = tick_for(&mut state, 0.8);

        assert_eq!(state.session.phase, GamePhase::Waiting);
        assert_eq!(state.session.current_block_index, 1);
        assert_eq!(state.session.score, 5);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Landed {
                index: 1,
                tier: LandingTier::Perfect,
                ..
            }
        )));
        assert!(events.contains(&GameEvent::ScoreChanged(5)));
        assert!((state.player.position - Vec3::new(0.0, PLAYER_REST_Y, 5.0)).length() < 1e-3);
    }

    #[test]
    fn test_center_landing_scores_and_extends() {
        let mut state = new_state(3);
        straight_path(&mut state, 5);
        state.start_game();

        land_at(&mut state, Vec3::new(0.0, PLAYER_REST_Y, 5.0));
        assert_eq!(state.session.score, 5);
        assert_eq!(state.session.current_block_index, 1);
        // Three blocks still ahead, nothing generated
        assert_eq!(state.path.end(), 5);

        land_at(&mut state, Vec3::new(0.0, PLAYER_REST_Y, 10.0));
        assert_eq!(state.session.score, 10);
        assert_eq!(state.session.current_block_index, 2);
        assert_eq!(state.path.end(), 6);
        let spawned = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::BlockSpawned(_)))
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn test_landing_tiers_add_points() {
        let mut state = new_state(4);
        straight_path(&mut state, 8);
        state.start_game();

        land_at(&mut state, Vec3::new(0.5, PLAYER_REST_Y, 5.0));
        assert_eq!(state.session.score, 3);
        land_at(&mut state, Vec3::new(1.2, PLAYER_REST_Y, 10.0));
        assert_eq!(state.session.score, 4);
        assert_eq!(state.session.current_block_index, 2);
    }

    #[test]
    fn test_landing_recycles_far_blocks_behind() {
        let mut state = new_state(5);
        straight_path(&mut state, 8);
        state.start_game();
        state.session.current_block_index = 5;

        land_at(&mut state, Vec3::new(0.0, PLAYER_REST_Y, 30.0));
        assert_eq!(state.session.current_block_index, 6);
        // Blocks at z = 0 and z = 5 are beyond 20; z = 10 sits exactly at 20
        assert_eq!(state.path.start(), 2);
        assert_eq!(state.path.end(), 10);
        let recycled = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::BlockRecycled(_)))
            .count();
        assert_eq!(recycled, 2);
        // Absolute indices still resolve to the same blocks
        assert_eq!(state.block_at(6).map(|b| b.position.z), Some(30.0));
    }

    #[test]
    fn test_miss_falls_then_game_over() {
        let mut state = new_state(6);
        straight_path(&mut state, 5);
        state.start_game();
        state.drain_events();

        land_at(&mut state, Vec3::new(1.6, PLAYER_REST_Y, 5.0));
        assert_eq!(state.session.phase, GamePhase::Falling);
        assert_eq!(state.session.score, 0);
        assert!(!state.in_play);
        let events = state.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Missed { distance: Some(d) }] if (d - 1.6).abs() < 1e-4
        ));

        // Input is ignored while falling
        state.start_charging();
        assert_eq!(state.session.phase, GamePhase::Falling);

        let events = tick_for(&mut state, 2.0);
        assert_eq!(state.session.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged(_))));
        assert!((state.player.position.y - (PLAYER_REST_Y - FALL_DEPTH)).abs() < 1e-3);

        // Nothing moves once the round is over
        let clock = state.clock_ms;
        assert!(tick(&mut state, SIM_DT, BREADTH).is_empty());
        assert_eq!(state.clock_ms, clock);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = new_state(7);
        state.start_game();
        for _ in 0..6 {
            state.extend_path();
        }
        land_at(&mut state, Vec3::new(500.0, PLAYER_REST_Y, 0.0));
        tick_for(&mut state, 2.0);
        assert_eq!(state.session.phase, GamePhase::GameOver);
        state.session.score = 42;
        state.drain_events();

        state.restart();
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.phase, GamePhase::Waiting);
        assert_eq!(state.session.current_block_index, 0);
        assert!(state.in_play);
        assert_eq!(state.path.len(), 5);
        assert_eq!(state.path.start(), 0);
        assert_eq!(state.block_at(0).map(|b| b.kind), Some(BlockKind::Start));
        assert_eq!(state.player.position, Vec3::new(0.0, PLAYER_REST_Y, 0.0));
        assert_eq!(state.camera.target(), Vec3::ZERO);

        assert_eq!(state.pool.active_len(), 5);
        assert!(state.pool.free_len() <= state.pool.max_pool_size());

        let events = state.drain_events();
        let recycled = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BlockRecycled(_)))
            .count();
        assert_eq!(recycled, 11);
        assert_eq!(events.last(), Some(&GameEvent::ScoreChanged(0)));
    }

    #[test]
    fn test_start_game_after_game_over_resets() {
        let mut state = new_state(8);
        state.start_game();
        land_at(&mut state, Vec3::new(500.0, PLAYER_REST_Y, 0.0));
        tick_for(&mut state, 2.0);

        state.start_game();
        assert!(state.in_play);
        assert_eq!(state.session.phase, GamePhase::Waiting);
        assert_eq!(state.path.len(), 5);
    }

    #[test]
    fn test_input_guards() {
        let mut state = new_state(9);

        // Not in play yet
        state.start_charging();
        assert_eq!(state.session.phase, GamePhase::Waiting);

        state.start_game();
        // Jump without charging
        state.jump();
        assert_eq!(state.session.phase, GamePhase::Waiting);
        assert!(!state.player.is_jumping());

        state.start_charging();
        tick(&mut state, 0.5, BREADTH);
        state.jump();
        assert_eq!(state.session.phase, GamePhase::Jumping);
        let in_flight = state.player.motion;

        // While jumping, neither input has any effect
        state.start_charging();
        state.jump();
        assert_eq!(state.session.phase, GamePhase::Jumping);
        assert_eq!(state.player.motion, in_flight);

        // Double start is ignored
        let score = state.session.score;
        state.start_game();
        assert_eq!(state.session.phase, GamePhase::Jumping);
        assert_eq!(state.session.score, score);
    }

    #[test]
    fn test_power_events_while_charging() {
        let mut state = new_state(10);
        state.start_game();
        state.start_charging();
        state.drain_events();

        let events = tick(&mut state, 0.5, BREADTH);
        assert_eq!(events, vec![GameEvent::PowerChanged(25.0)]);
        let events = tick(&mut state, 5.0, BREADTH);
        assert_eq!(events, vec![GameEvent::PowerChanged(100.0)]);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut state = new_state(11);
        state.start_game();
        state.drain_events();
        state.teardown();

        assert!(state.path.is_empty());
        assert_eq!(state.pool.active_len(), 0);
        assert_eq!(state.pool.active_blocks().count(), 0);
        assert!(!state.in_play);
        let recycled = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::BlockRecycled(_)))
            .count();
        assert_eq!(recycled, 5);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = new_state(99999);
        let mut state2 = new_state(99999);

        for state in [&mut state1, &mut state2] {
            state.start_game();
            for charge in [0.5, 0.7, 0.3] {
                state.start_charging();
                tick(state, charge, BREADTH);
                state.jump();
                tick_for(state, 1.0);
            }
        }

        assert_eq!(state1.clock_ms, state2.clock_ms);
        assert_eq!(state1.session, state2.session);
        assert_eq!(state1.player.position, state2.player.position);
        let p1: Vec<Vec3> = state1.blocks().map(|b| b.position).collect();
        let p2: Vec<Vec3> = state2.blocks().map(|b| b.position).collect();
        assert_eq!(p1, p2);
    }

    proptest! {
        #[test]
        fn prop_charge_power_clamped_and_monotonic(
            a in -1000.0f64..5000.0,
            b in -1000.0f64..5000.0,
            max in 1.0f64..5000.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = charge_power(lo, max);
            let p_hi = charge_power(hi, max);
            prop_assert!((0.0..=1.0).contains(&p_lo));
            prop_assert!((0.0..=1.0).contains(&p_hi));
            prop_assert!(p_lo <= p_hi);
            prop_assert_eq!(charge_power(0.0, max), 0.0);
            prop_assert_eq!(charge_power(max, max), 1.0);
            prop_assert!(jump_distance(p_lo) <= jump_distance(p_hi));
            prop_assert!(jump_height(p_lo) <= jump_height(p_hi));
            prop_assert_eq!(jump_distance(0.0), 2.0);
            prop_assert_eq!(jump_height(0.0), 1.0);
        }
    }
}
