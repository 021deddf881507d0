//! Drag-and-throw physics for the logo.
//!
//! Two drivers move the state and never run at the same time: pointer drags
//! write position directly and estimate a throw velocity, and idle ticks
//! integrate that velocity with friction and bounce off the bounds.

use std::ops::{Add, AddAssign, Mul};

use log::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::config::PhysicsConfig;
use crate::input::PointerEvent;

/// Smallest drag interval used when estimating throw velocity, in ms
const MIN_DRAG_DT_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clamps each component to `[-max, max]`
    pub fn clamp_abs(self, max: f64) -> Self {
        Vec2 {
            x: clamp_abs(self.x, max),
            y: clamp_abs(self.y, max),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Position and orientation of the logo plus their per-tick rates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsState {
    /// Offset from the scene origin, in scene units
    pub position: Vec2,
    /// Added to `position` on every idle tick
    pub velocity: Vec2,
    /// Radians; x follows vertical drag, y follows horizontal drag
    pub rotation: Vec2,
    /// Added to `rotation` on every idle tick
    pub spin_velocity: Vec2,
}

/// Last pointer sample of an active drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub last_position: Vec2,
    pub last_timestamp_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Size of the surface pointer coordinates are measured on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    /// Maps a pointer delta to a scene delta. The full viewport spans the
    /// full bounds; screen y grows downwards, scene y upwards.
    pub fn to_world(&self, dx: f64, dy: f64, bounds: Vec2) -> Vec2 {
        let x = if self.width > 0.0 {
            (dx / self.width) * bounds.x * 2.0
        } else {
            0.0
        };
        let y = if self.height > 0.0 {
            -(dy / self.height) * bounds.y * 2.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// Pointer-driven simulator behind the floating logo
#[derive(Debug)]
pub struct PointerPhysics<C: Clock = MonotonicClock> {
    config: PhysicsConfig,
    viewport: Viewport,
    state: PhysicsState,
    phase: DragPhase,
    clock: C,
}

impl PointerPhysics<MonotonicClock> {
    pub fn new(config: PhysicsConfig, viewport: Viewport) -> Self {
        Self::with_clock(config, viewport, MonotonicClock::new())
    }
}

impl<C: Clock> PointerPhysics<C> {
    pub fn with_clock(config: PhysicsConfig, viewport: Viewport, clock: C) -> Self {
        PointerPhysics {
            config,
            viewport,
            state: PhysicsState::default(),
            phase: DragPhase::Idle,
            clock,
        }
    }

    pub fn state(&self) -> &PhysicsState {
        &self.state
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport != self.viewport {
            debug!("viewport resized to {width}x{height}");
            self.viewport = viewport;
        }
    }

    /// Overwrites the state, leaving the drag phase alone
    pub fn set_state(&mut self, state: PhysicsState) {
        self.state = state;
    }

    /// Puts the logo back at rest in the middle and forgets any drag
    pub fn reset(&mut self) {
        self.state = PhysicsState::default();
        self.phase = DragPhase::Idle;
    }

    pub fn on_drag_start(&mut self, x: f64, y: f64) {
        self.state.velocity = Vec2::ZERO;
        self.state.spin_velocity = Vec2::ZERO;
        self.phase = DragPhase::Dragging(DragSession {
            last_position: Vec2::new(x, y),
            last_timestamp_ms: self.clock.now_ms(),
        });
        debug!("drag started at ({x:.1}, {y:.1})");
    }

    pub fn on_drag_move(&mut self, x: f64, y: f64) {
        let DragPhase::Dragging(session) = &mut self.phase else {
            return;
        };
        let now = self.clock.now_ms();
        let dt = (now - session.last_timestamp_ms).max(MIN_DRAG_DT_MS);

        let dx = x - session.last_position.x;
        let dy = y - session.last_position.y;
        let world = self.viewport.to_world(dx, dy, self.config.bounds);

        self.state.position += world;
        self.state.velocity =
            (world * (self.config.velocity_scale / dt)).clamp_abs(self.config.max_speed);
        self.state.spin_velocity =
            (Vec2::new(dy, dx) * self.config.spin_scale).clamp_abs(self.config.max_spin);

        session.last_position = Vec2::new(x, y);
        session.last_timestamp_ms = now;
    }

    /// Ends the drag. Whatever velocity and spin the drag left behind carry
    /// the logo from here on.
    pub fn on_drag_end(&mut self) {
        if let DragPhase::Dragging(_) = self.phase {
            debug!(
                "released with velocity ({:.4}, {:.4}) spin ({:.4}, {:.4})",
                self.state.velocity.x,
                self.state.velocity.y,
                self.state.spin_velocity.x,
                self.state.spin_velocity.y
            );
        }
        self.phase = DragPhase::Idle;
    }

    /// Drops a drag without releasing it, e.g. when the frame loop stops.
    /// The logo is left at rest where the drag put it.
    pub fn cancel_drag(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
            self.state.velocity = Vec2::ZERO;
            self.state.spin_velocity = Vec2::ZERO;
        }
        self.phase = DragPhase::Idle;
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Start { x, y } => self.on_drag_start(x, y),
            PointerEvent::Move { x, y } => self.on_drag_move(x, y),
            PointerEvent::End | PointerEvent::Leave => self.on_drag_end(),
        }
    }

    /// Advances one animation frame. Does nothing while a drag is active.
    pub fn tick(&mut self) {
        if self.is_dragging() {
            return;
        }
        let cfg = &self.config;
        let state = &mut self.state;

        state.velocity = state.velocity.clamp_abs(cfg.max_speed);
        state.spin_velocity = state.spin_velocity.clamp_abs(cfg.max_spin);

        state.position += state.velocity;
        state.rotation += state.spin_velocity;

        state.velocity = state.velocity * cfg.friction;
        state.spin_velocity = state.spin_velocity * cfg.friction;

        // x wall: reflected x velocity spins the logo around y
        if let Some(v) = reflect(&mut state.position.x, &mut state.velocity.x, cfg.bounds.x) {
            state.spin_velocity.y = clamp_abs(
                state.spin_velocity.y + v * cfg.bounce_spin_transfer,
                cfg.max_spin,
            );
            trace!("bounced off x wall, velocity.x = {v:.4}");
        }
        // y wall: reflected y velocity spins the logo around x
        if let Some(v) = reflect(&mut state.position.y, &mut state.velocity.y, cfg.bounds.y) {
            state.spin_velocity.x = clamp_abs(
                state.spin_velocity.x + v * cfg.bounce_spin_transfer,
                cfg.max_spin,
            );
            trace!("bounced off y wall, velocity.y = {v:.4}");
        }
    }
}

// f64::clamp panics on a NaN limit; this just passes NaN through
fn clamp_abs(value: f64, max: f64) -> f64 {
    value.max(-max).min(max)
}

/// Clamps `position` to `[-bound, bound]`. On contact the velocity is negated
/// and its new value returned.
fn reflect(position: &mut f64, velocity: &mut f64, bound: f64) -> Option<f64> {
    if *position > bound {
        *position = bound;
    } else if *position < -bound {
        *position = -bound;
    } else {
        return None;
    }
    *velocity = -*velocity;
    Some(*velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{MAX_SPEED, MAX_SPIN};

    fn sim(clock: &ManualClock) -> PointerPhysics<&ManualClock> {
        PointerPhysics::with_clock(PhysicsConfig::default(), Viewport::new(1000.0, 600.0), clock)
    }

    fn moving(velocity: Vec2, spin: Vec2) -> PhysicsState {
        PhysicsState {
            velocity,
            spin_velocity: spin,
            ..PhysicsState::default()
        }
    }

    #[test]
    fn drag_start_zeroes_velocity_and_spin() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(moving(Vec2::new(0.05, -0.02), Vec2::new(0.01, 0.03)));

        physics.on_drag_start(10.0, 20.0);

        assert!(physics.is_dragging());
        assert_eq!(physics.state().velocity, Vec2::ZERO);
        assert_eq!(physics.state().spin_velocity, Vec2::ZERO);
    }

    #[test]
    fn drag_moves_position_by_viewport_fraction_of_bounds() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);

        physics.on_drag_start(500.0, 300.0);
        clock.advance(100.0);
        physics.on_drag_move(600.0, 300.0);

        let state = physics.state();
        assert_eq!(state.position.x, 1.6);
        assert_eq!(state.position.y, 0.0);
        // 1.6 * 5 / 100 lands right on the speed cap
        assert!((state.velocity.x - MAX_SPEED).abs() < 1e-12);
        assert!(state.velocity.x <= MAX_SPEED);
        assert_eq!(state.velocity.y, 0.0);
        // horizontal drag spins around y: 100 px * 0.002 = 0.2, capped
        assert_eq!(state.spin_velocity.y, MAX_SPIN);
        assert_eq!(state.spin_velocity.x, 0.0);
    }

    #[test]
    fn upward_drag_moves_up_in_scene() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);

        physics.on_drag_start(500.0, 300.0);
        clock.advance(50.0);
        physics.on_drag_move(500.0, 240.0);

        // 60 / 600 * 5 * 2
        assert!((physics.state().position.y - 1.0).abs() < 1e-12);
        assert!(physics.state().velocity.y > 0.0);
        assert!(physics.state().spin_velocity.x < 0.0);
    }

    #[test]
    fn slow_drag_keeps_unclamped_throw_velocity() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);

        physics.on_drag_start(0.0, 0.0);
        clock.advance(500.0);
        physics.on_drag_move(10.0, 0.0);

        // 0.16 * 5 / 500
        assert!((physics.state().velocity.x - 0.0016).abs() < 1e-12);
        assert!((physics.state().spin_velocity.y - 0.02).abs() < 1e-12);
    }

    #[test]
    fn simultaneous_samples_use_minimum_dt() {
        let clock = ManualClock::new(42.0);
        let mut physics = sim(&clock);

        physics.on_drag_start(0.0, 0.0);
        physics.on_drag_move(10.0, 0.0);

        // 0.16 * 5 / 1 would be 0.8 without the cap
        let state = physics.state();
        assert!(state.velocity.x.is_finite());
        assert_eq!(state.velocity.x, MAX_SPEED);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(moving(Vec2::new(0.01, 0.0), Vec2::ZERO));
        let before = *physics.state();

        physics.on_drag_move(900.0, 100.0);
        assert_eq!(*physics.state(), before);

        physics.on_drag_start(0.0, 0.0);
        physics.on_drag_end();
        let before = *physics.state();
        clock.advance(16.0);
        physics.on_drag_move(900.0, 100.0);
        assert_eq!(*physics.state(), before);
    }

    #[test]
    fn zero_delta_round_trip_leaves_logo_at_rest() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(PhysicsState {
            position: Vec2::new(1.5, -2.0),
            velocity: Vec2::new(0.04, 0.01),
            ..PhysicsState::default()
        });

        physics.on_drag_start(120.0, 80.0);
        clock.advance(16.0);
        physics.on_drag_move(120.0, 80.0);
        physics.on_drag_end();

        assert_eq!(physics.state().position, Vec2::new(1.5, -2.0));
        assert_eq!(physics.state().velocity, Vec2::ZERO);
        assert!(!physics.is_dragging());
    }

    #[test]
    fn zero_sized_viewport_produces_no_motion() {
        let clock = ManualClock::new(0.0);
        let mut physics =
            PointerPhysics::with_clock(PhysicsConfig::default(), Viewport::new(0.0, 0.0), &clock);

        physics.on_drag_start(0.0, 0.0);
        clock.advance(10.0);
        physics.on_drag_move(50.0, 50.0);

        assert_eq!(physics.state().position, Vec2::ZERO);
        assert_eq!(physics.state().velocity, Vec2::ZERO);
    }

    #[test]
    fn tick_is_frozen_while_dragging() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.on_drag_start(0.0, 0.0);
        clock.advance(20.0);
        physics.on_drag_move(30.0, 10.0);
        let before = *physics.state();

        for _ in 0..10 {
            physics.tick();
        }
        assert_eq!(*physics.state(), before);
    }

    #[test]
    fn release_coasts_with_inherited_velocity() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.on_drag_start(500.0, 300.0);
        clock.advance(100.0);
        physics.on_drag_move(550.0, 300.0);
        physics.on_drag_end();

        let released = *physics.state();
        physics.tick();
        let after = physics.state();
        assert!((after.position.x - (released.position.x + released.velocity.x)).abs() < 1e-12);
        assert!((after.rotation.y - released.spin_velocity.y).abs() < 1e-12);
        assert!(after.velocity.x < released.velocity.x);
    }

    #[test]
    fn tick_bounces_off_the_right_wall() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        let bound = physics.config().bounds.x;
        physics.set_state(PhysicsState {
            position: Vec2::new(bound - 0.01, 0.0),
            velocity: Vec2::new(0.05, 0.0),
            ..PhysicsState::default()
        });

        physics.tick();

        let state = physics.state();
        assert_eq!(state.position.x, bound);
        assert!(state.velocity.x < 0.0);
        assert!((state.velocity.x + 0.05 * 0.995).abs() < 1e-12);
        // the reflected velocity spills into spin around y
        assert!((state.spin_velocity.y - state.velocity.x * 0.3).abs() < 1e-12);
    }

    #[test]
    fn tick_bounces_off_the_floor() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        let bound = physics.config().bounds.y;
        physics.set_state(PhysicsState {
            position: Vec2::new(0.0, -bound + 0.01),
            velocity: Vec2::new(0.0, -0.07),
            spin_velocity: Vec2::new(0.029, 0.0),
            ..PhysicsState::default()
        });

        physics.tick();

        let state = physics.state();
        assert_eq!(state.position.y, -bound);
        assert!(state.velocity.y > 0.0);
        assert!(state.spin_velocity.x <= MAX_SPIN);
        assert_eq!(state.spin_velocity.x, MAX_SPIN);
    }

    #[test]
    fn tick_reclamps_out_of_range_rates() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(moving(Vec2::new(3.0, -3.0), Vec2::new(-1.0, 1.0)));

        physics.tick();

        let state = physics.state();
        assert!(state.velocity.x.abs() <= MAX_SPEED);
        assert!(state.velocity.y.abs() <= MAX_SPEED);
        assert!(state.spin_velocity.x.abs() <= MAX_SPIN);
        assert!(state.spin_velocity.y.abs() <= MAX_SPIN);
        assert_eq!(state.position, Vec2::new(MAX_SPEED, -MAX_SPEED));
    }

    #[test]
    fn idle_coast_decays_strictly_and_settles() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(moving(Vec2::new(0.03, 0.02), Vec2::new(0.01, -0.01)));

        let mut speed = physics.state().velocity.length();
        for _ in 0..8000 {
            physics.tick();
            let next = physics.state().velocity.length();
            if speed > 1e-300 {
                assert!(next < speed);
            }
            speed = next;
        }
        assert!(speed < 1e-12);

        let settled = physics.state().position;
        physics.tick();
        let delta = physics.state().position.x - settled.x;
        assert!(delta.abs() < 1e-12);
    }

    #[test]
    fn cancel_drag_stops_the_logo_in_place() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.on_drag_start(0.0, 0.0);
        clock.advance(10.0);
        physics.on_drag_move(40.0, 0.0);
        let position = physics.state().position;

        physics.cancel_drag();

        assert!(!physics.is_dragging());
        assert_eq!(physics.state().velocity, Vec2::ZERO);
        physics.tick();
        assert_eq!(physics.state().position, position);
    }

    #[test]
    fn handle_dispatches_pointer_events() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);

        physics.handle(PointerEvent::Start { x: 0.0, y: 0.0 });
        assert!(physics.is_dragging());
        clock.advance(100.0);
        physics.handle(PointerEvent::Move { x: 100.0, y: 0.0 });
        assert_eq!(physics.state().position.x, 1.6);
        physics.handle(PointerEvent::Leave);
        assert!(!physics.is_dragging());
    }

    #[test]
    fn reset_returns_to_rest() {
        let clock = ManualClock::new(0.0);
        let mut physics = sim(&clock);
        physics.set_state(PhysicsState {
            position: Vec2::new(2.0, 1.0),
            rotation: Vec2::new(0.5, 0.5),
            ..moving(Vec2::new(0.02, 0.02), Vec2::new(0.01, 0.01))
        });
        physics.on_drag_start(0.0, 0.0);

        physics.reset();

        assert_eq!(*physics.state(), PhysicsState::default());
        assert_eq!(*physics.phase(), DragPhase::Idle);
    }
}
