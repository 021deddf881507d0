//! A studio logo you can drag, throw and spin.
//!
//! [`physics::PointerPhysics`] turns pointer drags into a position, rotation
//! and their per-frame rates, and coasts the logo with friction between
//! drags. The rest of the crate is one host for it: a terminal renderer that
//! draws the logo as a shaded record and feeds it mouse input.

pub mod app;
pub mod clock;
pub mod config;
pub mod graphics;
pub mod input;
pub mod math;
pub mod model;
pub mod physics;
pub mod pose;
pub mod render;
pub mod vertex;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{AppConfig, PhysicsConfig};
pub use input::PointerEvent;
pub use physics::{DragPhase, DragSession, PhysicsState, PointerPhysics, Vec2, Viewport};
