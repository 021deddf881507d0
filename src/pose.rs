use crate::config::LogoVariant;
use crate::physics::PhysicsState;

/// Where and how the renderer should place the logo this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub translation: [f64; 3],
    /// Euler angles in radians, applied x, then y, then z
    pub rotation: [f64; 3],
    pub scale: f64,
}

/// Projects the physics state onto the logo's transform and layers the
/// decorative float and sway on top. Nothing here feeds back into physics.
pub fn project(state: &PhysicsState, elapsed_secs: f64, variant: LogoVariant) -> ObjectTransform {
    let t = elapsed_secs;
    match variant {
        LogoVariant::Hero => ObjectTransform {
            translation: [state.position.x, state.position.y + (t * 0.5).sin() * 0.1, 0.0],
            rotation: [state.rotation.x, state.rotation.y, (t * 0.8).sin() * 0.15],
            scale: 1.0,
        },
        LogoVariant::Badge => ObjectTransform {
            translation: [state.position.x, state.position.y, 0.0],
            rotation: [state.rotation.x, state.rotation.y, (t * 1.5).sin() * 0.3],
            scale: 0.8,
        },
    }
}
