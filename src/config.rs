use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::physics::Vec2;

/// Half-extents of the area the logo may roam, in scene units
pub const DEFAULT_BOUNDS: Vec2 = Vec2 { x: 8.0, y: 5.0 };
pub const MAX_SPEED: f64 = 0.08;
pub const MAX_SPIN: f64 = 0.03;
pub const FRICTION: f64 = 0.995;
/// Throw velocity is `world_delta * (VELOCITY_SCALE / dt_ms)`
pub const VELOCITY_SCALE: f64 = 5.0;
/// Radians of spin per pixel of drag
pub const SPIN_SCALE: f64 = 0.002;
/// Share of a reflected velocity handed to the orthogonal spin axis
pub const BOUNCE_SPIN_TRANSFER: f64 = 0.3;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 240;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("bounds must be positive and finite, got ({x}, {y})")]
    InvalidBounds { x: f64, y: f64 },
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("friction must be in (0, 1], got {0}")]
    InvalidFriction(f64),
    #[error("fps must be between {min} and {max}, got {0}", min = MIN_FPS, max = MAX_FPS)]
    InvalidFps(u32),
}

/// Constants of the drag-and-throw simulation. Fixed once a simulator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub bounds: Vec2,
    pub max_speed: f64,
    pub max_spin: f64,
    pub friction: f64,
    pub velocity_scale: f64,
    pub spin_scale: f64,
    pub bounce_spin_transfer: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            bounds: DEFAULT_BOUNDS,
            max_speed: MAX_SPEED,
            max_spin: MAX_SPIN,
            friction: FRICTION,
            velocity_scale: VELOCITY_SCALE,
            spin_scale: SPIN_SCALE,
            bounce_spin_transfer: BOUNCE_SPIN_TRANSFER,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Vec2 { x, y } = self.bounds;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(ConfigError::InvalidBounds { x, y });
        }
        for (name, value) in [
            ("max_speed", self.max_speed),
            ("max_spin", self.max_spin),
            ("velocity_scale", self.velocity_scale),
            ("spin_scale", self.spin_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(self.bounce_spin_transfer.is_finite() && self.bounce_spin_transfer >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "bounce_spin_transfer",
                value: self.bounce_spin_transfer,
            });
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(ConfigError::InvalidFriction(self.friction));
        }
        Ok(())
    }
}

/// Palette the logo is drawn with. Stands in for the site-wide theme flag
/// that picked which logo asset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Which of the site's two logo placements to imitate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogoVariant {
    /// Large home-page logo: floats up and down and sways gently
    #[default]
    Hero,
    /// Small header badge: no float, faster and wider sway
    Badge,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "logo3d", version, about = "Drag, throw and spin a 3D studio logo in your terminal")]
pub struct Cli {
    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Logo palette
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    pub theme: Theme,

    /// Logo placement to imitate
    #[arg(long, value_enum, default_value_t = LogoVariant::Hero)]
    pub variant: LogoVariant,

    /// Start in wireframe mode
    #[arg(short, long)]
    pub wireframe: bool,

    /// Start with the debug overlay visible
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to this file (the terminal is taken by the canvas)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Exit after rendering this many frames
    #[arg(long)]
    pub frames: Option<u64>,
}

/// Everything the application needs, resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub physics: PhysicsConfig,
    pub fps: u32,
    pub theme: Theme,
    pub variant: LogoVariant,
    pub wireframe: bool,
    pub debug: bool,
    pub frame_limit: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            physics: PhysicsConfig::default(),
            fps: 60,
            theme: Theme::default(),
            variant: LogoVariant::default(),
            wireframe: false,
            debug: false,
            frame_limit: None,
        }
    }
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = AppConfig {
            physics: PhysicsConfig::default(),
            fps: cli.fps,
            theme: cli.theme,
            variant: cli.variant,
            wireframe: cli.wireframe,
            debug: cli.debug,
            frame_limit: cli.frames,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        self.physics.validate()
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(MIN_FPS)))
    }
}
