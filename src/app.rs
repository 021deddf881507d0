use std::collections::VecDeque;
use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;

use crate::clock::{Clock, MonotonicClock};
use crate::config::AppConfig;
use crate::graphics::Rgb;
use crate::input;
use crate::physics::{PointerPhysics, Viewport};
use crate::pose;
use crate::render::{present, Renderer};

/// Source of terminal events so the frame loop can run without a real tty
pub trait EventSource {
    fn next(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct CrosstermEventSource;

impl EventSource for CrosstermEventSource {
    fn next(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Replays a fixed list of steps. `None` ends the current frame's input;
/// once the list runs out every call ends the frame immediately.
#[derive(Debug, Default)]
pub struct ScriptedEventSource {
    steps: VecDeque<Option<Event>>,
}

impl ScriptedEventSource {
    pub fn new(steps: impl IntoIterator<Item = Option<Event>>) -> Self {
        ScriptedEventSource {
            steps: steps.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEventSource {
    fn next(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        Ok(self.steps.pop_front().flatten())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The hosting view: owns the simulator and drives it once per frame
pub struct App<C: Clock = MonotonicClock> {
    config: AppConfig,
    physics: PointerPhysics<C>,
    renderer: Renderer,
    width: usize,
    height: usize,
    started: Instant,
    paused: bool,
    debug: bool,
    wireframe: bool,
    frames_rendered: u64,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl App<MonotonicClock> {
    pub fn new(config: AppConfig, width: u16, height: u16) -> Self {
        Self::with_clock(config, width, height, MonotonicClock::new())
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(config: AppConfig, width: u16, height: u16, clock: C) -> Self {
        let viewport = Viewport::new(f64::from(width), f64::from(height));
        let now = Instant::now();
        App {
            physics: PointerPhysics::with_clock(config.physics, viewport, clock),
            renderer: Renderer::new(config.theme),
            width: usize::from(width),
            height: usize::from(height),
            started: now,
            paused: false,
            debug: config.debug,
            wireframe: config.wireframe,
            frames_rendered: 0,
            frames_since_last_update: 0,
            last_fps_calculation: now,
            fps: 0.0,
            config,
        }
    }

    pub fn physics(&self) -> &PointerPhysics<C> {
        &self.physics
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Applies one terminal event. Pointer input is ignored while paused.
    pub fn handle_event(&mut self, event: &Event) -> Control {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.handle_key(key),
            Event::Resize(width, height) => {
                self.width = usize::from(*width);
                self.height = usize::from(*height);
                self.physics
                    .set_viewport(f64::from(*width), f64::from(*height));
            }
            _ => {
                if !self.paused {
                    if let Some(pointer) = input::from_terminal(event) {
                        self.physics.handle(pointer);
                    }
                }
            }
        }
        Control::Continue
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('d') | KeyCode::Char('D') => self.debug = !self.debug,
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.paused = !self.paused;
                // a stopped frame loop must not keep a drag alive
                self.physics.cancel_drag();
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                if !self.paused {
                    self.wireframe = !self.wireframe;
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if !self.paused {
                    self.physics.reset();
                    self.wireframe = false;
                }
            }
            _ => {}
        }
        Control::Continue
    }

    /// Advances the simulation one tick and draws the frame into the canvas
    pub fn frame(&mut self) {
        if !self.paused {
            self.physics.tick();
        }

        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let transform = pose::project(self.physics.state(), elapsed, self.config.variant);
        self.renderer.draw(
            &transform,
            self.physics.config().bounds,
            self.width,
            self.height,
            self.wireframe,
        );

        if self.debug {
            self.draw_debug();
        }
        if self.paused {
            self.draw_paused();
        }
        self.frames_rendered += 1;
    }

    fn draw_debug(&mut self) {
        let state = *self.physics.state();
        let lines = [
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Position: ({:.2}, {:.2})", state.position.x, state.position.y),
            format!("Rotation: ({:.2}, {:.2})", state.rotation.x, state.rotation.y),
            format!("Velocity: ({:.4}, {:.4})", state.velocity.x, state.velocity.y),
            format!("Spin: ({:.4}, {:.4})", state.spin_velocity.x, state.spin_velocity.y),
            format!("Dragging: {}", if self.physics.is_dragging() { "yes" } else { "no" }),
            format!("FPS: {:.2}", self.fps),
        ];
        let canvas = self.renderer.canvas_mut();
        for (row, line) in lines.iter().enumerate() {
            canvas.put_str(1, row, line, Rgb::WHITE);
        }
    }

    fn draw_paused(&mut self) {
        let text = "Paused";
        let canvas = self.renderer.canvas_mut();
        let x = canvas.width().saturating_sub(text.len()) / 2;
        let y = canvas.height() / 2;
        canvas.put_str(x, y, text, Rgb::WHITE);
    }

    /// Runs the frame loop until quit or the frame limit. All input that
    /// arrives before a frame's deadline is applied before its tick.
    pub fn run<W: Write, S: EventSource>(&mut self, out: &mut W, source: &mut S) -> Result<()> {
        let frame_duration = self.config.frame_duration();
        info!(
            "running at {} fps on a {}x{} viewport",
            self.config.fps, self.width, self.height
        );

        loop {
            let deadline = Instant::now() + frame_duration;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                match source.next(deadline - now)? {
                    Some(event) => {
                        if self.handle_event(&event) == Control::Quit {
                            info!("quit after {} frames", self.frames_rendered);
                            return Ok(());
                        }
                    }
                    None => break,
                }
            }

            self.frame();
            present(out, self.renderer.canvas()).context("failed to draw frame")?;

            if let Some(limit) = self.config.frame_limit {
                if self.frames_rendered >= limit {
                    info!("frame limit of {limit} reached");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn app(clock: &ManualClock) -> App<&ManualClock> {
        App::with_clock(AppConfig::default(), 100, 40, clock)
    }

    #[test]
    fn quit_keys() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        assert_eq!(app.handle_event(&key('q')), Control::Quit);
        assert_eq!(
            app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))),
            Control::Quit
        );
        assert_eq!(
            app.handle_event(&Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            Control::Quit
        );
        assert_eq!(app.handle_event(&key('c')), Control::Continue);
    }

    #[test]
    fn toggles() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        app.handle_event(&key('d'));
        app.handle_event(&key('w'));
        assert!(app.is_debug());
        assert!(app.is_wireframe());
        app.handle_event(&key('r'));
        assert!(!app.is_wireframe());
    }

    #[test]
    fn mouse_drag_moves_the_logo() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);

        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 50, 20));
        assert!(app.physics().is_dragging());
        clock.advance(100.0);
        app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 60, 20));
        app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 60, 20));

        // 10 of 100 columns is a fifth of the 16 unit wide area
        assert!((app.physics().state().position.x - 1.6).abs() < 1e-12);
        assert!(!app.physics().is_dragging());
    }

    #[test]
    fn pause_drops_drag_and_freezes_physics() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 50, 20));
        clock.advance(50.0);
        app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 55, 18));

        app.handle_event(&key('p'));
        assert!(app.is_paused());
        assert!(!app.physics().is_dragging());

        let before = *app.physics().state();
        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        app.frame();
        app.frame();
        assert!(!app.physics().is_dragging());
        assert_eq!(*app.physics().state(), before);

        // wireframe and reset wait until unpaused
        app.handle_event(&key('w'));
        assert!(!app.is_wireframe());
    }

    #[test]
    fn release_coasts_over_frames() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 50, 20));
        clock.advance(200.0);
        app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 52, 20));
        app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 52, 20));

        let released = app.physics().state().position.x;
        app.frame();
        app.frame();
        assert!(app.physics().state().position.x > released);
        assert_eq!(app.frames_rendered(), 2);
    }

    #[test]
    fn resize_updates_viewport_and_canvas() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        app.handle_event(&Event::Resize(40, 12));
        app.frame();
        assert_eq!(app.physics().viewport(), Viewport::new(40.0, 12.0));
        assert_eq!(app.renderer().canvas().width(), 40);
        assert_eq!(app.renderer().canvas().height(), 12);
    }

    #[test]
    fn debug_overlay_and_paused_banner() {
        let clock = ManualClock::new(0.0);
        let mut app = app(&clock);
        app.handle_event(&key('d'));
        app.handle_event(&key('p'));
        app.frame();

        let rows: Vec<String> = app
            .renderer()
            .canvas()
            .rows()
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .collect();
        assert!(rows[0].starts_with(" logo3d "));
        assert!(rows[1].contains("Position: (0.00, 0.00)"));
        assert!(rows[20].contains("Paused"));
    }

    #[test]
    fn run_stops_at_frame_limit() {
        let clock = ManualClock::new(0.0);
        let config = AppConfig {
            fps: 1,
            frame_limit: Some(3),
            ..AppConfig::default()
        };
        let mut app = App::with_clock(config, 30, 10, &clock);
        let mut source = ScriptedEventSource::default();
        let mut out = Vec::new();

        app.run(&mut out, &mut source).unwrap();

        assert_eq!(app.frames_rendered(), 3);
        assert!(!out.is_empty());
    }

    #[test]
    fn run_applies_input_before_the_tick_and_quits() {
        let clock = ManualClock::new(0.0);
        let config = AppConfig {
            fps: 1,
            ..AppConfig::default()
        };
        let mut app = App::with_clock(config, 100, 40, &clock);
        let mut source = ScriptedEventSource::new([
            Some(mouse(MouseEventKind::Down(MouseButton::Left), 50, 20)),
            Some(mouse(MouseEventKind::Drag(MouseButton::Left), 60, 20)),
            None,
            Some(mouse(MouseEventKind::Up(MouseButton::Left), 60, 20)),
            None,
            Some(key('q')),
        ]);
        let mut out = Vec::new();

        app.run(&mut out, &mut source).unwrap();

        assert_eq!(app.frames_rendered(), 2);
        assert!(!app.physics().is_dragging());
        assert!(app.physics().state().position.x > 1.6);
    }
}
