pub mod draw;
pub mod layout;
pub mod prize;
pub mod render;
pub mod spin;
pub mod store;

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use bon::Builder;
use log::{debug, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub use crate::layout::{layout, Segment};
pub use crate::prize::{default_prizes, Prize, RoundResult, NO_WIN_LABEL};
pub use crate::render::{Canvas, Color, PALETTE};
pub use crate::spin::SpinAnimation;
pub use crate::store::{AuthStatus, PrizeStore, StoreError};

#[derive(Debug, Error)]
pub enum WheelError {
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Surface(#[from] pixels::Error),
}

/// Commands accepted while the window is running, fed through the channel
/// given to [`Wheel::show_with_commands`].
#[derive(Debug, Clone)]
pub enum WheelCommand {
    Spin,
    SetPrizes(Vec<Prize>),
    Save,
}

#[derive(Debug, Clone, Builder)]
pub struct WheelConfig {
    #[builder(default = "幸运大转盘".to_string())]
    pub title: String,
    #[builder(default = 480)]
    pub window_width: usize,
    #[builder(default = 480)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Wheel geometry
    #[builder(default = 40)]
    pub wheel_margin: i32,
    #[builder(default = 6)]
    pub hub_radius: i32,
    #[builder(default = 18)]
    pub pointer_length: i32,
    #[builder(default = 10)]
    pub pointer_half_width: i32,
    #[builder(default = 0.65)]
    pub label_radius_factor: f64,
    #[builder(default = 22.0)]
    pub label_font_size: f32,

    // Spin timing
    #[builder(default = 3.6)]
    pub spin_duration_secs: f64,

    // Colors (segment fills come from the fixed palette)
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,
    #[builder(default = Color::new(0x22, 0x22, 0x22))]
    pub text_color: Color,
    #[builder(default = Color::new(0xe0, 0x2e, 0x2e))]
    pub pointer_color: Color,

    /// Raw bytes of a TTF/OTF font for labels. Labels and the result line
    /// are skipped when absent.
    pub font_data: Option<Vec<u8>>,
}

/// The lottery wheel: owns the prize set for the session and the transient
/// spin state. Drawing, layout and the weighted draw are pure functions in
/// their own modules; this type wires them to the window loop.
pub struct Wheel {
    config: WheelConfig,
    prizes: Vec<Prize>,
    current_angle: f64,
    animation: Option<SpinAnimation>,
    pending: Option<usize>,
    result: Option<RoundResult>,
    store: Option<PrizeStore>,
}

impl Wheel {
    pub fn new(config: WheelConfig, prizes: Vec<Prize>) -> Self {
        Self {
            config,
            prizes,
            current_angle: 0.0,
            animation: None,
            pending: None,
            result: None,
            store: None,
        }
    }

    /// Attach a backend store, enabling [`WheelCommand::Save`].
    pub fn with_store(mut self, store: PrizeStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    /// Replace the prize set. Takes effect on the next render; an in-flight
    /// spin keeps its already-computed target.
    pub fn set_prizes(&mut self, prizes: Vec<Prize>) {
        self.prizes = prizes;
    }

    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn is_spinning(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.is_cancelled())
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    /// Draw a prize and start the spin animation toward it. A request while
    /// a spin is already in progress is rejected, not queued.
    pub fn spin(&mut self) {
        if self.is_spinning() {
            warn!("spin requested while the wheel is already spinning, ignored");
            return;
        }
        let mut rng = rand::rng();
        let chosen = draw::pick(&self.prizes, &mut rng);
        let target = spin::target_angle(&self.prizes, self.current_angle, chosen, &mut rng);
        debug!(
            "spin started: segment {chosen}, {:.3} -> {:.3}",
            self.current_angle, target
        );
        self.pending = Some(chosen);
        self.animation = Some(SpinAnimation::new(
            self.current_angle,
            target,
            Duration::from_secs_f64(self.config.spin_duration_secs),
        ));
    }

    /// Cancel an in-flight spin; no further frames or completion will be
    /// observed. Idempotent, a no-op when idle.
    pub fn cancel_spin(&mut self) {
        if let Some(animation) = &mut self.animation {
            animation.cancel();
        }
    }

    /// Advance the spin by one frame against the wall clock. On completion
    /// the drawn prize becomes the displayed result.
    fn advance(&mut self) {
        let Some(animation) = &self.animation else {
            return;
        };
        match animation.tick() {
            None => {
                self.animation = None;
                self.pending = None;
            }
            Some((angle, finished)) => {
                self.current_angle = angle;
                if finished {
                    self.animation = None;
                    let prize = self
                        .pending
                        .take()
                        .and_then(|i| self.prizes.get(i).cloned())
                        .unwrap_or_else(Prize::no_win);
                    info!("round finished: {}", prize.name);
                    self.result = Some(RoundResult::from(&prize));
                }
            }
        }
    }

    pub fn save(&self) {
        match &self.store {
            Some(store) => match store.save(&self.prizes) {
                Ok(()) => info!("prize set saved"),
                Err(err @ (StoreError::NoSession | StoreError::Forbidden)) => {
                    warn!("cannot save prize set: {err}");
                }
                Err(err) => warn!("failed to save prize set: {err} (local state kept)"),
            },
            None => warn!("no backend configured, prize set kept locally"),
        }
    }

    fn handle_command(&mut self, command: WheelCommand) {
        match command {
            WheelCommand::Spin => self.spin(),
            WheelCommand::SetPrizes(prizes) => self.set_prizes(prizes),
            WheelCommand::Save => self.save(),
        }
    }

    pub fn show(&mut self) -> Result<(), WheelError> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<WheelCommand>,
    ) -> Result<(), WheelError> {
        self.run_window(Some(receiver))
    }

    fn run_window(&mut self, receiver: Option<Receiver<WheelCommand>>) -> Result<(), WheelError> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                self.config.window_width as f64,
                self.config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let font = self
            .config
            .font_data
            .as_ref()
            .and_then(|data| Font::try_from_vec(data.clone()));
        if self.config.font_data.is_some() && font.is_none() {
            warn!("label font could not be parsed, labels disabled");
        }

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        // Drop the pending frame loop before teardown.
                        self.cancel_spin();
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        self.spin();
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(receiver) = &receiver {
                            while let Ok(command) = receiver.try_recv() {
                                self.handle_command(command);
                            }
                        }
                        self.advance();

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        let segments = layout(&self.prizes);
                        render::render_wheel(
                            &mut canvas,
                            &segments,
                            self.current_angle,
                            self.result.as_ref(),
                            font.as_ref(),
                            &self.config,
                        );
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> Wheel {
        let config = WheelConfig::builder().spin_duration_secs(3.6).build();
        Wheel::new(config, default_prizes())
    }

    #[test]
    fn spin_while_spinning_is_rejected_and_target_kept() {
        let mut wheel = wheel();
        wheel.spin();
        assert!(wheel.is_spinning());
        let target = wheel.animation.as_ref().map(SpinAnimation::target);

        wheel.spin();
        assert!(wheel.is_spinning());
        assert_eq!(
            wheel.animation.as_ref().map(SpinAnimation::target),
            target,
            "re-entrant spin must not disturb the in-flight animation"
        );
    }

    #[test]
    fn cancel_discards_the_round_without_a_result() {
        let mut wheel = wheel();
        wheel.spin();
        wheel.cancel_spin();
        assert!(!wheel.is_spinning());
        wheel.advance();
        assert!(wheel.last_result().is_none());
        assert!(wheel.animation.is_none());
        // Safe to cancel again while idle.
        wheel.cancel_spin();
    }

    #[test]
    fn zero_duration_spin_completes_on_the_next_frame() {
        let config = WheelConfig::builder().spin_duration_secs(0.0).build();
        let mut wheel = Wheel::new(config, vec![Prize::new("A", 1.0)]);
        wheel.spin();
        wheel.advance();
        assert!(!wheel.is_spinning());
        assert_eq!(wheel.last_result().map(|r| r.name.as_str()), Some("A"));
    }

    #[test]
    fn builder_defaults_are_sane() {
        let config = WheelConfig::builder().build();
        assert_eq!(config.window_width, 480);
        assert!(config.spin_duration_secs > 3.0 && config.spin_duration_secs < 4.0);
        assert!(config.font_data.is_none());
        assert_eq!(config.label_radius_factor, 0.65);
    }
}
