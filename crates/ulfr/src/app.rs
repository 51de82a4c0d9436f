//! Application driver and plugin system.
//!
//! [`App`] owns the [`Scheduler`] and the [`Context`]. Register systems and
//! plugins, then call [`run`](App::run) to start the loop.
//!
//! # Example
//!
//! ```ignore
//! use ulfr::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut app = App::new();
//!     app.add_system(SchedulePriority::Init, setup)?
//!         .add_system(SchedulePriority::Tick, physics)?
//!         .add_system(SchedulePriority::Update, quit_after_ten_seconds)?;
//!     app.run()
//! }
//!
//! fn quit_after_ten_seconds(ctx: &mut Context) {
//!     if ctx.time.elapsed_secs() > 10.0 {
//!         ctx.stop();
//!     }
//! }
//! ```
//!
//! ## Loop
//!
//! ```text
//! init()                                     PreInit, Init, PostInit
//! while running:
//!     time.update()
//!     PreUpdate
//!     while tick due: Tick; consume tick     (optionally capped)
//!     Update
//!     mark events
//!     PostUpdate
//!     rotate events                          (PostUpdate's events carry over)
//! Last
//! ```

use std::time::Duration;

use crate::config::AppConfig;
use crate::context::Context;
use crate::error::{ConfigError, EngineError};
use crate::schedule::{IntoSystem, IntoSystems, SchedulePriority, Scheduler};

/// Lifecycle of an [`App`]. It only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    NotStarted,
    Running,
    Stopped,
}

/// A bundle of systems that extends an [`App`].
///
/// # Example
///
/// ```ignore
/// pub struct WindowPlugin;
///
/// impl Plugin for WindowPlugin {
///     fn build(&self, app: &mut App) -> Result<(), EngineError> {
///         app.add_system(SchedulePriority::Init, open_window)?
///             .add_system(SchedulePriority::PostUpdate, poll_window_events)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin {
    fn build(&self, app: &mut App) -> Result<(), EngineError>;
}

/// The application driver.
pub struct App {
    config: AppConfig,
    scheduler: Scheduler,
    ctx: Context,
    state: AppState,
}

impl App {
    /// App with the default [`AppConfig`].
    pub fn new() -> Self {
        let config = AppConfig::default();
        Self {
            ctx: Context::from_config(&config),
            config,
            scheduler: Scheduler::new(),
            state: AppState::NotStarted,
        }
    }

    /// App with a validated `config`.
    pub fn with_config(config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ctx: Context::from_config(&config),
            config,
            scheduler: Scheduler::new(),
            state: AppState::NotStarted,
        })
    }

    pub fn add_system<M>(
        &mut self,
        phase: SchedulePriority,
        system: impl IntoSystem<M>,
    ) -> Result<&mut Self, EngineError> {
        self.scheduler.add_system(phase, system)?;
        Ok(self)
    }

    pub fn add_systems<M>(
        &mut self,
        phase: SchedulePriority,
        systems: impl IntoSystems<M>,
    ) -> Result<&mut Self, EngineError> {
        self.scheduler.add_systems(phase, systems)?;
        Ok(self)
    }

    /// Apply a plugin, which can register systems and touch the context.
    pub fn add_plugin(&mut self, plugin: impl Plugin) -> Result<&mut Self, EngineError> {
        plugin.build(self)?;
        Ok(self)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Mutable context, for setup before [`run`](Self::run).
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run init, loop until a system calls [`Context::stop`], then run the
    /// Last phase.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyStarted`] unless the app is
    /// [`NotStarted`](AppState::NotStarted). A system error stops the loop
    /// at once (Last is skipped) and is returned.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.state != AppState::NotStarted {
            return Err(EngineError::AlreadyStarted);
        }
        if self.config.console_logging {
            crate::logger::init_env_logger();
        }
        self.state = AppState::Running;
        self.ctx.set_running(true);
        log::info!(
            "starting '{}' (tick rate {:.4}s)",
            self.config.name,
            self.config.tick_rate
        );

        let result = self.drive();

        self.ctx.set_running(false);
        self.state = AppState::Stopped;
        match &result {
            Ok(()) => log::info!(
                "'{}' stopped after {} frames, {} ticks",
                self.config.name,
                self.ctx.time.frame_count(),
                self.ctx.time.tick_count()
            ),
            Err(err) => log::error!("'{}' aborted: {err}", self.config.name),
        }
        result
    }

    fn drive(&mut self) -> Result<(), EngineError> {
        self.scheduler.init(&mut self.ctx)?;
        while self.ctx.is_running() {
            self.iteration()?;
        }
        self.scheduler.run_systems(&mut self.ctx, SchedulePriority::Last)
    }

    fn iteration(&mut self) -> Result<(), EngineError> {
        match self.config.frame_delta {
            Some(seconds) => self.ctx.time.advance(Duration::from_secs_f64(seconds)),
            None => self.ctx.time.update(),
        }

        self.scheduler.run_systems(&mut self.ctx, SchedulePriority::PreUpdate)?;

        let mut ticks = 0u32;
        while self.ctx.time.tick_due() {
            if self.config.max_ticks_per_frame.is_some_and(|max| ticks >= max) {
                let dropped = self.ctx.time.discard_pending_ticks();
                log::warn!("frame fell behind: dropped {dropped} ticks after running {ticks}");
                break;
            }
            self.scheduler.run_systems(&mut self.ctx, SchedulePriority::Tick)?;
            self.ctx.time.consume_tick();
            ticks += 1;
        }

        self.scheduler.run_systems(&mut self.ctx, SchedulePriority::Update)?;
        self.ctx.events.mark();
        self.scheduler.run_systems(&mut self.ctx, SchedulePriority::PostUpdate)?;
        self.ctx.events.rotate();
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
