//! Context: the value passed to every system.
//!
//! [`Context`] bundles the active [`Scene`], frame timing, the event queues
//! and the logger. Every system receives `&mut Context`, giving it access to
//! everything it needs, but not to the scheduler that is running it.

use crate::config::AppConfig;
use crate::ecs::EntityList;
use crate::event::Events;
use crate::logger::{ConsoleLogger, MultiLogger};
use crate::scene::Scene;
use crate::time::Time;

/// Shared state for all systems.
///
/// # Example
///
/// ```ignore
/// fn setup(ctx: &mut Context) {
///     ctx.entities_mut().create_entity().with(Name::new("camera"));
/// }
///
/// fn update(ctx: &mut Context) {
///     let dt = ctx.time.delta_secs();
///     if !ctx.read_events::<WindowClosed>().is_empty() {
///         ctx.stop();
///     }
/// }
/// ```
pub struct Context {
    /// Frame timing and the fixed-tick accumulator.
    pub time: Time,
    /// Event queues, cleared after PostUpdate each iteration.
    pub events: Events,
    scene: Scene,
    logger: MultiLogger,
    running: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default().with_console_logging(false))
    }

    /// Build a context using the config's name, tick rate and logging flag.
    ///
    /// # Panics
    ///
    /// If `config.tick_rate` is not positive. Call
    /// [`AppConfig::validate`] first for untrusted input.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut logger = MultiLogger::new();
        if config.console_logging {
            logger.add_sink(ConsoleLogger);
        }
        Self {
            time: Time::with_tick_rate(config.tick_rate),
            events: Events::new(),
            scene: Scene::new(config.name.clone()),
            logger,
            running: false,
        }
    }

    // ── Scene ────────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Entities of the active scene.
    pub fn entities(&self) -> &EntityList {
        self.scene.entities()
    }

    pub fn entities_mut(&mut self) -> &mut EntityList {
        self.scene.entities_mut()
    }

    /// Make `scene` the active scene and return the previous one.
    pub fn replace_scene(&mut self, scene: Scene) -> Scene {
        log::debug!("switching scene '{}' -> '{}'", self.scene.name(), scene.name());
        std::mem::replace(&mut self.scene, scene)
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn send_event<E: 'static + Send + Sync>(&mut self, event: E) {
        self.events.send(event);
    }

    /// Every `E` sent so far this iteration, oldest first. Reading does not
    /// consume.
    pub fn read_events<E: 'static + Send + Sync>(&self) -> &[E] {
        self.events.read::<E>()
    }

    // ── Logging ──────────────────────────────────────────────────────

    /// Logger that fans out to every registered sink.
    pub fn logger(&self) -> &MultiLogger {
        &self.logger
    }

    /// Mutable access for adding or removing sinks.
    pub fn logger_mut(&mut self) -> &mut MultiLogger {
        &mut self.logger
    }

    // ── Loop control ─────────────────────────────────────────────────

    /// Ask the driver to leave its loop. The current iteration finishes
    /// first.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// `true` while the driver loop is active and no stop was requested.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
