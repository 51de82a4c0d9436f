//! # Ulfr: Real-Time Engine Core
//!
//! An entity-component store, a phase-ordered scheduler and a fixed-timestep
//! loop. Rendering, windowing and asset loading plug in as ordinary systems.
//!
//! Start with `use ulfr::prelude::*`, build an [`App`], register systems per
//! [`SchedulePriority`] and call [`App::run`].

pub mod app;
pub mod config;
pub mod context;
pub mod ecs;
pub mod error;
pub mod event;
pub mod logger;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod schedule;
pub mod time;

pub use app::{App, AppState, Plugin};
pub use config::AppConfig;
pub use context::Context;
pub use error::{ConfigError, EngineError};
pub use schedule::{SchedulePriority, Scheduler, System};
