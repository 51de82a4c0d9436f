//! Convenience re-exports: `use ulfr::prelude::*` for the common items.

pub use crate::app::{App, AppState, Plugin};
pub use crate::config::AppConfig;
pub use crate::context::Context;
pub use crate::ecs::{ComponentSet, Entity, EntityList, EntityMut, EntityRef, Name, Relationship};
pub use crate::error::{BoxedError, ConfigError, EngineError};
pub use crate::event::Events;
pub use crate::logger::{ConsoleLogger, Level, Logger, MemoryLogger, MultiLogger, SinkId};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::scene::Scene;
pub use crate::schedule::{SchedulePriority, Scheduler, System};
pub use crate::time::Time;
#[cfg(feature = "diagnostics")]
pub use crate::schedule::SystemTiming;
