//! Error types for the scheduler, the driver and configuration loading.

use thiserror::Error;

use crate::schedule::SchedulePriority;

/// Boxed error returned by a fallible system.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while registering or running systems.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A system was added to PreInit, Init or PostInit after those phases ran.
    #[error("cannot register into {phase:?}: initialization has already run")]
    LateRegistration { phase: SchedulePriority },

    /// `run_systems` was called for a phase that only runs during `init`.
    #[error("{phase:?} runs once during init and cannot be run directly")]
    RunOncePhase { phase: SchedulePriority },

    /// A system returned an error. The rest of its phase was skipped.
    #[error("system `{system}` failed during {phase:?}: {source}")]
    System {
        phase: SchedulePriority,
        system: String,
        #[source]
        source: BoxedError,
    },

    /// `App::run` was called on an app that already started.
    #[error("application has already been started")]
    AlreadyStarted,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors returned while loading or validating an
/// [`AppConfig`](crate::config::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tick rate must be between 1e-6 and Duration::MAX seconds, got {0}")]
    InvalidTickRate(f64),

    #[error("frame delta must be positive and below Duration::MAX seconds, got {0}")]
    InvalidFrameDelta(f64),

    #[error("max_ticks_per_frame must be at least 1")]
    InvalidMaxTicks,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn system_error_keeps_source() {
        let err = EngineError::System {
            phase: SchedulePriority::Update,
            system: "movement".into(),
            source: "out of fuel".into(),
        };
        assert_eq!(
            err.to_string(),
            "system `movement` failed during Update: out of fuel"
        );
        assert_eq!(err.source().map(|s| s.to_string()), Some("out of fuel".into()));
    }

    #[test]
    fn config_error_converts() {
        let err: EngineError = ConfigError::InvalidTickRate(0.0).into();
        assert!(matches!(err, EngineError::Config(ConfigError::InvalidTickRate(_))));
    }
}
