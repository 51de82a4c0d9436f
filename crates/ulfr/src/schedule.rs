//! # Scheduler: Ordered Phases of Systems
//!
//! A system is a function that takes `&mut Context` and does something with
//! it: query entities, send events, stop the app. Systems are grouped into
//! phases ([`SchedulePriority`]); phases run in enum order and systems within
//! a phase run in the order they were added. No dedup, no parallelism.
//!
//! ```text
//! init():        PreInit ─► Init ─► PostInit              (once)
//! per iteration: PreUpdate ─► Tick × n ─► Update ─► PostUpdate
//! after loop:    Last                                      (once, by App)
//! ```
//!
//! Systems may be infallible (`FnMut(&mut Context)`) or fallible
//! (`FnMut(&mut Context) -> Result<(), E>`). The first error aborts the rest
//! of the phase and comes back as [`EngineError::System`]. Panics are not
//! caught.
//!
//! Systems never see the [`Scheduler`], so registration from inside a running
//! system is impossible.

use std::marker::PhantomData;

use crate::context::Context;
use crate::error::{BoxedError, EngineError};

/// Execution phase of a system. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchedulePriority {
    PreInit,
    Init,
    PostInit,
    PreUpdate,
    /// Fixed-rate phase, run zero or more times per iteration.
    Tick,
    Update,
    PostUpdate,
    /// Runs once after the loop exits.
    Last,
}

impl SchedulePriority {
    pub const ALL: [SchedulePriority; 8] = [
        SchedulePriority::PreInit,
        SchedulePriority::Init,
        SchedulePriority::PostInit,
        SchedulePriority::PreUpdate,
        SchedulePriority::Tick,
        SchedulePriority::Update,
        SchedulePriority::PostUpdate,
        SchedulePriority::Last,
    ];

    /// The phases run by [`Scheduler::init`].
    pub const INIT: [SchedulePriority; 3] = [
        SchedulePriority::PreInit,
        SchedulePriority::Init,
        SchedulePriority::PostInit,
    ];

    /// `true` for PreInit, Init and PostInit.
    pub const fn is_run_once(self) -> bool {
        matches!(
            self,
            SchedulePriority::PreInit | SchedulePriority::Init | SchedulePriority::PostInit
        )
    }

    const fn index(self) -> usize {
        self as usize
    }
}

// ── System ───────────────────────────────────────────────────────────────

/// Something the scheduler can run.
///
/// Usually built from a function via [`IntoSystem`]; implement it directly
/// for systems that carry their own state.
pub trait System {
    fn run(&mut self, ctx: &mut Context) -> Result<(), BoxedError>;
}

/// Conversion into a boxed [`System`].
///
/// `Marker` only exists to keep the infallible and fallible function impls
/// apart; callers never name it.
pub trait IntoSystem<Marker> {
    fn into_system(self) -> Box<dyn System>;
}

#[doc(hidden)]
pub struct SystemMarker;
#[doc(hidden)]
pub struct InfallibleMarker;
#[doc(hidden)]
pub struct FallibleMarker<E>(PhantomData<fn() -> E>);

struct InfallibleFn<F>(F);

impl<F: FnMut(&mut Context)> System for InfallibleFn<F> {
    fn run(&mut self, ctx: &mut Context) -> Result<(), BoxedError> {
        (self.0)(ctx);
        Ok(())
    }
}

struct FallibleFn<F, E>(F, PhantomData<fn() -> E>);

impl<F, E> System for FallibleFn<F, E>
where
    F: FnMut(&mut Context) -> Result<(), E>,
    E: Into<BoxedError>,
{
    fn run(&mut self, ctx: &mut Context) -> Result<(), BoxedError> {
        (self.0)(ctx).map_err(Into::into)
    }
}

impl<F> IntoSystem<InfallibleMarker> for F
where
    F: FnMut(&mut Context) + 'static,
{
    fn into_system(self) -> Box<dyn System> {
        Box::new(InfallibleFn(self))
    }
}

impl<F, E> IntoSystem<FallibleMarker<E>> for F
where
    F: FnMut(&mut Context) -> Result<(), E> + 'static,
    E: Into<BoxedError> + 'static,
{
    fn into_system(self) -> Box<dyn System> {
        Box::new(FallibleFn(self, PhantomData))
    }
}

impl IntoSystem<SystemMarker> for Box<dyn System> {
    fn into_system(self) -> Box<dyn System> {
        self
    }
}

/// A system plus the short name used in errors and timings.
#[doc(hidden)]
pub struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

impl NamedSystem {
    fn new<S: IntoSystem<M>, M>(system: S) -> Self {
        Self {
            name: short_system_name(std::any::type_name::<S>()),
            system: system.into_system(),
        }
    }
}

/// One system or a tuple of up to eight, for
/// [`Scheduler::add_systems`].
pub trait IntoSystems<Marker> {
    #[doc(hidden)]
    fn push_into(self, out: &mut Vec<NamedSystem>);
}

#[doc(hidden)]
pub struct Single;
#[doc(hidden)]
pub struct Many;

impl<S: IntoSystem<M>, M> IntoSystems<(Single, M)> for S {
    fn push_into(self, out: &mut Vec<NamedSystem>) {
        out.push(NamedSystem::new(self));
    }
}

macro_rules! impl_into_systems_tuple {
    ($(($S:ident, $M:ident)),+) => {
        impl<$($S: IntoSystem<$M>, $M),+> IntoSystems<(Many, $($M,)+)> for ($($S,)+) {
            #[allow(non_snake_case)]
            fn push_into(self, out: &mut Vec<NamedSystem>) {
                let ($($S,)+) = self;
                $(out.push(NamedSystem::new($S));)+
            }
        }
    };
}

impl_into_systems_tuple!((S0, M0));
impl_into_systems_tuple!((S0, M0), (S1, M1));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2), (S3, M3));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2), (S3, M3), (S4, M4));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2), (S3, M3), (S4, M4), (S5, M5));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2), (S3, M3), (S4, M4), (S5, M5), (S6, M6));
impl_into_systems_tuple!((S0, M0), (S1, M1), (S2, M2), (S3, M3), (S4, M4), (S5, M5), (S6, M6), (S7, M7));

/// Per-system timing recorded during the most recent run of a phase.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

// ── Scheduler ────────────────────────────────────────────────────────────

/// Systems grouped by phase.
pub struct Scheduler {
    phases: [Vec<NamedSystem>; 8],
    initialized: bool,
    #[cfg(feature = "diagnostics")]
    timings: [Vec<SystemTiming>; 8],
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            phases: std::array::from_fn(|_| Vec::new()),
            initialized: false,
            #[cfg(feature = "diagnostics")]
            timings: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Append `system` to `phase`.
    ///
    /// # Errors
    ///
    /// [`EngineError::LateRegistration`] if `phase` is a run-once phase and
    /// [`init`](Self::init) has already run.
    pub fn add_system<M>(
        &mut self,
        phase: SchedulePriority,
        system: impl IntoSystem<M>,
    ) -> Result<&mut Self, EngineError> {
        self.check_registration(phase)?;
        self.phases[phase.index()].push(NamedSystem::new(system));
        Ok(self)
    }

    /// Append several systems to `phase`, keeping tuple order.
    ///
    /// ```ignore
    /// scheduler.add_systems(SchedulePriority::Update, (read_input, movement, camera_follow))?;
    /// ```
    pub fn add_systems<M>(
        &mut self,
        phase: SchedulePriority,
        systems: impl IntoSystems<M>,
    ) -> Result<&mut Self, EngineError> {
        self.check_registration(phase)?;
        systems.push_into(&mut self.phases[phase.index()]);
        Ok(self)
    }

    fn check_registration(&self, phase: SchedulePriority) -> Result<(), EngineError> {
        if self.initialized && phase.is_run_once() {
            return Err(EngineError::LateRegistration { phase });
        }
        Ok(())
    }

    /// Run PreInit, Init and PostInit, each system once.
    ///
    /// Meant to be called once; a second call runs everything again and logs
    /// a warning.
    pub fn init(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        if self.initialized {
            log::warn!("Scheduler::init called again; init phases will run a second time");
        }
        self.initialized = true;
        log::debug!(
            "running init phases ({} systems)",
            SchedulePriority::INIT.iter().map(|&p| self.len(p)).sum::<usize>()
        );
        for phase in SchedulePriority::INIT {
            self.run_phase(phase, ctx)?;
        }
        Ok(())
    }

    /// Run every system of `phase` in registration order.
    ///
    /// # Errors
    ///
    /// [`EngineError::RunOncePhase`] for the init phases, or
    /// [`EngineError::System`] from the first failing system.
    pub fn run_systems(
        &mut self,
        ctx: &mut Context,
        phase: SchedulePriority,
    ) -> Result<(), EngineError> {
        if phase.is_run_once() {
            return Err(EngineError::RunOncePhase { phase });
        }
        self.run_phase(phase, ctx)
    }

    fn run_phase(&mut self, phase: SchedulePriority, ctx: &mut Context) -> Result<(), EngineError> {
        let systems = &mut self.phases[phase.index()];
        #[cfg(feature = "diagnostics")]
        let timings = &mut self.timings[phase.index()];
        #[cfg(feature = "diagnostics")]
        timings.clear();

        for named in systems.iter_mut() {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            let result = named.system.run(ctx);

            #[cfg(feature = "diagnostics")]
            timings.push(SystemTiming {
                name: named.name.clone(),
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });

            if let Err(source) = result {
                return Err(EngineError::System {
                    phase,
                    system: named.name.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Number of systems registered for `phase`.
    pub fn len(&self, phase: SchedulePriority) -> usize {
        self.phases[phase.index()].len()
    }

    /// `true` if no phase has any system.
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Short names of the systems in `phase`, in execution order.
    pub fn system_names(&self, phase: SchedulePriority) -> Vec<&str> {
        self.phases[phase.index()]
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Timings from the most recent run of `phase`.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self, phase: SchedulePriority) -> &[SystemTiming] {
        &self.timings[phase.index()]
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path and generics from a type name
/// (`game::movement` → `movement`, `{{closure}}` → `<closure>`).
fn short_system_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<&'static str>>>;

    fn record(trace: &Trace, label: &'static str) -> impl FnMut(&mut Context) + 'static {
        let trace = Rc::clone(trace);
        move |_ctx: &mut Context| trace.borrow_mut().push(label)
    }

    fn noop(_ctx: &mut Context) {}

    #[test]
    fn init_runs_pre_init_init_post_init_in_order() {
        let trace = Trace::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_system(SchedulePriority::PostInit, record(&trace, "post"))
            .unwrap()
            .add_system(SchedulePriority::Init, record(&trace, "init"))
            .unwrap()
            .add_system(SchedulePriority::PreInit, record(&trace, "pre"))
            .unwrap()
            .add_system(SchedulePriority::Update, record(&trace, "update"))
            .unwrap();

        let mut ctx = Context::new();
        scheduler.init(&mut ctx).unwrap();
        assert_eq!(*trace.borrow(), vec!["pre", "init", "post"]);
        assert!(scheduler.is_initialized());
    }

    #[test]
    fn registration_order_is_execution_order() {
        let trace = Trace::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_systems(
                SchedulePriority::Update,
                (record(&trace, "a"), record(&trace, "b"), record(&trace, "c")),
            )
            .unwrap();
        scheduler
            .add_system(SchedulePriority::Update, record(&trace, "a"))
            .unwrap();

        let mut ctx = Context::new();
        scheduler.run_systems(&mut ctx, SchedulePriority::Update).unwrap();
        assert_eq!(*trace.borrow(), vec!["a", "b", "c", "a"]);
        assert_eq!(scheduler.len(SchedulePriority::Update), 4);
    }

    #[test]
    fn repeated_runs_execute_every_system_each_time() {
        let trace = Trace::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_systems(SchedulePriority::Tick, (record(&trace, "x"), record(&trace, "y")))
            .unwrap();

        let mut ctx = Context::new();
        for _ in 0..3 {
            scheduler.run_systems(&mut ctx, SchedulePriority::Tick).unwrap();
        }
        assert_eq!(*trace.borrow(), vec!["x", "y", "x", "y", "x", "y"]);
        assert_eq!(scheduler.len(SchedulePriority::Tick), 2);
    }

    #[test]
    fn empty_phase_is_a_no_op() {
        let mut scheduler = Scheduler::new();
        let mut ctx = Context::new();
        assert!(scheduler.is_empty());
        assert!(scheduler.run_systems(&mut ctx, SchedulePriority::Tick).is_ok());
    }

    #[test]
    fn late_registration_into_init_phases_is_rejected() {
        let mut scheduler = Scheduler::new();
        let mut ctx = Context::new();
        scheduler.init(&mut ctx).unwrap();

        for phase in SchedulePriority::INIT {
            let err = scheduler.add_system(phase, noop).err();
            assert!(matches!(err, Some(EngineError::LateRegistration { phase: p }) if p == phase));
        }
        assert!(scheduler.add_system(SchedulePriority::Update, noop).is_ok());
        assert!(scheduler.add_systems(SchedulePriority::Last, (noop, noop)).is_ok());
    }

    #[test]
    fn run_systems_rejects_run_once_phases() {
        let mut scheduler = Scheduler::new();
        let mut ctx = Context::new();
        let err = scheduler.run_systems(&mut ctx, SchedulePriority::Init).unwrap_err();
        assert!(matches!(err, EngineError::RunOncePhase { phase: SchedulePriority::Init }));
    }

    #[test]
    fn second_init_runs_again() {
        let trace = Trace::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_system(SchedulePriority::Init, record(&trace, "init"))
            .unwrap();
        let mut ctx = Context::new();
        scheduler.init(&mut ctx).unwrap();
        scheduler.init(&mut ctx).unwrap();
        assert_eq!(trace.borrow().len(), 2);
    }

    #[test]
    fn failing_system_aborts_rest_of_phase() {
        let trace = Trace::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .add_system(SchedulePriority::Update, record(&trace, "before"))
            .unwrap()
            .add_system(SchedulePriority::Update, |_ctx: &mut Context| -> Result<(), String> {
                Err("boom".to_string())
            })
            .unwrap()
            .add_system(SchedulePriority::Update, record(&trace, "after"))
            .unwrap();

        let mut ctx = Context::new();
        let err = scheduler
            .run_systems(&mut ctx, SchedulePriority::Update)
            .unwrap_err();
        match err {
            EngineError::System { phase, system, source } => {
                assert_eq!(phase, SchedulePriority::Update);
                assert_eq!(system, "<closure>");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*trace.borrow(), vec!["before"]);
    }

    #[test]
    fn systems_mutate_shared_context_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler
            .add_systems(
                SchedulePriority::Update,
                (
                    |ctx: &mut Context| {
                        ctx.entities_mut().create_entity();
                    },
                    |ctx: &mut Context| {
                        let count = ctx.entities().len();
                        ctx.send_event(count);
                    },
                ),
            )
            .unwrap();

        let mut ctx = Context::new();
        scheduler.run_systems(&mut ctx, SchedulePriority::Update).unwrap();
        assert_eq!(ctx.read_events::<usize>(), &[1]);
    }

    #[test]
    fn custom_system_impl() {
        struct Counter(u32);
        impl System for Counter {
            fn run(&mut self, ctx: &mut Context) -> Result<(), BoxedError> {
                self.0 += 1;
                ctx.send_event(self.0);
                Ok(())
            }
        }

        let mut scheduler = Scheduler::new();
        let boxed: Box<dyn System> = Box::new(Counter(0));
        scheduler.add_system(SchedulePriority::Tick, boxed).unwrap();

        let mut ctx = Context::new();
        scheduler.run_systems(&mut ctx, SchedulePriority::Tick).unwrap();
        scheduler.run_systems(&mut ctx, SchedulePriority::Tick).unwrap();
        assert_eq!(ctx.read_events::<u32>(), &[1, 2]);
    }

    #[test]
    fn captures_function_names() {
        let mut scheduler = Scheduler::new();
        scheduler
            .add_systems(SchedulePriority::Update, (noop, |_: &mut Context| {}))
            .unwrap();
        assert_eq!(
            scheduler.system_names(SchedulePriority::Update),
            vec!["noop", "<closure>"]
        );
    }

    #[test]
    fn short_names() {
        assert_eq!(short_system_name("game::systems::movement"), "movement");
        assert_eq!(short_system_name("game::main::{{closure}}"), "<closure>");
        assert_eq!(short_system_name("game::Spawner<alloc::string::String>"), "Spawner");
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn timings_cover_last_run() {
        let mut scheduler = Scheduler::new();
        scheduler
            .add_systems(SchedulePriority::PostUpdate, (noop, noop))
            .unwrap();
        let mut ctx = Context::new();
        scheduler.run_systems(&mut ctx, SchedulePriority::PostUpdate).unwrap();
        scheduler.run_systems(&mut ctx, SchedulePriority::PostUpdate).unwrap();

        let timings = scheduler.timings(SchedulePriority::PostUpdate);
        assert_eq!(timings.len(), 2);
        assert!(timings.iter().all(|t| t.name == "noop" && t.duration_us >= 0.0));
    }
}
