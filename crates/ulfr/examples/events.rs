//! Events: a fake window that asks the app to close.
//!
//! The "window" plugin polls for input in PostUpdate and turns it into
//! events. Game systems read those events in Update of the next iteration.
//! After the close request the app finishes its iteration, runs Last and
//! exits.
//!
//! Run with: `RUST_LOG=info cargo run -p ulfr --example events`

use ulfr::prelude::*;

// ── Events ───────────────────────────────────────────────────────────────

struct KeyPressed(char);

struct WindowClose;

// ── Window plugin ────────────────────────────────────────────────────────

/// Stands in for a real window: emits scripted input frame by frame.
struct FakeWindowPlugin {
    script: &'static str,
}

impl Plugin for FakeWindowPlugin {
    fn build(&self, app: &mut App) -> Result<(), EngineError> {
        let mut keys = self.script.chars();
        app.add_system(SchedulePriority::Init, |ctx: &mut Context| {
            ctx.logger().info("window opened");
        })?
        .add_system(SchedulePriority::PostUpdate, move |ctx: &mut Context| {
            match keys.next() {
                Some(key) => ctx.send_event(KeyPressed(key)),
                None => ctx.send_event(WindowClose),
            }
        })?
        .add_system(SchedulePriority::Last, |ctx: &mut Context| {
            ctx.logger().info("window closed");
        })?;
        Ok(())
    }
}

// ── Game systems ─────────────────────────────────────────────────────────

struct Typed(String);

fn setup(ctx: &mut Context) {
    ctx.entities_mut()
        .create_entity()
        .with(Name::new("console"))
        .with(Typed(String::new()));
}

fn type_keys(ctx: &mut Context) {
    let keys: String = ctx.read_events::<KeyPressed>().iter().map(|k| k.0).collect();
    if keys.is_empty() {
        return;
    }
    let Some(console) = ctx.entities().find_by_name("console") else { return };
    if let Some(typed) = ctx.entities_mut().get_component_mut::<Typed>(console) {
        typed.0.push_str(&keys);
    }
}

fn handle_close(ctx: &mut Context) -> Result<(), String> {
    if ctx.read_events::<WindowClose>().is_empty() {
        return Ok(());
    }
    let console = ctx
        .entities()
        .find_by_name("console")
        .ok_or_else(|| "console entity missing".to_string())?;
    let text = ctx
        .entities()
        .get_component::<Typed>(console)
        .map(|t| t.0.clone())
        .unwrap_or_default();
    ctx.logger().info(&format!("close requested; typed {text:?}"));
    ctx.stop();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let memory = MemoryLogger::new();
    let mut app = App::with_config(AppConfig::new("events demo").with_frame_delta(1.0 / 60.0))?;
    app.context_mut().logger_mut().add_sink(memory.clone());

    app.add_plugin(FakeWindowPlugin { script: "hello" })?
        .add_system(SchedulePriority::Init, setup)?
        .add_systems(SchedulePriority::Update, (type_keys, handle_close))?;
    app.run()?;

    println!("captured {} log lines:", memory.entries().len());
    for (level, message) in memory.entries() {
        println!("  [{level}] {message}");
    }
    Ok(())
}
