//! Headless orbits: fixed-timestep simulation without a window.
//!
//! A sun with three planets, each planet with a moon. Orbits advance in the
//! Tick phase at 50 Hz; Update prints positions twice per simulated second;
//! the app stops itself after five simulated seconds.
//!
//! Run with: `RUST_LOG=info cargo run -p ulfr --example headless`

use ulfr::prelude::*;

// ── Components ───────────────────────────────────────────────────────────

struct Orbit {
    radius: f32,
    speed: f32,
    angle: f32,
}

struct Planet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new("headless orbits")
        .with_tick_hz(50.0)
        .with_frame_delta(1.0 / 30.0)
        .with_max_ticks_per_frame(8);

    let mut app = App::with_config(config)?;
    app.add_system(SchedulePriority::Init, setup)?
        .add_system(SchedulePriority::Tick, advance_orbits)?
        .add_systems(SchedulePriority::Update, (report, stop_after_five_seconds))?
        .add_system(SchedulePriority::Last, summary)?;
    app.run()?;
    Ok(())
}

fn setup(ctx: &mut Context) {
    let entities = ctx.entities_mut();
    let sun = entities.create_entity().with(Name::new("sun")).id();

    for (i, radius) in [4.0, 7.0, 11.0].into_iter().enumerate() {
        let planet = entities
            .create_entity()
            .with(Name::new(&format!("planet-{i}")))
            .with(Orbit { radius, speed: 1.0 / radius, angle: 0.0 })
            .with(Planet)
            .id();
        entities.add_child(sun, planet);

        let moon = entities
            .create_entity()
            .with(Name::new(&format!("moon-{i}")))
            .with(Orbit { radius: 0.5, speed: 3.0, angle: 0.0 })
            .id();
        entities.add_child(planet, moon);
    }

    let count = ctx.entities().len();
    ctx.logger().info(&format!("spawned {count} bodies"));
}

fn advance_orbits(ctx: &mut Context) {
    let dt = ctx.time.tick_rate() as f32;
    let entities = ctx.entities_mut();

    entities.for_each::<(&mut Orbit, &mut Transform)>(|_, (orbit, transform)| {
        orbit.angle += orbit.speed * dt;
        transform.position = Vec3::new(orbit.angle.cos(), 0.0, orbit.angle.sin()) * orbit.radius;
    });

    // Moons orbit their planet: offset by the parent's position.
    for moon in entities.entities_with::<(Orbit,)>() {
        let Some(parent) = entities.parent(moon) else { continue };
        if !entities.has_component::<Planet>(parent) {
            continue;
        }
        let Some(parent_pos) = entities.get_component::<Transform>(parent).map(|t| t.position)
        else {
            continue;
        };
        if let Some(transform) = entities.get_component_mut::<Transform>(moon) {
            transform.translate(parent_pos);
        }
    }
}

fn report(ctx: &mut Context) {
    if ctx.time.frame_count() % 15 != 0 {
        return;
    }
    let entities = ctx.entities();
    for planet in entities.entities_with::<(Planet,)>() {
        let (Some(name), Some(transform)) = (
            entities.get_component::<Name>(planet),
            entities.get_component::<Transform>(planet),
        ) else {
            continue;
        };
        ctx.logger().info(&format!(
            "t={:.2}s {name}: ({:.2}, {:.2}) moons={}",
            ctx.time.elapsed_secs(),
            transform.position.x,
            transform.position.z,
            entities.children(planet).len()
        ));
    }
}

fn stop_after_five_seconds(ctx: &mut Context) {
    if ctx.time.elapsed_secs() >= 5.0 {
        ctx.stop();
    }
}

fn summary(ctx: &mut Context) {
    ctx.logger().info(&format!(
        "simulated {} ticks over {} frames ({:.2}s)",
        ctx.time.tick_count(),
        ctx.time.frame_count(),
        ctx.time.elapsed_secs()
    ));
}
