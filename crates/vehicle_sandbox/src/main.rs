//! Vehicle sandbox
//!
//! Loads settings, spawns the demo airboat on a stone floor, seats a driver
//! and runs a fixed number of ticks, logging what the vehicle does.
//!
//! ```text
//! vehicle_sandbox [--settings FILE] [--definition FILE.ron] [--dump FILE.ron] [--ticks N]
//! ```
//!
//! Set `RUST_LOG=debug` to see attachment and seat changes.

mod demo;

use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use vehicle_core::foundation::logging::{self, error, info, warn};
use vehicle_core::foundation::math::utils::quat_from_euler_deg;
use vehicle_core::prelude::*;
use vehicle_core::world::{Block, SimpleActor};

const DEFAULT_SETTINGS: &str = "crates/vehicle_sandbox/assets/settings.toml";
const DEFAULT_TICKS: u32 = 200;

/// Speed the body is pushed along +Z, in blocks per tick
const CRUISE_SPEED: f64 = 0.4;

/// Degrees of heading change per tick once the turn starts
const TURN_RATE: f64 = 0.5;

/// Headless vehicle sandbox
#[derive(Parser, Debug)]
#[command(version, about = "Drive a vehicle over a stone floor and log what it does")]
struct Options {
    /// Settings file, `.toml` or `.ron`
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SETTINGS)]
    settings: String,

    /// Object definition to spawn instead of the demo airboat
    #[arg(long, value_name = "FILE.ron")]
    definition: Option<PathBuf>,

    /// Write the spawned definition out as RON
    #[arg(long, value_name = "FILE.ron")]
    dump: Option<PathBuf>,

    /// Ticks to simulate
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TICKS)]
    ticks: u32,
}

fn load_settings(path: &str) -> SimSettings {
    match SimSettings::load_validated(path) {
        Ok(settings) => {
            info!("Loaded settings from {path}");
            settings
        }
        Err(e) => {
            warn!("Falling back to default settings: {e}");
            SimSettings::default()
        }
    }
}

fn load_definition(options: &Options) -> Result<ObjectDefinition, Box<dyn Error>> {
    let definition = match &options.definition {
        Some(path) => ObjectDefinition::from_ron_str(&std::fs::read_to_string(path)?)?,
        None => demo::airboat(),
    };
    if let Some(path) = &options.dump {
        let text = ron::ser::to_string_pretty(&definition, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        info!("Wrote definition {} to {}", definition.name, path.display());
    }
    Ok(definition)
}

fn log_status(tick: u32, vehicle: &Vehicle) {
    let pose = &vehicle.object().pose;
    let grounded = (0..vehicle.parts().len()).filter(|i| vehicle.is_grounded(*i)).count();
    let thrust = vehicle.forces().force;
    info!(
        "tick {tick:>4}: pos ({:.2}, {:.2}, {:.2}) yaw {:.1} grounded {grounded} thrust {:.1} rpm {:.0}",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.yaw(),
        thrust.norm(),
        vehicle.engine(0).map_or(0.0, |engine| engine.rpm()),
    );
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(&options.settings);
    let definition = Arc::new(load_definition(options)?);

    let mut world = SimpleWorld::new();
    world.fill_floor(-1, 64, &Block::solid("stone", 1.5));
    let driver = world.spawn_actor(SimpleActor::new(Vec3::new(-1.5, 0.0, 0.5)));
    let passenger = world.spawn_actor(SimpleActor::new(Vec3::new(1.5, 0.0, -1.0)));

    let registry: HashSet<InstrumentId> = HashSet::new();
    let mut events = EventQueue::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let mut vehicle = Vehicle::load(
        ObjectId::new(1),
        Arc::clone(&definition),
        Side::Authority,
        &MemoryBlob::new(),
        world.actor_mut(driver),
        &registry,
        settings,
    )?
    .with_pose(Vec3::zeros(), Quat::identity());
    info!("Spawned {} with {} parts", definition.name, vehicle.parts().len());

    let seat = vehicle
        .parts()
        .iter()
        .position(|part| part.as_seat().is_some())
        .ok_or("definition has no seat")?;
    if let Some(actor) = world.actor_mut(driver) {
        info!("Driver: {:?}", vehicle.interact_seat(seat, actor, &mut events));
    }
    if let (Some(actor), Some(point)) = (world.actor_mut(passenger), definition.attachment_points.first()) {
        vehicle.object_mut().mount(actor, Some(*point), &mut events);
    }
    if let Some(engine) = vehicle.engine_mut(0) {
        engine.start();
    }
    vehicle.controls.throttle = 0.8;

    let mut position = Vec3::zeros();
    let mut yaw = 0.0;
    for tick in 1..=options.ticks {
        if tick > options.ticks / 2 {
            yaw += TURN_RATE;
        }
        let orientation = quat_from_euler_deg(0.0, yaw, 0.0);
        position += orientation * Vec3::new(0.0, 0.0, CRUISE_SPEED);
        vehicle.tick(position, orientation, &mut world, &mut rng, &mut events);

        if tick % 20 == 0 {
            log_status(tick, &vehicle);
        }
    }

    if let Some(actor) = world.actor_mut(driver) {
        vehicle.dismount_seat(actor, &mut events);
    }
    let mut blob = MemoryBlob::new();
    vehicle.save(&mut blob);
    info!(
        "Finished: {} sync events, saved state {} bytes",
        events.len(),
        blob.to_ron()?.len()
    );
    Ok(())
}

fn main() {
    logging::init();

    let options = Options::parse();
    if let Err(e) = run(&options) {
        error!("Sandbox failed: {e}");
        std::process::exit(1);
    }
}
