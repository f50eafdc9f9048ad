use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::config::{AppConfig, AppConfigOverrides};
use crate::scripts::ScriptSystem;
use crate::time::Time;
use crate::world::GameWorld;

pub const CONFIG_PATH: &str = "assets/config.json";

pub fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default())
}

/// Builds the world and the script subsystem, then drives the headless tick
/// loop at the configured cadence until the run ends or the configured tick
/// limit, if any, is reached.
pub fn run_with_overrides(overrides: AppConfigOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(CONFIG_PATH);
    config.apply_overrides(&overrides);

    let mut world = GameWorld::new(&config.world);
    let mut scripts = ScriptSystem::new(&config.scripts.dir);
    // Watch before the first scan so edits made during the scan still land.
    scripts.start_watching()?;
    let loaded = scripts.load_all();
    println!("[scripts] {loaded} script(s) loaded from {}", scripts.root().display());

    let frame = Duration::from_secs_f32(1.0 / config.tick_hz.max(1.0));
    let mut time = Time::new();
    loop {
        time.tick();
        world.update(time.delta_seconds());
        scripts.tick(&mut world);
        for message in world.take_messages() {
            println!("[script] {message}");
        }
        if world.is_game_over() {
            println!("[world] caught by an effect after {:.1}s", time.elapsed_seconds());
            break;
        }
        if let Some(max_ticks) = config.max_ticks {
            if time.ticks() >= max_ticks {
                break;
            }
        }
        thread::sleep(frame);
    }
    Ok(())
}
