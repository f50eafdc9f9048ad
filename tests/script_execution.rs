use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use emberwood::config::WorldConfig;
use emberwood::scripts::{
    load_script, normalize_path, ExecutionCoordinator, ScriptCompiler, ScriptRegistry,
    ScriptSource, ScriptSystem,
};
use emberwood::world::GameWorld;
use tempfile::tempdir;

const REPORTER: &str =
    "fn init() { this.n = 0; }\nfn update(host) { this.n += 1; host.log(`n=${this.n}`); }\n";

fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write script");
    path
}

#[test]
fn five_ticks_report_five() {
    let dir = tempdir().expect("tempdir");
    write_script(dir.path(), "counter.rhai", REPORTER);

    let system = ScriptSystem::new(dir.path());
    assert_eq!(system.load_all(), 1);

    let mut world = GameWorld::new(&WorldConfig::default());
    for _ in 0..5 {
        system.tick(&mut world);
    }
    let messages = world.take_messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages.last().map(String::as_str), Some("n=5"));
}

#[test]
fn a_faulting_script_does_not_stop_the_others() {
    let dir = tempdir().expect("tempdir");
    let faulty = write_script(
        dir.path(),
        "faulty.rhai",
        "fn init() {}\nfn update(host) { host.log(\"faulty-attempt\"); no_such_fn(); }\n",
    );
    write_script(dir.path(), "steady.rhai", REPORTER);

    let system = ScriptSystem::new(dir.path());
    assert_eq!(system.load_all(), 2);

    let mut world = GameWorld::new(&WorldConfig::default());
    system.tick(&mut world);
    let first = world.take_messages();
    assert!(first.contains(&"n=1".to_string()), "steady script ran on the faulty tick: {first:?}");
    assert!(first.contains(&"faulty-attempt".to_string()));
    assert!(system.registry().contains(&normalize_path(&faulty)), "faulting script stays registered");

    // Retried on the next tick, still without taking anyone else down.
    system.tick(&mut world);
    let second = world.take_messages();
    assert!(second.contains(&"n=2".to_string()), "{second:?}");
    assert!(second.contains(&"faulty-attempt".to_string()));
}

#[test]
fn scripts_see_the_host_through_the_facade() {
    let dir = tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "observer.rhai",
        r#"
            fn init() {}
            fn update(host) {
                if host.hard_mode() {
                    host.spawn_effect(host.player_x(), host.player_y());
                } else {
                    host.log("calm");
                }
            }
        "#,
    );

    let system = ScriptSystem::new(dir.path());
    assert_eq!(system.load_all(), 1);

    let mut hard = GameWorld::new(&WorldConfig { hard_mode: true, ..WorldConfig::default() });
    system.tick(&mut hard);
    assert_eq!(hard.effects().len(), 1);
    assert_eq!(hard.effects()[0].position, hard.player_position());
    assert!(hard.take_messages().is_empty());

    let mut calm = GameWorld::new(&WorldConfig::default());
    system.tick(&mut calm);
    assert!(calm.effects().is_empty());
    assert_eq!(calm.take_messages(), vec!["calm".to_string()]);
}

#[test]
fn effects_requested_out_of_bounds_land_inside() {
    let dir = tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "wild.rhai",
        "fn init() {}\nfn update(host) { host.spawn_effect(1.0e9, -500.0); }\n",
    );

    let system = ScriptSystem::new(dir.path());
    assert_eq!(system.load_all(), 1);

    let mut world = GameWorld::new(&WorldConfig::default());
    system.tick(&mut world);
    let effect = world.effects()[0];
    assert!(effect.position.x <= world.bounds().x);
    assert_eq!(effect.position.y, 0.0);
}

#[test]
fn init_runs_once_and_update_every_tick() {
    let dir = tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "once.rhai",
        "fn init() { this.inits = 1; }\nfn update(host) { host.log(`inits=${this.inits}`); }\n",
    );

    let system = ScriptSystem::new(dir.path());
    assert_eq!(system.load_all(), 1);

    let mut world = GameWorld::new(&WorldConfig::default());
    for _ in 0..3 {
        system.tick(&mut world);
    }
    assert_eq!(world.take_messages(), vec!["inits=1".to_string(); 3]);
}

#[test]
fn ticks_tolerate_concurrent_registry_replacement() {
    let compiler = ScriptCompiler::new();
    let registry = ScriptRegistry::new();
    let path = PathBuf::from("churn.rhai");
    let source = ScriptSource { path: path.clone(), text: REPORTER.to_string() };
    registry.upsert(path.clone(), load_script(&compiler, &source).expect("load"));

    let coordinator = ExecutionCoordinator::new(registry.clone());
    let mut world = GameWorld::new(&WorldConfig::default());

    let writer_registry = registry.clone();
    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..50 {
                let instance = load_script(&compiler, &source).expect("load");
                writer_registry.upsert(path.clone(), instance);
            }
        });
        for _ in 0..50 {
            coordinator.tick(&mut world);
        }
    });

    assert_eq!(registry.len(), 1, "replacement never duplicates an entry");
    // Whatever interleaving happened, every tick ran some whole instance.
    assert_eq!(world.take_messages().len(), 50);
}
