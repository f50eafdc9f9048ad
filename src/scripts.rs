use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use glam::Vec2;
use rand::Rng;
use rhai::Engine;

use crate::world::GameWorld;

pub mod catalog;
pub mod compile;
pub mod exec;
pub mod instance;
pub mod registry;
pub mod watch;

pub use catalog::{normalize_path, ScriptSource, SourceCatalog, SCRIPT_SUFFIX};
pub use compile::{CompiledModule, Diagnostic, ScriptCompiler, Severity};
pub use exec::ExecutionCoordinator;
pub use instance::{activate, load_script, LoadError, ScriptInstance, INIT_FN, UPDATE_FN};
pub use registry::{ScriptRegistry, ScriptSlot};
pub use watch::ScriptWatcher;

/// The view of the host a script can reach. Everything observable or mutable
/// from script code goes through the functions registered in [`register_api`];
/// host state not reachable from here does not exist as far as scripts are
/// concerned.
#[derive(Clone, Copy)]
pub struct ScriptApi {
    world: *mut GameWorld,
}

unsafe impl Send for ScriptApi {}
unsafe impl Sync for ScriptApi {}

impl ScriptApi {
    /// Valid for the duration of one `update` call; the instance rebuilds it
    /// on every invocation.
    pub(crate) fn new(world: &mut GameWorld) -> Self {
        Self { world }
    }

    fn player_x(&mut self) -> rhai::FLOAT {
        let world = unsafe { &*self.world };
        world.player_position().x as rhai::FLOAT
    }

    fn player_y(&mut self) -> rhai::FLOAT {
        let world = unsafe { &*self.world };
        world.player_position().y as rhai::FLOAT
    }

    fn hard_mode(&mut self) -> bool {
        let world = unsafe { &*self.world };
        world.hard_mode()
    }

    fn spawn_effect(&mut self, x: rhai::FLOAT, y: rhai::FLOAT) {
        let world = unsafe { &mut *self.world };
        world.spawn_effect(Vec2::new(x as f32, y as f32));
    }

    fn log(&mut self, message: &str) {
        let world = unsafe { &mut *self.world };
        world.push_message(message);
    }

    fn random_range(&mut self, min: rhai::FLOAT, max: rhai::FLOAT) -> rhai::FLOAT {
        if max <= min {
            return min;
        }
        let mut rng = rand::thread_rng();
        rng.gen_range(min..max)
    }
}

pub(crate) fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptApi>("Host");
    engine.register_fn("player_x", ScriptApi::player_x);
    engine.register_fn("player_y", ScriptApi::player_y);
    engine.register_fn("hard_mode", ScriptApi::hard_mode);
    engine.register_fn("spawn_effect", ScriptApi::spawn_effect);
    engine.register_fn("log", ScriptApi::log);
    engine.register_fn("rand", ScriptApi::random_range);
}

/// Composition root for the script subsystem: discovery, compilation,
/// registration, hot reload and per-tick execution behind one handle. Owned
/// by the host's startup path; the watcher thread and the tick loop only ever
/// share the registry.
pub struct ScriptSystem {
    catalog: SourceCatalog,
    compiler: Arc<ScriptCompiler>,
    registry: ScriptRegistry,
    coordinator: ExecutionCoordinator,
    watcher: Option<ScriptWatcher>,
}

impl ScriptSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let catalog = SourceCatalog::new(root);
        let compiler = Arc::new(ScriptCompiler::new());
        let registry = ScriptRegistry::new();
        let coordinator = ExecutionCoordinator::new(registry.clone());
        Self { catalog, compiler, registry, coordinator, watcher: None }
    }

    pub fn root(&self) -> &Path {
        self.catalog.root()
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Compiles and registers everything currently in the script directory.
    /// Failures are logged per path and skipped; returns how many loaded.
    pub fn load_all(&self) -> usize {
        let mut loaded = 0;
        for source in self.catalog.discover() {
            match load_script(&self.compiler, &source) {
                Ok(instance) => {
                    println!("[scripts] loaded {}", source.path.display());
                    self.registry.upsert(source.path, instance);
                    loaded += 1;
                }
                Err(err) => report_load_failure(&source.path, &err),
            }
        }
        loaded
    }

    /// Starts hot reload. A missing directory disables watching with a log
    /// line (a host without scripts is not an error); any other failure to
    /// construct the watcher propagates to the startup path.
    pub fn start_watching(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }
        if !self.catalog.root().is_dir() {
            eprintln!("[scripts] {} not found; hot reload disabled", self.catalog.root().display());
            return Ok(());
        }
        let watcher =
            ScriptWatcher::spawn(self.catalog.clone(), self.compiler.clone(), self.registry.clone())?;
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Brings one path's registration in line with the file on disk: present
    /// and loadable means (re)registered, present but broken keeps the
    /// previous instance, absent means removed. The watcher runs exactly
    /// this; it is public so hosts can force a resync without waiting for a
    /// filesystem event.
    pub fn sync_path(&self, path: &Path) {
        sync_script(&self.catalog, &self.compiler, &self.registry, path);
    }

    /// Runs every registered script once against the host world.
    pub fn tick(&self, world: &mut GameWorld) {
        self.coordinator.tick(world);
    }
}

pub(crate) fn sync_script(
    catalog: &SourceCatalog,
    compiler: &ScriptCompiler,
    registry: &ScriptRegistry,
    path: &Path,
) {
    let path = normalize_path(path);
    if !SourceCatalog::matches(&path) {
        return;
    }
    if path.is_file() {
        let source = match catalog.read(&path) {
            Ok(source) => source,
            Err(err) => {
                // A transient read failure must not take down a script that
                // is already running.
                eprintln!("[scripts] {}: {err:#}", path.display());
                return;
            }
        };
        match load_script(compiler, &source) {
            Ok(instance) => {
                let verb = if registry.contains(&path) { "reloaded" } else { "loaded" };
                registry.upsert(source.path, instance);
                println!("[scripts] {verb} {}", path.display());
            }
            Err(err) => report_load_failure(&path, &err),
        }
    } else if registry.remove(&path) {
        println!("[scripts] removed {}", path.display());
    }
}

fn report_load_failure(path: &Path, err: &LoadError) {
    match err {
        LoadError::Compile(diagnostics) => {
            for diagnostic in diagnostics {
                eprintln!("[scripts] {}: {diagnostic}", path.display());
            }
        }
        other => eprintln!("[scripts] {}: {other}", path.display()),
    }
}
