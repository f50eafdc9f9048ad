use super::registry::ScriptRegistry;
use crate::world::GameWorld;

/// Drives every registered instance once per host tick.
pub struct ExecutionCoordinator {
    registry: ScriptRegistry,
}

impl ExecutionCoordinator {
    pub fn new(registry: ScriptRegistry) -> Self {
        Self { registry }
    }

    /// Invokes each instance in the current snapshot, in path order. A fault
    /// in one script is logged with its path and does not disturb the rest of
    /// the tick; the instance stays registered and is retried next tick.
    /// Scripts registered after the snapshot was taken run from the next tick
    /// onward.
    pub fn tick(&self, world: &mut GameWorld) {
        for (path, slot) in self.registry.snapshot() {
            let mut instance = slot.lock();
            if let Err(err) = instance.execute(world) {
                eprintln!("[scripts] {}: update failed: {err}", path.display());
            }
        }
    }
}
