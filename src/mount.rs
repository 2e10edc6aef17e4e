use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag for one mounted component instance.
///
/// A component checks [`Mount::is_alive`] after every await; once torn down,
/// late results are dropped instead of being applied. Clones share the flag,
/// so a handle given to the owner can tear down a component that is still
/// awaiting.
#[derive(Debug, Clone)]
pub struct Mount {
    alive: Arc<AtomicBool>,
}

impl Mount {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}
