//! The process-wide router cell and subsystem wiring point.
//!
//! The C surface has no way to pass trait objects across, so the
//! embedding Rust application registers a subsystem factory once at
//! startup; `lattica_init` then builds the router from it. Everything
//! behind the FFI goes through the single runtime cell.

use std::sync::{Mutex, OnceLock};

use lattica_router::{Router, Subsystems};

type SubsystemFactory = Box<dyn Fn() -> Subsystems + Send + Sync>;

static FACTORY: OnceLock<SubsystemFactory> = OnceLock::new();
static RUNTIME: Mutex<Option<Router>> = Mutex::new(None);

/// Register the factory that wires the external subsystem
/// implementations. Must be called from Rust before any foreign caller
/// reaches `lattica_init`. Returns `false` if a factory was already
/// registered.
pub fn register_subsystems<F>(factory: F) -> bool
where
    F: Fn() -> Subsystems + Send + Sync + 'static,
{
    FACTORY.set(Box::new(factory)).is_ok()
}

/// Build a fresh subsystem set, if a factory is registered.
pub(crate) fn build_subsystems() -> Option<Subsystems> {
    FACTORY.get().map(|factory| factory())
}

/// Install the initialized router. Fails if one is already installed.
pub(crate) fn install(router: Router) -> bool {
    let Ok(mut guard) = RUNTIME.lock() else {
        return false;
    };
    if guard.is_some() {
        return false;
    }
    *guard = Some(router);
    true
}

/// Run a closure against the installed router, if any.
pub(crate) fn with<T>(f: impl FnOnce(&Router) -> T) -> Option<T> {
    let guard = RUNTIME.lock().ok()?;
    guard.as_ref().map(f)
}

/// Run a closure against the installed router, mutably.
pub(crate) fn with_mut<T>(f: impl FnOnce(&mut Router) -> T) -> Option<T> {
    let mut guard = RUNTIME.lock().ok()?;
    guard.as_mut().map(f)
}

/// Drop the installed router so a test can re-run `lattica_init`.
#[cfg(test)]
pub(crate) fn clear() {
    if let Ok(mut guard) = RUNTIME.lock() {
        *guard = None;
    }
}
