//! Process-global generator and entry point functions.

use rand::rngs::OsRng;
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::generator::{Options, V1Generator};
use crate::node::OsNodeSource;
use crate::state::StateConfig;
use crate::{Error, Uuid};

/// Returns the lock handle of the process-wide global generator slot.
fn lock_global_gen() -> MutexGuard<'static, Option<V1Generator<OsRng>>> {
    static G: OnceLock<Mutex<Option<V1Generator<OsRng>>>> = OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("uuid1: could not lock global generator")
}

fn with_global_gen<T>(f: impl FnOnce(&mut V1Generator<OsRng>) -> T) -> T {
    let mut slot = lock_global_gen();
    let g = slot.get_or_insert_with(|| {
        V1Generator::with_parts(StateConfig::default_file(), OsNodeSource, OsRng)
    });
    f(g)
}

/// Replaces the global generator with one built from the given state configuration.
///
/// Expected to run before the first generation; calling it later discards the in-memory state
/// of the previous global generator (its persisted record, if any, remains on disk).
pub fn configure(state: StateConfig) {
    *lock_global_gen() = Some(V1Generator::with_parts(state, OsNodeSource, OsRng));
}

/// Drops the global generator so the next use constructs a fresh one from the default state
/// configuration. Intended for test isolation.
pub fn reset() {
    *lock_global_gen() = None;
}

/// Generates a UUIDv1 object using the process-wide global generator.
///
/// The global generator persists its state at the default location until [`configure`] says
/// otherwise, and guarantees process-wide monotonic (timestamp, sequence) pairs.
///
/// # Examples
///
/// ```rust
/// uuid1::configure(uuid1::StateConfig::disabled());
/// let uuid = uuid1::uuid1()?;
/// println!("{}", uuid); // e.g., "8c283b58-5f72-11ee-a49c-325096b39f47"
/// # Ok::<(), uuid1::Error>(())
/// ```
pub fn uuid1() -> Result<Uuid, Error> {
    with_global_gen(|g| g.uuid())
}

/// Generates a UUIDv1 string in the requested encoding using the process-wide global generator.
///
/// # Examples
///
/// ```rust
/// use uuid1::{Format, Options};
///
/// uuid1::configure(uuid1::StateConfig::disabled());
/// let text = uuid1::generate(&Options { format: Format::Compact, ..Default::default() })?;
/// assert_eq!(text.len(), 32);
/// # Ok::<(), uuid1::Error>(())
/// ```
pub fn generate(options: &Options) -> Result<String, Error> {
    with_global_gen(|g| g.generate(options))
}
