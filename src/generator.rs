//! UUIDv1 generator and related types.

use rand::{rngs::ThreadRng, RngCore};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::node::{NodeSource, OsNodeSource};
use crate::state::{State, StateConfig};
use crate::{Error, NodeId, Uuid};

/// 100-nanosecond ticks from the Gregorian reform (1582-10-15) to the Unix epoch.
const GREGORIAN_UNIX_OFFSET_TICKS: u64 = 0x01b2_1dd2_1381_4000;

const MAX_SEQUENCE: u16 = (1 << 14) - 1;

const MAX_TICKS: u64 = (1 << 60) - 1;

/// Text encoding of a generated UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Format {
    /// 32 lowercase hexadecimal digits without separators.
    Compact,
    /// The canonical hyphenated 8-4-4-4-12 form.
    #[default]
    Default,
    /// `urn:uuid:` followed by the hyphenated form.
    Urn,
}

impl Format {
    /// Returns the name the encoding is selected by.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Default => "default",
            Self::Urn => "urn",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src {
            "compact" => Ok(Self::Compact),
            "default" => Ok(Self::Default),
            "urn" => Ok(Self::Urn),
            _ => Err(Error::InvalidFormat(src.to_owned())),
        }
    }
}

/// Per-call knobs of [`V1Generator::generate`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Options {
    /// Text encoding of the result.
    pub format: Format,
    /// Explicit instant to encode instead of the current wall-clock time. The emitted tick
    /// count is still kept strictly above anything this generator has already recorded.
    pub timestamp: Option<SystemTime>,
}

/// Represents a UUIDv1 generator that owns a node identifier, a clock sequence, and the last
/// issued timestamp, and guarantees that consecutively generated UUIDs carry strictly
/// increasing (timestamp, sequence) pairs even when the system clock stalls or moves backward.
///
/// State survives process restarts through the [`StateConfig`] handed in at construction: the
/// persisted record is read once when the generator is built and overwritten after every
/// generation. Generators sharing one state file continue each other's sequence across
/// restarts; concurrent writers are last-write-wins only.
///
/// Generation takes `&mut self`, so one instance cannot interleave callers. To share an
/// instance across threads, wrap it in a mutex:
///
/// ```rust
/// use std::{sync, thread};
/// use uuid1::{StateConfig, V1Generator};
///
/// let g = sync::Arc::new(sync::Mutex::new(V1Generator::new(StateConfig::disabled())));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.lock().unwrap().uuid().unwrap(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
#[derive(Clone, Debug)]
pub struct V1Generator<R = ThreadRng> {
    node: NodeId,
    timestamp: u64,
    sequence: u16,
    drift: bool,
    state: StateConfig,

    /// Random number generator seeding fresh clock sequences.
    rng: R,
}

impl V1Generator<ThreadRng> {
    /// Creates a generator resolving its node identifier from the operating system.
    ///
    /// If the configured state file holds a record for the same node identifier, the clock
    /// sequence continues from that record (previous value plus one) and the advanced record is
    /// written straight back, so another instance constructed next continues one further.
    /// A fresh random sequence writes nothing until the first generation.
    pub fn new(state: StateConfig) -> Self {
        Self::with_parts(state, OsNodeSource, rand::thread_rng())
    }
}

impl<R: RngCore> V1Generator<R> {
    /// Creates a generator from explicit parts: the state configuration, the node identifier
    /// source, and the random number generator used to seed clock sequences.
    pub fn with_parts(state: StateConfig, mut nodes: impl NodeSource, mut rng: R) -> Self {
        let node = nodes.resolve();
        let (timestamp, sequence, drift) = match state.load() {
            Some(prev) if prev.node == node.as_u64() => {
                (prev.timestamp, (prev.sequence + 1) & MAX_SEQUENCE, false)
            }
            // first run, or the node identifier changed: decorrelate from any prior sequence
            _ => (0, rng.next_u32() as u16 & MAX_SEQUENCE, true),
        };
        let gen = Self {
            node,
            timestamp,
            sequence,
            drift,
            state,
            rng,
        };
        // claim the continued sequence before another construction can load the same record
        if !gen.drift {
            if let Err(err) = gen.persist() {
                tracing::warn!(%err, "continued sequence not recorded; retrying on generation");
            }
        }
        gen
    }

    /// Generates a new UUIDv1 object at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Fails only when the enabled state file cannot be written.
    pub fn uuid(&mut self) -> Result<Uuid, Error> {
        self.uuid_at_ticks(now_ticks())
    }

    /// Generates a UUID rendered in the requested encoding, at the current time or at the
    /// explicit instant carried by `options`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid1::{Format, Options, StateConfig, V1Generator};
    ///
    /// let mut g = V1Generator::new(StateConfig::disabled());
    /// let text = g.generate(&Options { format: Format::Urn, ..Default::default() })?;
    /// assert!(text.starts_with("urn:uuid:"));
    /// # Ok::<(), uuid1::Error>(())
    /// ```
    pub fn generate(&mut self, options: &Options) -> Result<String, Error> {
        let ticks = match options.timestamp {
            Some(instant) => ticks_at(instant).ok_or(Error::TimestampOutOfRange)?,
            None => now_ticks(),
        };
        Ok(self.uuid_at_ticks(ticks)?.format(options.format))
    }

    /// Generates a new UUIDv1 object from the tick count passed.
    ///
    /// The emitted pair advances past both the in-memory state and anything a sharing process
    /// persisted in the meantime, then the updated record is written back.
    fn uuid_at_ticks(&mut self, ticks: u64) -> Result<Uuid, Error> {
        self.catch_up();
        let (timestamp, sequence) = if ticks > self.timestamp {
            (ticks, self.sequence)
        } else {
            // clock stalled or went backwards: advance past the last issued pair
            (self.timestamp + 1, (self.sequence + 1) & MAX_SEQUENCE)
        };
        if timestamp > MAX_TICKS {
            return Err(Error::TimestampOutOfRange);
        }
        self.timestamp = timestamp;
        self.sequence = sequence;
        let uuid = Uuid::from_fields_v1(self.timestamp, self.sequence, self.node.as_u64());
        self.persist()?;
        Ok(uuid)
    }

    /// Advances the clock sequence by one and returns the new value, exactly as a same-tick
    /// generation would.
    ///
    /// With persistence disabled, consecutive calls return values one apart (mod 2^14), which
    /// makes this usable as a monotonic counter independent of the timestamp.
    pub fn next_sequence(&mut self) -> Result<u16, Error> {
        self.catch_up();
        if self.timestamp >= MAX_TICKS {
            return Err(Error::TimestampOutOfRange);
        }
        self.sequence = (self.sequence + 1) & MAX_SEQUENCE;
        self.timestamp += 1;
        self.persist()?;
        Ok(self.sequence)
    }

    /// Returns the current clock sequence.
    pub const fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Returns the node identifier embedded in this generator's output.
    pub const fn node_id(&self) -> NodeId {
        self.node
    }

    /// Returns true if the clock sequence was freshly randomized when this instance started,
    /// rather than continued from a persisted record.
    pub const fn clock_drifted(&self) -> bool {
        self.drift
    }

    /// Folds a freshly loaded persisted record into the in-memory high-water mark, so a record
    /// advanced by another process sharing the file is never reused.
    fn catch_up(&mut self) {
        let Some(prev) = self.state.load() else {
            return;
        };
        if prev.node != self.node.as_u64() {
            return;
        }
        if prev.timestamp > self.timestamp {
            self.timestamp = prev.timestamp;
            self.sequence = prev.sequence;
        } else if prev.timestamp == self.timestamp && prev.sequence > self.sequence {
            self.sequence = prev.sequence;
        }
    }

    fn persist(&self) -> Result<(), Error> {
        self.state.store(&State {
            node: self.node.as_u64(),
            sequence: self.sequence,
            timestamp: self.timestamp,
        })
    }
}

/// Supports operations as an infinite iterator that produces a new UUIDv1 object for each call
/// of `next()`, ending only if the state file becomes unwritable.
impl<R: RngCore> Iterator for V1Generator<R> {
    type Item = Uuid;

    fn next(&mut self) -> Option<Self::Item> {
        self.uuid().ok()
    }
}

fn now_ticks() -> u64 {
    ticks_at(SystemTime::now()).expect("system clock beyond UUID timestamp range")
}

/// Converts an instant into 100-nanosecond ticks since 1582-10-15. Instants before the
/// Gregorian reform saturate at zero; instants past the 60-bit tick range are `None`.
fn ticks_at(time: SystemTime) -> Option<u64> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d
            .as_secs()
            .checked_mul(10_000_000)?
            .checked_add((d.subsec_nanos() / 100) as u64)?
            .checked_add(GREGORIAN_UNIX_OFFSET_TICKS)
            .filter(|&ticks| ticks <= MAX_TICKS),
        Err(err) => {
            let d = err.duration();
            Some(GREGORIAN_UNIX_OFFSET_TICKS.saturating_sub(
                d.as_secs()
                    .saturating_mul(10_000_000)
                    .saturating_add((d.subsec_nanos() / 100) as u64),
            ))
        }
    }
}
