//! An implementation of RFC 4122 time-based (version 1) UUIDs whose output is monotonically
//! increasing within a process and across process restarts, without a central coordinator.
//!
//! ```rust
//! use uuid1::{StateConfig, V1Generator};
//!
//! let mut g = V1Generator::new(StateConfig::disabled());
//! let uuid = g.uuid()?;
//! println!("{}", uuid); // e.g. "8c283b58-5f72-11ee-a49c-325096b39f47"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//! # Ok::<(), uuid1::Error>(())
//! ```
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_high       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             node                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - `time_low`, `time_mid`, and `time_high` together hold a 60-bit timestamp counted in
//!   100-nanosecond ticks since 1582-10-15.
//! - The 4-bit `ver` field is set at `0001`.
//! - The 14-bit `clock_seq` field disambiguates identifiers generated within the same tick or
//!   after the system clock moves backward. It is seeded randomly, continued across restarts
//!   through an optional state file, and incremented whenever the timestamp cannot advance.
//! - The 2-bit `var` field is set at `10`.
//! - The 48-bit `node` field carries the hardware address of a network interface, or a random
//!   value with its multicast bit set when no hardware address is available.
//!
//! Whenever the wall clock reads at or before the last issued timestamp (a same-tick burst or a
//! clock adjustment), the generator increments the clock sequence and bumps the timestamp one
//! tick past the last issued one, so the emitted (timestamp, sequence) pairs strictly increase
//! regardless of what the clock does.
//!
//! # Persisted state
//!
//! A generator built with [`StateConfig::at`] or [`StateConfig::default_file`] records its node
//! identifier, clock sequence, and last timestamp in a small file after every generation, and a
//! generator constructed later over the same file continues the sequence instead of reusing it.
//! Processes writing the file concurrently are last-write-wins; the file is a restart
//! continuity mechanism, not a lock. [`StateConfig::disabled`] keeps all state in memory.

mod id;
pub use id::{ParseError, Uuid};

mod error;
pub use error::Error;

pub mod node;
pub use node::{NodeId, NodeSource, OsNodeSource};

mod state;
pub use state::{StateConfig, DEFAULT_STATE_MODE};

pub mod generator;
pub use generator::{Format, Options, V1Generator};

mod entry;
pub use entry::{configure, generate, reset, uuid1};

use std::sync::OnceLock;

/// Checks whether a string is a syntactically valid UUID in any of the three supported
/// encodings (compact, hyphenated, or URN), case-insensitively.
///
/// # Examples
///
/// ```rust
/// assert!(uuid1::validate("f3b4958c-52a1-11e7-802a-010203040506"));
/// assert!(uuid1::validate("urn:uuid:F3B4958C-52A1-11E7-802A-010203040506"));
/// assert!(!uuid1::validate(""));
/// ```
pub fn validate(candidate: &str) -> bool {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        regex::Regex::new(
            r"(?i)^(?:[0-9a-f]{32}|(?:urn:uuid:)?[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$",
        )
        .expect("validation pattern is well formed")
    });
    re.is_match(candidate)
}
