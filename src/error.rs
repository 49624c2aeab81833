use std::{io, path::PathBuf};

/// Errors reported by UUID generation.
///
/// An unreadable or missing state file is not represented here; it is the expected first-run
/// condition and generation proceeds as a cold start. Only an unwritable state file and an
/// unrecognized format name surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An encoding name that is none of `compact`, `default`, or `urn`.
    #[error("invalid UUID format {0}")]
    InvalidFormat(String),

    /// An explicit instant beyond the 60-bit tick range of a version 1 UUID.
    #[error("timestamp not representable in a version 1 UUID")]
    TimestampOutOfRange,

    /// The state file could not be created or overwritten. Not retried; a permission or
    /// missing-directory problem needs operator intervention.
    #[error("could not write UUID state file {}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
