//! Durable generator state shared across restarts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;

/// High-water mark of sequence and timestamp usage recorded on disk.
///
/// A newly constructed generator sharing the file must never reuse a timestamp/sequence pair at
/// or below this record.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub(crate) struct State {
    /// 48-bit node identifier the record belongs to.
    pub node: u64,
    /// Last issued 14-bit clock sequence.
    pub sequence: u16,
    /// Last issued timestamp, in 100-nanosecond ticks since 1582-10-15.
    pub timestamp: u64,
}

/// Permission bits applied when the state file is first created: owner read/write, group and
/// other read.
pub const DEFAULT_STATE_MODE: u32 = 0o644;

/// Location and permission mode of the persisted state file, or the choice to keep state in
/// memory only.
///
/// The configuration is an explicit value injected into each generator rather than a process
/// global; construct it once and hand clones to every generator that should share the file.
///
/// # Examples
///
/// ```rust
/// use uuid1::{StateConfig, V1Generator};
///
/// let mut g = V1Generator::new(StateConfig::disabled());
/// println!("{}", g.uuid()?);
/// # Ok::<(), uuid1::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct StateConfig {
    storage: Storage,
}

#[derive(Clone, Debug)]
enum Storage {
    Disabled,
    File { path: PathBuf, mode: u32 },
}

impl StateConfig {
    /// Persists state at the platform default location (`uuid1-state.json` under the system
    /// temporary directory) with the default permission mode.
    pub fn default_file() -> Self {
        Self::at(std::env::temp_dir().join("uuid1-state.json"))
    }

    /// Persists state at an explicit location with the default permission mode.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::File {
                path: path.into(),
                mode: DEFAULT_STATE_MODE,
            },
        }
    }

    /// Disables persistence entirely; state lives only inside the generator instance and
    /// monotonicity holds only within it.
    pub fn disabled() -> Self {
        Self {
            storage: Storage::Disabled,
        }
    }

    /// Replaces the permission mode applied when the file is first created. Has no effect on a
    /// file that already exists, and none on a disabled configuration.
    pub fn with_mode(mut self, new_mode: u32) -> Self {
        if let Storage::File { mode, .. } = &mut self.storage {
            *mode = new_mode;
        }
        self
    }

    /// Returns the resolved state file path, or `None` when persistence is disabled.
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Disabled => None,
            Storage::File { path, .. } => Some(path),
        }
    }

    /// Reads the recorded high-water mark. A missing, unreadable, or corrupt file is the
    /// expected first-run state, not an error.
    pub(crate) fn load(&self) -> Option<State> {
        let Storage::File { path, .. } = &self.storage else {
            return None;
        };
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "state file not read; cold start");
                return None;
            }
        };
        match serde_json::from_slice::<State>(&bytes) {
            Ok(state)
                if state.node < 1 << 48 && state.sequence < 1 << 14 && state.timestamp < 1 << 60 =>
            {
                Some(state)
            }
            Ok(_) => {
                tracing::debug!(path = %path.display(), "state record out of range; cold start");
                None
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "state file corrupt; cold start");
                None
            }
        }
    }

    /// Overwrites the recorded high-water mark, creating the file with the configured mode if it
    /// does not exist. The mode is applied at creation only and masked by the process umask.
    pub(crate) fn store(&self, state: &State) -> Result<(), Error> {
        let Storage::File { path, mode } = &self.storage else {
            return Ok(());
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(*mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        let write = |mut file: fs::File| {
            use std::io::Write;
            let body = serde_json::to_vec(state).expect("state record is always serializable");
            file.write_all(&body)
        };
        options
            .open(path)
            .and_then(write)
            .map_err(|source| Error::StateWrite {
                path: path.clone(),
                source,
            })
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self::default_file()
    }
}

#[cfg(test)]
mod tests {
    use super::{State, StateConfig};

    fn sample() -> State {
        State {
            node: 0x0123_4567_89ab,
            sequence: 0x1fff,
            timestamp: 0x01e7_52a1_f3b4_958c,
        }
    }

    /// Reports absence for a missing file
    #[test]
    fn reports_absence_for_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StateConfig::at(dir.path().join("missing.json"));
        assert_eq!(config.load(), None);
    }

    /// Round-trips the record through the file
    #[test]
    fn round_trips_the_record_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StateConfig::at(dir.path().join("state.json"));
        config.store(&sample()).unwrap();
        assert_eq!(config.load(), Some(sample()));

        let updated = State {
            sequence: 7,
            ..sample()
        };
        config.store(&updated).unwrap();
        assert_eq!(config.load(), Some(updated));
    }

    /// Reports absence for a corrupt file
    #[test]
    fn reports_absence_for_a_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();
        assert_eq!(StateConfig::at(&path).load(), None);

        // well-formed JSON whose fields exceed their bit widths
        std::fs::write(
            &path,
            br#"{"node":1,"sequence":2,"timestamp":18446744073709551615}"#,
        )
        .unwrap();
        assert_eq!(StateConfig::at(&path).load(), None);
    }

    /// Applies the configured mode at creation only
    #[cfg(unix)]
    #[test]
    fn applies_the_configured_mode_at_creation_only() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = StateConfig::at(&path).with_mode(0o600);

        config.store(&sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        // later writes leave externally adjusted permissions alone
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        config.store(&sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    /// Propagates a write failure for an unwritable location
    #[test]
    fn propagates_a_write_failure_for_an_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let config = StateConfig::at(dir.path().join("no").join("such").join("dir.json"));
        assert!(config.store(&sample()).is_err());
    }

    /// Disabled persistence neither reads nor writes
    #[test]
    fn disabled_persistence_neither_reads_nor_writes() {
        let config = StateConfig::disabled();
        assert_eq!(config.path(), None);
        assert_eq!(config.load(), None);
        config.store(&sample()).unwrap();
        assert_eq!(config.load(), None);
    }
}
