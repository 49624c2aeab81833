//! Node identifier resolution.

use rand::RngCore;
use std::sync::OnceLock;

/// The 48-bit node identifier embedded in every generated UUID.
///
/// Usually the hardware address of a network interface; when none is available, a random value
/// with the multicast marker bit set, so it can never collide with a real hardware address.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    /// Marker bit distinguishing randomized node identifiers from hardware addresses.
    pub const MULTICAST_BIT: u64 = 1 << 47;

    /// Creates a node identifier from a hardware address.
    pub const fn from_mac(bytes: [u8; 6]) -> Self {
        Self(
            (bytes[0] as u64) << 40
                | (bytes[1] as u64) << 32
                | (bytes[2] as u64) << 24
                | (bytes[3] as u64) << 16
                | (bytes[4] as u64) << 8
                | bytes[5] as u64,
        )
    }

    /// Creates a randomized node identifier with the multicast marker bit set.
    pub fn random(rng: &mut impl RngCore) -> Self {
        Self(rng.next_u64() & ((1 << 48) - 1) | Self::MULTICAST_BIT)
    }

    /// Returns the identifier as the low 48 bits of a `u64`.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true if this identifier was randomized rather than read from hardware.
    pub const fn is_multicast(self) -> bool {
        self.0 & Self::MULTICAST_BIT != 0
    }
}

impl From<NodeId> for u64 {
    fn from(src: NodeId) -> Self {
        src.0
    }
}

/// Source of the node identifier a generator embeds in its output.
///
/// Generators take the source at construction, so tests can substitute a fixed address without
/// touching the operating system.
pub trait NodeSource {
    /// Returns the node identifier to use for the lifetime of the owning generator.
    fn resolve(&mut self) -> NodeId;
}

/// Resolves the node identifier from the operating system, once per process.
///
/// All generators in one process observe the same identifier. When no hardware address can be
/// read (no interface, permission denied, unsupported platform), a randomized identifier is
/// used instead; this is not an error.
#[derive(Copy, Clone, Debug, Default)]
pub struct OsNodeSource;

impl NodeSource for OsNodeSource {
    fn resolve(&mut self) -> NodeId {
        static RESOLVED: OnceLock<NodeId> = OnceLock::new();
        *RESOLVED.get_or_init(|| match mac_address::get_mac_address() {
            Ok(Some(addr)) => NodeId::from_mac(addr.bytes()),
            _ => {
                let node = NodeId::random(&mut rand::thread_rng());
                tracing::debug!(
                    node = node.as_u64(),
                    "no hardware address available; using randomized node identifier"
                );
                node
            }
        })
    }
}

impl<T: NodeSource + ?Sized> NodeSource for &mut T {
    fn resolve(&mut self) -> NodeId {
        (**self).resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeId, NodeSource, OsNodeSource};

    /// Fits in 48 bits and carries the multicast bit when randomized
    #[test]
    fn fits_in_48_bits_and_carries_the_multicast_bit_when_randomized() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let node = NodeId::random(&mut rng);
            assert!(node.as_u64() < 1 << 48);
            assert!(node.is_multicast());
        }
    }

    /// Round-trips hardware address bytes
    #[test]
    fn round_trips_hardware_address_bytes() {
        let node = NodeId::from_mac([0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
        assert_eq!(node.as_u64(), 0x0123_4567_89ab);
        assert_eq!(NodeId::from_mac([0; 6]).as_u64(), 0);
    }

    /// Resolves the same identifier on every call within a process
    #[test]
    fn resolves_the_same_identifier_on_every_call_within_a_process() {
        let first = OsNodeSource.resolve();
        let second = OsNodeSource.resolve();
        assert_eq!(first, second);
        assert!(first.as_u64() < 1 << 48);
    }
}
