// Notification event model and the replay cache

use std::collections::BTreeMap;
use tracing::warn;

use super::request::TargetKind;

/// Opaque identity of the current tethering upstream network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamNetwork(pub String);

/// Best-effort description of one tethered client.
///
/// The platform cannot keep this list completely accurate; clients may
/// still be reported after disconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetherClient {
    pub address: String,
    pub hostname: Option<String>,
}

/// Hardware offload state for tethered traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffloadStatus {
    Stopped,
    Started,
    Failed,
}

impl OffloadStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OffloadStatus::Stopped),
            1 => Some(OffloadStatus::Started),
            2 => Some(OffloadStatus::Failed),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            OffloadStatus::Stopped => 0,
            OffloadStatus::Started => 1,
            OffloadStatus::Failed => 2,
        }
    }
}

/// Raw typed events emitted by the environment's push notification source.
#[derive(Debug, Clone)]
pub enum RawTetherEvent {
    SupportedChanged(bool),
    /// Raw platform type codes; may contain values outside the known
    /// enumeration.
    SupportedTypesChanged(Vec<i32>),
    UpstreamChanged(Option<UpstreamNetwork>),
    InterfacePatternsChanged(Vec<String>),
    TetherableInterfacesChanged(Vec<String>),
    TetheredInterfacesChanged(Vec<String>),
    InterfaceError { iface: String, code: i32 },
    ClientsChanged(Vec<TetherClient>),
    OffloadStatusChanged(OffloadStatus),
}

/// Per-category cache of the last observed notification state.
///
/// Mutated only by adapters on receipt of a real event; the replay path
/// reads it without writing. `None` means the category has never been
/// observed and must not be replayed. Interface-name patterns are
/// deliberately absent: that category is exempt from replay-on-register.
#[derive(Debug, Clone, Default)]
pub struct LastKnownState {
    pub supported: Option<bool>,
    pub supported_types: Option<Vec<TargetKind>>,
    /// `Some(None)` means "observed: no upstream".
    pub upstream: Option<Option<UpstreamNetwork>>,
    pub tetherable: Option<Vec<String>>,
    pub tethered: Option<Vec<String>>,
    pub interface_errors: BTreeMap<String, i32>,
    pub clients: Option<Vec<TetherClient>>,
    pub offload: Option<OffloadStatus>,
}

/// Drop unknown supported-type codes from a raw set.
///
/// Unknown values are recorded as a diagnostic, never surfaced to the
/// subscriber and never a delivery failure.
pub fn filter_supported_types(raw: &[i32]) -> Vec<TargetKind> {
    let mut known = Vec::with_capacity(raw.len());
    let mut unknown = Vec::new();
    for &code in raw {
        match TargetKind::from_type_code(code) {
            Some(target) => known.push(target),
            None => unknown.push(code),
        }
    }
    if !unknown.is_empty() {
        warn!(codes = ?unknown, "unexpected supported tethering types");
    }
    known
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offload_code_round_trip() {
        for status in [
            OffloadStatus::Stopped,
            OffloadStatus::Started,
            OffloadStatus::Failed,
        ] {
            assert_eq!(OffloadStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(OffloadStatus::from_code(7), None);
    }

    #[test]
    fn test_filter_supported_types_drops_unknown() {
        let filtered = filter_supported_types(&[1, 2, 3, 42]);
        assert_eq!(filtered, vec![TargetKind::Usb, TargetKind::Bluetooth]);
    }

    #[test]
    fn test_filter_supported_types_keeps_known_order() {
        let filtered = filter_supported_types(&[5, 0, 1]);
        assert_eq!(
            filtered,
            vec![TargetKind::Ethernet, TargetKind::WifiLegacy, TargetKind::Usb]
        );
    }

    #[test]
    fn test_last_known_state_starts_unobserved() {
        let state = LastKnownState::default();
        assert!(state.supported.is_none());
        assert!(state.upstream.is_none());
        assert!(state.interface_errors.is_empty());
    }
}
