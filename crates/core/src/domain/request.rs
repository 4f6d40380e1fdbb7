// Operation descriptors for start/stop tethering requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two state-changing operations the engine can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Start,
    Stop,
}

/// Connection-sharing interface kind.
///
/// `type_code` values follow the platform's tethering type constants;
/// Wi-Fi only exists as a legacy target in this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    WifiLegacy,
    Usb,
    Bluetooth,
    Ethernet,
}

impl TargetKind {
    /// Platform type code for this target.
    pub fn type_code(self) -> i32 {
        match self {
            TargetKind::WifiLegacy => 0,
            TargetKind::Usb => 1,
            TargetKind::Bluetooth => 2,
            TargetKind::Ethernet => 5,
        }
    }

    /// Map a raw platform type code back to a known target.
    ///
    /// Returns `None` for codes outside the supported enumeration; callers
    /// decide whether unknown codes are dropped or diagnosed.
    pub fn from_type_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TargetKind::WifiLegacy),
            1 => Some(TargetKind::Usb),
            2 => Some(TargetKind::Bluetooth),
            5 => Some(TargetKind::Ethernet),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetKind::WifiLegacy => "wifi-legacy",
            TargetKind::Usb => "usb",
            TargetKind::Bluetooth => "bluetooth",
            TargetKind::Ethernet => "ethernet",
        };
        f.write_str(name)
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wifi-legacy" | "wifi" => Ok(TargetKind::WifiLegacy),
            "usb" => Ok(TargetKind::Usb),
            "bluetooth" | "bt" => Ok(TargetKind::Bluetooth),
            "ethernet" | "eth" => Ok(TargetKind::Ethernet),
            other => Err(format!("unknown tethering target: {other}")),
        }
    }
}

/// Named flags attached to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Show the carrier provisioning UI if the platform has one.
    pub show_ui: bool,
    /// Ask the platform to bypass the carrier entitlement check.
    ///
    /// The engine overrides this per escalation tier; the flag here is the
    /// caller's initial preference.
    pub exempt_entitlement: bool,
}

/// Immutable description of one start/stop request.
///
/// Built once by the caller; the engine never mutates it after the first
/// attempt begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    pub target: TargetKind,
    pub options: RequestOptions,
}

impl OperationDescriptor {
    pub fn start(target: TargetKind) -> Self {
        Self {
            kind: OperationKind::Start,
            target,
            options: RequestOptions::default(),
        }
    }

    pub fn stop(target: TargetKind) -> Self {
        Self {
            kind: OperationKind::Stop,
            target,
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn show_ui(mut self, show_ui: bool) -> Self {
        self.options.show_ui = show_ui;
        self
    }
}
