// Platform tether error codes and the symbolic-name lookup utility

/// Tethering succeeded, or no error recorded for the interface.
pub const TETHER_ERROR_NO_ERROR: i32 = 0;
pub const TETHER_ERROR_UNKNOWN_IFACE: i32 = 1;
/// The tethering service itself is missing.
pub const TETHER_ERROR_SERVICE_UNAVAIL: i32 = 2;
pub const TETHER_ERROR_UNSUPPORTED: i32 = 3;
pub const TETHER_ERROR_UNAVAIL_IFACE: i32 = 4;
pub const TETHER_ERROR_INTERNAL_ERROR: i32 = 5;
pub const TETHER_ERROR_TETHER_IFACE_ERROR: i32 = 6;
pub const TETHER_ERROR_UNTETHER_IFACE_ERROR: i32 = 7;
pub const TETHER_ERROR_ENABLE_FORWARDING_ERROR: i32 = 8;
pub const TETHER_ERROR_DISABLE_FORWARDING_ERROR: i32 = 9;
pub const TETHER_ERROR_IFACE_CFG_ERROR: i32 = 10;
pub const TETHER_ERROR_PROVISIONING_FAILED: i32 = 11;
pub const TETHER_ERROR_DHCPSERVER_ERROR: i32 = 12;
pub const TETHER_ERROR_ENTITLEMENT_UNKNOWN: i32 = 13;
/// Caller may tether but may not bypass the entitlement check.
pub const TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION: i32 = 14;
pub const TETHER_ERROR_NO_ACCESS_TETHERING_PERMISSION: i32 = 15;

const PREFIX: &str = "TETHER_ERROR_";

const NAMES: &[(&str, i32)] = &[
    ("TETHER_ERROR_NO_ERROR", TETHER_ERROR_NO_ERROR),
    ("TETHER_ERROR_UNKNOWN_IFACE", TETHER_ERROR_UNKNOWN_IFACE),
    ("TETHER_ERROR_SERVICE_UNAVAIL", TETHER_ERROR_SERVICE_UNAVAIL),
    ("TETHER_ERROR_UNSUPPORTED", TETHER_ERROR_UNSUPPORTED),
    ("TETHER_ERROR_UNAVAIL_IFACE", TETHER_ERROR_UNAVAIL_IFACE),
    ("TETHER_ERROR_INTERNAL_ERROR", TETHER_ERROR_INTERNAL_ERROR),
    ("TETHER_ERROR_TETHER_IFACE_ERROR", TETHER_ERROR_TETHER_IFACE_ERROR),
    (
        "TETHER_ERROR_UNTETHER_IFACE_ERROR",
        TETHER_ERROR_UNTETHER_IFACE_ERROR,
    ),
    (
        "TETHER_ERROR_ENABLE_FORWARDING_ERROR",
        TETHER_ERROR_ENABLE_FORWARDING_ERROR,
    ),
    (
        "TETHER_ERROR_DISABLE_FORWARDING_ERROR",
        TETHER_ERROR_DISABLE_FORWARDING_ERROR,
    ),
    ("TETHER_ERROR_IFACE_CFG_ERROR", TETHER_ERROR_IFACE_CFG_ERROR),
    (
        "TETHER_ERROR_PROVISIONING_FAILED",
        TETHER_ERROR_PROVISIONING_FAILED,
    ),
    ("TETHER_ERROR_DHCPSERVER_ERROR", TETHER_ERROR_DHCPSERVER_ERROR),
    (
        "TETHER_ERROR_ENTITLEMENT_UNKNOWN",
        TETHER_ERROR_ENTITLEMENT_UNKNOWN,
    ),
    (
        "TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION",
        TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION,
    ),
    (
        "TETHER_ERROR_NO_ACCESS_TETHERING_PERMISSION",
        TETHER_ERROR_NO_ACCESS_TETHERING_PERMISSION,
    ),
];

/// Symbolic name for a platform error code, if it is a known one.
pub fn name_of(code: i32) -> Option<&'static str> {
    NAMES.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}

/// Integer value for a symbolic name.
///
/// Accepts the name with or without the `TETHER_ERROR_` prefix.
pub fn code_of(name: &str) -> Option<i32> {
    let full;
    let lookup = if name.starts_with(PREFIX) {
        name
    } else {
        full = format!("{PREFIX}{name}");
        &full
    };
    NAMES.iter().find(|(n, _)| *n == lookup).map(|(_, c)| *c)
}

/// Human-readable rendering for diagnostics.
///
/// Falls back to the raw number for codes this build does not know about.
pub fn describe(code: i32) -> String {
    match name_of(code) {
        Some(name) => name.to_string(),
        None => format!("TETHER_ERROR_{code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_of_known() {
        assert_eq!(name_of(0), Some("TETHER_ERROR_NO_ERROR"));
        assert_eq!(
            name_of(14),
            Some("TETHER_ERROR_NO_CHANGE_TETHERING_PERMISSION")
        );
    }

    #[test]
    fn test_name_of_unknown() {
        assert_eq!(name_of(99), None);
        assert_eq!(describe(99), "TETHER_ERROR_99");
    }

    #[test]
    fn test_code_of_with_and_without_prefix() {
        assert_eq!(code_of("TETHER_ERROR_UNSUPPORTED"), Some(3));
        assert_eq!(code_of("UNSUPPORTED"), Some(3));
        assert_eq!(code_of("NOT_A_CODE"), None);
    }

    #[test]
    fn test_describe_known() {
        assert_eq!(describe(11), "TETHER_ERROR_PROVISIONING_FAILED");
    }
}
