//! VPN and proxy predicate.

use crate::detection::Detection;
use crate::lenient;
use serde::Deserialize;

const FALLBACK_REASON: &str = "VPN/Proxy detected";

/// Client-reported network flags (`args.networkData`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkData {
    /// Connection goes through a VPN.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_vpn: bool,
    /// Connection goes through a proxy.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_proxy: bool,
}

/// Platform-reported location flags (`context.playStreamEvent.LocationInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocationInfo {
    /// Location lookup flagged the address as a VPN exit.
    #[serde(default, rename = "isVpn", deserialize_with = "lenient::flag")]
    pub is_vpn: bool,
}

/// Check network and location flags for VPN or proxy usage.
pub fn check_vpn(network: &NetworkData, location: &LocationInfo) -> Detection {
    let reasons = [
        (network.is_vpn, "VPN detected via network data"),
        (network.is_proxy, "Proxy detected"),
        (location.is_vpn, "VPN detected via location data"),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, reason)| reason.to_string())
    .collect();

    Detection::from_reasons(reasons, FALLBACK_REASON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean() {
        let detection = check_vpn(&NetworkData::default(), &LocationInfo::default());
        assert!(!detection.detected);
        assert!(detection.reasons.is_empty());
        assert_eq!(detection.reason, "");
    }

    #[test]
    fn test_all_signals_in_order() {
        let network = NetworkData {
            is_vpn: true,
            is_proxy: true,
        };
        let location = LocationInfo { is_vpn: true };
        let detection = check_vpn(&network, &location);
        assert!(detection.detected);
        assert_eq!(
            detection.reason,
            "VPN detected via network data; Proxy detected; VPN detected via location data"
        );
    }

    #[test]
    fn test_truthy_flags() {
        let network: NetworkData =
            serde_json::from_value(json!({"isVpn": 0, "isProxy": "yes"})).unwrap();
        assert!(!network.is_vpn);
        assert!(network.is_proxy);
        assert_eq!(check_vpn(&network, &LocationInfo::default()).reason, "Proxy detected");
    }
}
