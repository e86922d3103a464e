//! # acwarden-rules
//!
//! Pure decision logic for the acwarden anti-cheat moderation backend.
//!
//! Nothing in this crate performs I/O or reads the clock. Every function takes
//! its inputs explicitly (fingerprint, policy, timestamps) and returns a value,
//! so identical inputs always produce identical verdicts.
//!
//! ## Modules
//!
//! - [`policy`]: the typed runtime policy, its key schema and value coercion
//! - [`fingerprint`]: the device fingerprint wire schema and its resolved profile
//! - [`device`]: the device classifier and its ordered rule table
//! - [`network`] / [`behavior`]: VPN and player-behavior predicates
//! - [`duration`]: human-readable ban durations
//! - [`webhook`]: Discord-compatible notification payloads
//!
//! ## Quick Start
//!
//! ```rust
//! use acwarden_rules::{classify, DeviceFingerprint, Policy};
//!
//! let fingerprint = DeviceFingerprint {
//!     device_model: Some("Quest2".into()),
//!     platform: Some("Android".into()),
//!     device_type: Some("VR".into()),
//!     ..Default::default()
//! };
//! let verdict = classify(&fingerprint, "A1B2C3D4E5F6A7B8C", &Policy::default());
//! assert!(verdict.allowed);
//! assert_eq!(verdict.reason, "Allowed device");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod behavior;
pub mod detection;
pub mod device;
pub mod duration;
pub mod error;
pub mod fingerprint;
pub mod lenient;
pub mod network;
pub mod policy;
pub mod webhook;

pub use self::behavior::{check_player_behavior, PlayerData};
pub use self::detection::{Detection, Subject};
pub use self::device::{classify, classify_device_type, DeviceType, DeviceVerdict, UNKNOWN_PLAYER};
pub use self::duration::format_duration;
pub use self::error::PolicyError;
pub use self::fingerprint::{DeviceFingerprint, DeviceProfile};
pub use self::lenient::truthy;
pub use self::network::{check_vpn, LocationInfo, NetworkData};
pub use self::policy::{Policy, PolicyKey, PolicySummary, PolicyValue, ValueKind};
pub use self::webhook::{Embed, EmbedField, WebhookPayload};
