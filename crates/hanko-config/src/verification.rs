use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const DEFAULT_REQUIRED_HEADERS: &[&str] = &["(request-target)", "host", "date"];
pub const DEFAULT_ACCEPTED_KEY_TYPES: &[&str] = &[
    "CryptographicKey",
    "RsaVerificationKey2018",
    "Ed25519VerificationKey2018",
];

/// 5 minutes
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: u64 = 5 * 60;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    /// Components every credential has to cover
    pub required_headers: Vec<SmolStr>,

    /// Key types the key document validator accepts
    pub accepted_key_types: Vec<SmolStr>,

    /// Maximum distance between the `Date`/`(created)` values and the local clock
    pub max_clock_skew_secs: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            required_headers: DEFAULT_REQUIRED_HEADERS
                .iter()
                .copied()
                .map(SmolStr::new_static)
                .collect(),
            accepted_key_types: DEFAULT_ACCEPTED_KEY_TYPES
                .iter()
                .copied()
                .map(SmolStr::new_static)
                .collect(),
            max_clock_skew_secs: DEFAULT_MAX_CLOCK_SKEW_SECS,
        }
    }
}
