use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    /// Level used when `RUST_LOG` isn't set
    pub default_level: SmolStr,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            default_level: SmolStr::new_static("info"),
        }
    }
}
