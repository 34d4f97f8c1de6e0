use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    /// Schemes the built-in resolvers get registered for
    ///
    /// Supported values are `https` and `did`
    pub schemes: Vec<SmolStr>,

    /// Timeout of key document requests
    pub request_timeout_secs: u64,

    /// Maximum size of a fetched key document in bytes
    pub body_limit: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            schemes: vec![SmolStr::new_static("https"), SmolStr::new_static("did")],
            request_timeout_secs: 30,
            body_limit: 1024 * 1024,
        }
    }
}
