//! Client configuration.

use serde::{Deserialize, Serialize};

/// Where the index and the AppView live, and how to talk to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the search index (serves `/feed` and `/langs`).
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Base URL of the AppView used for post hydration.
    #[serde(default = "default_appview_url")]
    pub appview_url: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds. `None` leaves it to reqwest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_index_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_appview_url() -> String {
    "https://public.api.bsky.app".to_string()
}

fn default_user_agent() -> String {
    format!("skysift/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            appview_url: default_appview_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
