use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    /// Shared secret GitHub uses to sign webhook payloads.
    pub github_secret: String,
    /// Token used to authenticate against the GitHub REST API.
    pub github_token: String,
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_github_api")]
    pub github_api: Url,
    /// Base URL of the HipChat API, e.g. `https://api.hipchat.com/v2`.
    pub hipchat_endpoint: Url,
    /// Token allowed to send user messages on HipChat.
    pub hipchat_token: String,
    /// Maps GitHub logins to the HipChat user id notifications should go to.
    pub hipchat_users: HashMap<String, String>,
    /// Timeout in seconds applied to each outbound API call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_github_api() -> Url {
    Url::parse("https://api.github.com").expect("static URL is valid")
}

fn default_request_timeout() -> u64 {
    10
}
