use std::time::Duration;

use serde::Serialize;
use url::Url;

/// HipChat v2 client able to send a private message to a single user.
pub struct HipChatClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    message: &'a str,
    notify: bool,
    message_format: &'static str,
}

impl HipChatClient {
    pub fn new(endpoint: Url, token: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// POSTs an HTML message to the per-user message endpoint, with `notify`
    /// set so the recipient actually gets pinged.
    pub async fn send_user_message(&self, user_id: &str, html: &str) -> Result<(), reqwest::Error> {
        let url = format!(
            "{}/user/{}/message",
            self.endpoint.as_str().trim_end_matches('/'),
            user_id
        );

        self.http
            .post(url)
            .query(&[("auth_token", self.token.as_str())])
            .json(&UserMessage {
                message: html,
                notify: true,
                message_format: "html",
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
