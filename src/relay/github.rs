use std::time::Duration;

use reqwest::header;
use serde::Deserialize;
use url::Url;

use crate::webhooks::github::events::GitHubUser;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Minimal GitHub REST v3 client, only able to read single commits.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    /// `null` when GitHub can't associate the commit email with an account.
    pub author: Option<GitHubUser>,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub message: String,
}

impl GitHubClient {
    pub fn new(api_base: Url, token: String, timeout: Duration) -> anyhow::Result<Self> {
        // GitHub rejects requests without a User-Agent
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_base,
            token,
        })
    }

    pub async fn commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<GitHubCommit, reqwest::Error> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_base.as_str().trim_end_matches('/'),
            owner,
            repo,
            sha
        );

        self.http
            .get(url)
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
