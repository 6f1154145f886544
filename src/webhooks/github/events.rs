use serde::Deserialize;
use url::Url;

use crate::webhooks::github::GitHubEventType;

mod commit_comment;
mod issue_comment;

pub use commit_comment::*;
pub use issue_comment::*;

#[derive(Debug)]
pub enum GitHubEvent {
    CommitComment(CommitCommentEvent),
    IssueComment(IssueCommentEvent),
}

impl GitHubEvent {
    /// Deserializes the typed payload matching the event type header.
    /// Returns `None` for event types the relay deliberately ignores.
    pub fn from_payload(
        event_type: &GitHubEventType,
        body: &[u8],
    ) -> serde_json::Result<Option<GitHubEvent>> {
        let event = match event_type {
            GitHubEventType::CommitComment => {
                GitHubEvent::CommitComment(serde_json::from_slice(body)?)
            }
            GitHubEventType::IssueComment => {
                GitHubEvent::IssueComment(serde_json::from_slice(body)?)
            }
            GitHubEventType::Other(_) => return Ok(None),
        };

        Ok(Some(event))
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub avatar_url: Url,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    /// `"<owner>/<repo>"`
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub user: GitHubUser,
    pub html_url: Url,
    pub body: String,
    /// Only present on commit comments.
    pub commit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Issue {
    pub title: String,
    pub user: GitHubUser,
}
