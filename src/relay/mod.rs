use std::{collections::HashMap, time::Duration};

use thiserror::Error;
use tracing::debug;

use crate::{config::RelayConfig, webhooks::GitHubEvent};

mod github;
use github::GitHubClient;

mod hipchat;
use hipchat::HipChatClient;

mod message_builder;

mod notification;
use notification::Notification;

pub(crate) mod utils;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("commit comment on {0} has no commit id")]
    MissingCommitId(String),
    #[error("repository name `{0}` isn't of the form owner/repo")]
    BadRepositoryName(String),
    #[error("commit {0} has no resolvable author")]
    UnattributedCommit(String),
    #[error("no chat user is mapped for `{0}`")]
    UnknownRecipient(String),
    #[error("couldn't fetch commit from GitHub")]
    UpstreamFetchFailed(#[source] reqwest::Error),
    #[error("couldn't deliver notification to HipChat")]
    NotificationDeliveryFailed(#[source] reqwest::Error),
}

/// Turns validated GitHub comment events into HipChat private messages for
/// the commented commit's (or issue's) author.
pub struct Relay {
    github: GitHubClient,
    hipchat: HipChatClient,
    users: HashMap<String, String>,
}

impl Relay {
    /// Builds both outbound API clients from the provided [`RelayConfig`].
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout);

        Ok(Self {
            github: GitHubClient::new(
                config.github_api.clone(),
                config.github_token.clone(),
                timeout,
            )?,
            hipchat: HipChatClient::new(
                config.hipchat_endpoint.clone(),
                config.hipchat_token.clone(),
                timeout,
            )?,
            users: config.hipchat_users.clone(),
        })
    }

    /// Relays one event. Delivery is best effort: the caller logs errors and
    /// answers GitHub with a 200 either way, there is no retry.
    pub async fn handle_event(&self, event: GitHubEvent) -> Result<(), RelayError> {
        let notification = match event {
            GitHubEvent::CommitComment(event) => {
                let (owner, repo) = split_full_name(&event.repository.full_name)?;
                let commit_id = event.comment.commit_id.as_deref().ok_or_else(|| {
                    RelayError::MissingCommitId(event.repository.full_name.clone())
                })?;

                let commit = self
                    .github
                    .commit(owner, repo, commit_id)
                    .await
                    .map_err(RelayError::UpstreamFetchFailed)?;

                let author = commit
                    .author
                    .ok_or(RelayError::UnattributedCommit(commit.sha))?;

                Notification::from_commit_comment(event, author, commit.commit.message)
            }
            GitHubEvent::IssueComment(event) => Notification::from_issue_comment(event),
        };

        // resolve the recipient before touching the chat API, an unmapped
        // author must not produce an outbound call
        let recipient = self
            .users
            .get(&notification.author)
            .ok_or_else(|| RelayError::UnknownRecipient(notification.author.clone()))?;

        debug!(
            "relaying comment by {} to hipchat user {}",
            notification.commenter, recipient
        );

        self.hipchat
            .send_user_message(recipient, &notification.render())
            .await
            .map_err(RelayError::NotificationDeliveryFailed)
    }
}

fn split_full_name(full_name: &str) -> Result<(&str, &str), RelayError> {
    full_name
        .split_once('/')
        .ok_or_else(|| RelayError::BadRepositoryName(full_name.to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::{
        matchers::{body_partial_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::webhooks::github::events::{
        Comment, CommitCommentEvent, GitHubUser, IssueCommentEvent, Issue, Repository,
    };

    fn test_config(github: &str, hipchat: &str, users: &[(&str, &str)]) -> RelayConfig {
        RelayConfig {
            github_secret: "unused".to_owned(),
            github_token: "ghp_test".to_owned(),
            github_api: Url::parse(github).unwrap(),
            hipchat_endpoint: Url::parse(hipchat).unwrap(),
            hipchat_token: "hc_test".to_owned(),
            hipchat_users: users
                .iter()
                .map(|(login, id)| (login.to_string(), id.to_string()))
                .collect(),
            request_timeout: 5,
        }
    }

    fn user(login: &str) -> GitHubUser {
        GitHubUser {
            login: login.to_owned(),
            avatar_url: Url::parse(&format!("https://avatars.example.com/{}.png", login)).unwrap(),
        }
    }

    fn commit_comment(full_name: &str, commit_id: Option<&str>) -> GitHubEvent {
        GitHubEvent::CommitComment(CommitCommentEvent {
            repository: Repository {
                full_name: full_name.to_owned(),
            },
            comment: Comment {
                user: user("bob"),
                html_url: Url::parse("https://github.com/acme/widgets/commit/abc123#commitcomment-1")
                    .unwrap(),
                body: "nice commit".to_owned(),
                commit_id: commit_id.map(str::to_owned),
            },
        })
    }

    fn issue_comment() -> GitHubEvent {
        GitHubEvent::IssueComment(IssueCommentEvent {
            repository: Repository {
                full_name: "org/repo".to_owned(),
            },
            issue: Issue {
                title: "Bug X".to_owned(),
                user: user("alice"),
            },
            comment: Comment {
                user: user("bob"),
                html_url: Url::parse("http://x/1").unwrap(),
                body: "fix pls".to_owned(),
                commit_id: None,
            },
        })
    }

    #[tokio::test]
    async fn commit_comment_fetches_the_commented_commit() {
        let github = MockServer::start().await;
        let hipchat = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits/abc123"))
            .and(header("Authorization", "token ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc123",
                "author": { "login": "carol", "avatar_url": "https://avatars.example.com/carol.png" },
                "commit": { "message": "Add frobnicator\n\nWith a longer explanation." }
            })))
            .expect(1)
            .mount(&github)
            .await;

        Mock::given(method("POST"))
            .and(path("/user/4242/message"))
            .and(query_param("auth_token", "hc_test"))
            .and(body_partial_json(
                json!({ "notify": true, "message_format": "html" }),
            ))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&hipchat)
            .await;

        let relay = Relay::new(&test_config(
            &github.uri(),
            &hipchat.uri(),
            &[("carol", "4242")],
        ))
        .unwrap();

        relay
            .handle_event(commit_comment("acme/widgets", Some("abc123")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_recipient_sends_nothing() {
        let hipchat = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&hipchat)
            .await;

        let relay = Relay::new(&test_config("http://127.0.0.1:9", &hipchat.uri(), &[])).unwrap();

        let err = relay.handle_event(issue_comment()).await.unwrap_err();
        assert!(matches!(err, RelayError::UnknownRecipient(login) if login == "alice"));
    }

    #[tokio::test]
    async fn unattributed_commit_stops_before_delivery() {
        let github = MockServer::start().await;
        let hipchat = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc123",
                "author": null,
                "commit": { "message": "Committed over email" }
            })))
            .expect(1)
            .mount(&github)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&hipchat)
            .await;

        let relay = Relay::new(&test_config(
            &github.uri(),
            &hipchat.uri(),
            &[("carol", "4242")],
        ))
        .unwrap();

        let err = relay
            .handle_event(commit_comment("acme/widgets", Some("abc123")))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UnattributedCommit(sha) if sha == "abc123"));
    }

    #[tokio::test]
    async fn upstream_error_is_a_fetch_failure() {
        let github = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&github)
            .await;

        let relay = Relay::new(&test_config(&github.uri(), "http://127.0.0.1:9", &[])).unwrap();

        let err = relay
            .handle_event(commit_comment("acme/widgets", Some("abc123")))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamFetchFailed(_)));
    }

    #[tokio::test]
    async fn commit_comment_without_commit_id_is_rejected() {
        let relay = Relay::new(&test_config("http://127.0.0.1:9", "http://127.0.0.1:9", &[]))
            .unwrap();

        let err = relay
            .handle_event(commit_comment("acme/widgets", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingCommitId(_)));
    }

    #[tokio::test]
    async fn repository_name_without_owner_is_rejected() {
        let relay = Relay::new(&test_config("http://127.0.0.1:9", "http://127.0.0.1:9", &[]))
            .unwrap();

        let err = relay
            .handle_event(commit_comment("widgets", Some("abc123")))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::BadRepositoryName(name) if name == "widgets"));
    }

    #[test]
    fn full_name_splits_on_first_slash_only() {
        assert!(matches!(split_full_name("acme/widgets"), Ok(("acme", "widgets"))));
        assert!(matches!(split_full_name("a/b/c"), Ok(("a", "b/c"))));
        assert!(split_full_name("no-slash").is_err());
    }
}
