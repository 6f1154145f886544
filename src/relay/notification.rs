use std::fmt::Write;

use url::Url;

use crate::relay::{message_builder::MessageBuilder, utils::shorten_content};
use crate::webhooks::github::events::{CommitCommentEvent, GitHubUser, IssueCommentEvent};

/// Everything the chat message needs, resolved from a validated event.
/// `author` doubles as the key into the recipient mapping.
#[derive(Debug)]
pub struct Notification {
    pub commenter: String,
    pub avatar_url: Url,
    pub repository: String,
    pub comment_body: String,
    pub comment_url: Url,
    pub author: String,
    pub subject: String,
}

impl Notification {
    /// Issue comments carry everything we need in the payload itself: the
    /// notified author is the issue's author, the subject its title.
    pub fn from_issue_comment(event: IssueCommentEvent) -> Self {
        Self {
            commenter: event.comment.user.login,
            avatar_url: event.comment.user.avatar_url,
            repository: event.repository.full_name,
            comment_body: event.comment.body,
            comment_url: event.comment.html_url,
            author: event.issue.user.login,
            subject: event.issue.title,
        }
    }

    /// Commit comments only carry the commit id; author and message were
    /// fetched from the commits API by the caller.
    pub fn from_commit_comment(
        event: CommitCommentEvent,
        author: GitHubUser,
        message: String,
    ) -> Self {
        Self {
            commenter: event.comment.user.login,
            avatar_url: event.comment.user.avatar_url,
            repository: event.repository.full_name,
            comment_body: event.comment.body,
            comment_url: event.comment.html_url,
            author: author.login,
            subject: message,
        }
    }

    /// Renders the HipChat HTML body. Only the first line of the subject is
    /// used as link text, commit messages can be arbitrarily long.
    pub fn render(&self) -> String {
        let subject = shorten_content(self.subject.lines().next().unwrap_or_default());

        let mut message = MessageBuilder::new();
        message.avatar(&self.avatar_url);
        write!(message, " ").unwrap();
        message.bold();
        write!(message, "{}", self.commenter).unwrap();
        message.close_last();
        write!(message, " commented on ").unwrap();
        message.code();
        write!(message, "{}", self.repository).unwrap();
        message.close_last();
        message.line_break();
        message.link(&subject, &self.comment_url);
        message.line_break();
        write!(message, "Message: {}", self.comment_body).unwrap();

        message.build()
    }
}
