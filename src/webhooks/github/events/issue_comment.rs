use serde::Deserialize;

use crate::webhooks::github::events::{Comment, Issue, Repository};

#[derive(Debug, Deserialize)]
pub struct IssueCommentEvent {
    pub repository: Repository,
    pub issue: Issue,
    pub comment: Comment,
}
