use serde::Deserialize;

use crate::webhooks::github::events::{Comment, Repository};

#[derive(Debug, Deserialize)]
pub struct CommitCommentEvent {
    pub repository: Repository,
    pub comment: Comment,
}
