use anyhow::anyhow;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use tracing::{debug, info, warn};

pub mod events;
pub use events::GitHubEvent;

mod signing;
use signing::{validate, RawPayload, ValidationError};

use crate::relay::Relay;

const X_GITHUB_EVENT: &str = "X-GitHub-Event";

pub struct GitHubSecret(pub String);

#[rocket::post("/api/webhooks/github", data = "<payload>")]
pub async fn github_webhook(
    event_type: GitHubEventType,
    payload: RawPayload,
    secret: &State<GitHubSecret>,
    relay: &State<Relay>,
) -> Result<Status, ValidationError> {
    validate(
        &payload.body,
        payload.signature.as_deref(),
        secret.0.as_bytes(),
    )?;

    let event = match GitHubEvent::from_payload(&event_type, &payload.body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!("ignoring event type {:?}", event_type);
            return Ok(Status::Ok);
        }
        Err(e) => {
            // well-formed JSON, but not the shape GitHub documents for this
            // event type; GitHub doesn't consume error detail, so drop it
            warn!(
                "payload for {:?} event had unexpected shape: {}",
                event_type, e
            );
            return Ok(Status::Ok);
        }
    };

    info!("received event: {:?}", event);

    if let Err(e) = relay.handle_event(event).await {
        warn!("encountered error while relaying event: {}", e);
    }

    Ok(Status::Ok)
}

#[derive(Debug, PartialEq, Eq)]
pub enum GitHubEventType {
    CommitComment,
    IssueComment,
    /// Event types the relay has no notification for. Kept around so the
    /// route can acknowledge them without ever producing partial data.
    Other(String),
}

impl From<&str> for GitHubEventType {
    fn from(value: &str) -> Self {
        match value {
            "commit_comment" => Self::CommitComment,
            "issue_comment" => Self::IssueComment,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_types = request.headers().get(X_GITHUB_EVENT).collect::<Vec<_>>();
        if event_types.len() != 1 {
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("request header needs exactly one event type"),
            ));
        }

        Outcome::Success(GitHubEventType::from(event_types[0]))
    }
}
