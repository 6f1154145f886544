use std::io;

use hmac::{Hmac, Mac};
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    response::{self, status, Responder},
    Data, Request,
};
use sha1::Sha1;
use sha2::Sha256;
use thiserror::Error;
use tracing::trace;

const X_GITHUB_SIGNATURE: &str = "X-Hub-Signature";

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

/// Reasons an inbound payload gets rejected before any field extraction
/// happens. The `Display` strings are the HTTP response bodies.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty payload")]
    EmptyPayload,
    #[error("invalid github signature")]
    InvalidSignature,
    #[error("invalid json body")]
    MalformedJson,
}

impl<'r> Responder<'r, 'static> for ValidationError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(Status::BadRequest, self.to_string()).respond_to(request)
    }
}

/// Gate every webhook payload has to pass before it is dispatched, in order:
/// non-empty body, then HMAC signature, then JSON well-formedness. The first
/// failed check wins.
pub fn validate(
    body: &[u8],
    signature: Option<&str>,
    secret: &[u8],
) -> Result<(), ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let signature = signature.ok_or(ValidationError::InvalidSignature)?;
    if !signature_matches(secret, signature, body) {
        return Err(ValidationError::InvalidSignature);
    }

    if serde_json::from_slice::<serde_json::Value>(body).is_err() {
        return Err(ValidationError::MalformedJson);
    }

    Ok(())
}

fn signature_matches(secret: &[u8], signature: &str, data: &[u8]) -> bool {
    trace!("validating signature...");

    // GitHub sends `<algorithm>=<hexdigest>`; the digest could itself contain
    // `=` in other encodings, so only split on the first one
    let Some((algorithm, hexdigest)) = signature.split_once('=') else {
        trace!("signature `{}` has no algorithm prefix", signature);
        return false;
    };

    let digest = match hex::decode(hexdigest) {
        Ok(bytes) => bytes,
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", hexdigest);
            return false;
        }
    };

    match algorithm {
        "sha1" => verify_hmac::<Hmac<Sha1>>(secret, data, &digest),
        "sha256" => verify_hmac::<Hmac<Sha256>>(secret, data, &digest),
        other => {
            trace!("unsupported signature algorithm `{}`", other);
            false
        }
    }
}

// verify_slice compares MACs in constant time
fn verify_hmac<M: Mac + hmac::digest::KeyInit>(secret: &[u8], data: &[u8], digest: &[u8]) -> bool {
    let mut mac = <M as Mac>::new_from_slice(secret).expect("this should never fail");
    mac.update(data);
    mac.verify_slice(digest).is_ok()
}

/// Raw inbound request data, captured without any validation so the gate above
/// can apply its checks in the documented order.
pub struct RawPayload {
    pub body: Vec<u8>,
    pub signature: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromData<'r> for RawPayload {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on GitHub webhook endpoint: {:?}", request);

        let signatures = request
            .headers()
            .get(X_GITHUB_SIGNATURE)
            .collect::<Vec<_>>();
        // a missing or repeated signature header fails validation later, after
        // the empty-body check
        let signature = (signatures.len() == 1).then(|| signatures[0].to_owned());

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let body = match data.open(size_limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                trace!("payload was too big");
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded").into(),
                ));
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        Outcome::Success(RawPayload { body, signature })
    }
}
