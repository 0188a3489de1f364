use std::net::IpAddr;

use anyhow::anyhow;
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    Data, Request,
};
use tracing::{trace, warn};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";
const X_HUB_SIGNATURE: &str = "X-Hub-Signature";

/// Limit name under `limits` in the Rocket config
const WEBHOOK_LIMIT: &str = "webhook";

/// GitHub caps payloads at 25 MB
const LIMIT: ByteUnit = ByteUnit::Mebibyte(25);

/// Everything we need from one inbound webhook call.
#[derive(Debug, Default)]
pub struct WebhookRequest {
    /// Value of the `X-GitHub-Event` header, absent for non-GitHub traffic
    pub event: Option<String>,
    /// Value of the `X-Hub-Signature` header
    pub signature: Option<String>,
    pub body: Vec<u8>,
    pub remote: Option<IpAddr>,
}

// Tracking issue for chaining Data guards to avoid reimplementing all this:
// https://github.com/SergioBenitez/Rocket/issues/775
#[rocket::async_trait]
impl<'r> FromData<'r> for WebhookRequest {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on GitHub webhook endpoint: {:?}", request);

        // header lookup is case-insensitive
        let headers = request.headers();
        let mut webhook = WebhookRequest {
            event: headers.get_one(X_GITHUB_EVENT).map(str::to_owned),
            signature: headers.get_one(X_HUB_SIGNATURE).map(str::to_owned),
            body: Vec::new(),
            remote: request.client_ip(),
        };

        if webhook.event.is_none() {
            trace!("no {} header, not reading the body", X_GITHUB_EVENT);
            return Outcome::Success(webhook);
        }

        let size_limit = request.limits().get(WEBHOOK_LIMIT).unwrap_or(LIMIT);
        webhook.body = match data.open(size_limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                warn!(
                    "payload too large, dropping it (limit is {}, raise `limits.{}`)",
                    size_limit, WEBHOOK_LIMIT
                );
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    anyhow!("payload exceeds the {} limit", size_limit),
                ));
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        Outcome::Success(webhook)
    }
}
