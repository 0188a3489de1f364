use matrix_sdk::ruma::RoomId;
use rocket::{http::Status, State};
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::sink::{Notification, NotificationSink};

mod events;
pub use events::{render, EventKind};

mod interest;
pub use interest::InterestTable;

mod request;
pub use request::WebhookRequest;

mod signing;
pub use signing::GitHubSecret;

/// GitHub only looks at the status code, and every outcome gets the same one so the sender can't
/// tell a rejected payload from an ignored one.
#[rocket::post("/<_..>", data = "<request>")]
pub fn github_webhook(
    request: anyhow::Result<WebhookRequest>,
    service: &State<WebhookService>,
) -> Status {
    match request {
        Ok(request) => {
            let handled = service.handle(&request);
            trace!("webhook from {:?} handled: {:?}", request.remote, handled);
        }
        Err(e) => error!("couldn't read webhook payload: {}", e),
    }

    Status::NoContent
}

/// How far a webhook made it through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    /// No `X-GitHub-Event` header
    NotAWebhook,
    AuthRejected,
    MalformedPayload,
    Uninteresting,
    /// Interesting, but we don't know how to announce it
    Unrenderable,
    Delivered,
    DeliveryFailed,
}

/// State shared by all webhook handlers. Nothing in it changes after startup.
pub struct WebhookService {
    secret: GitHubSecret,
    interests: InterestTable,
    destination: RoomId,
    author: String,
    sink: Box<dyn NotificationSink>,
}

impl WebhookService {
    pub fn new(
        secret: GitHubSecret,
        interests: InterestTable,
        destination: RoomId,
        author: String,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            secret,
            interests,
            destination,
            author,
            sink,
        }
    }

    pub fn handle(&self, request: &WebhookRequest) -> Handled {
        // filter out non-github events
        let kind = match &request.event {
            Some(kind) => EventKind::from(kind.as_str()),
            None => {
                info!("received something that is not a GitHub event, ignoring");
                return Handled::NotAWebhook;
            }
        };

        if !self.secret.verify(request.signature.as_deref(), &request.body) {
            warn!(
                "HMAC signature mismatch for {} event from {:?}",
                kind, request.remote
            );
            return Handled::AuthRejected;
        }

        let payload: Value = match serde_json::from_slice(&request.body) {
            Ok(payload) => payload,
            Err(e) => {
                error!("couldn't parse {} payload: {}", kind, e);
                return Handled::MalformedPayload;
            }
        };

        let action = payload.get("action").and_then(Value::as_str);
        debug!("received {} {:?} event", kind, action);

        if !self.interests.is_interesting(kind.as_str(), action) {
            trace!("{} {:?} isn't configured, ignoring", kind, action);
            return Handled::Uninteresting;
        }

        let report = match render(&kind, &payload) {
            Ok(Some(report)) => report,
            Ok(None) => {
                warn!("could not form report for \"{} {:?}\"", kind, action);
                return Handled::Unrenderable;
            }
            Err(e) => {
                error!("malformed {} payload: {}", kind, e);
                return Handled::MalformedPayload;
            }
        };

        debug!("reporting event to {}", self.destination);
        let notification = Notification {
            body: report,
            author: self.author.clone(),
        };

        match self.sink.deliver(notification, &self.destination) {
            Ok(()) => Handled::Delivered,
            Err(e) => {
                error!("couldn't deliver notification: {}", e);
                Handled::DeliveryFailed
            }
        }
    }
}
