use rocket::{routes, Build, Rocket};

pub mod github;
pub use github::{github_webhook, WebhookService};

/// Mounts the webhook endpoint on `rocket`, every path answers to it.
pub fn mount(rocket: Rocket<Build>, service: WebhookService) -> Rocket<Build> {
    rocket.mount("/", routes![github_webhook]).manage(service)
}
