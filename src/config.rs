use std::{
    fs::File,
    io::BufReader,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use matrix_sdk::ruma::RoomId;
use serde::Deserialize;
use url::Url;

use crate::webhooks::github::InterestTable;

#[derive(Clone, Debug, Deserialize)]
pub struct RelayConfig {
    /// Address the webhook listener binds to
    #[serde(default = "default_address")]
    pub address: IpAddr,
    /// Port the webhook listener binds to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret configured on the GitHub side of the webhook. Without it, every payload is
    /// accepted unsigned.
    pub secret: Option<String>,
    /// Event kinds and actions that should be announced, e.g. `issues: [opened, closed]`
    #[serde(default)]
    pub events: InterestTable,
    /// Name attached to every notification handed to the sink
    #[serde(default = "default_author")]
    pub author: String,
    /// The URL for the homeserver we should connect to
    pub matrix_homeserver: Url,
    /// The bot's account username
    pub matrix_username: String,
    /// The bot's account password
    pub matrix_password: String,
    /// Path to a directory where the bot will store Matrix state and current session information.
    pub matrix_state_dir: PathBuf,
    /// ID of the Matrix room where the bot should post notifications. The bot will only accept
    /// invitations to this room.
    #[serde(alias = "dest")]
    pub matrix_room_id: RoomId,
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9000
}

fn default_author() -> String {
    String::from("hookrelay")
}

impl RelayConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let config_file =
            File::open(path).with_context(|| format!("couldn't open {}:", path.display()))?;

        serde_yaml::from_reader(BufReader::new(config_file)).context("couldn't parse config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
matrix_homeserver: https://matrix.example.org
matrix_username: hookrelay
matrix_password: hunter2
matrix_state_dir: /var/lib/hookrelay
matrix_room_id: "!announce:example.org"
"#;

    #[test]
    fn defaults() {
        let config: RelayConfig = serde_yaml::from_str(MINIMAL).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.author, "hookrelay");
        assert!(config.secret.is_none());
        assert!(!config.events.is_interesting("issues", Some("opened")));
    }

    #[test]
    fn full_config() {
        let yaml = r#"
port: 8080
secret: s3cr3t
author: halibot
events:
  issues: [opened, closed]
  pull_request: [closed]
matrix_homeserver: https://matrix.example.org
matrix_username: hookrelay
matrix_password: hunter2
matrix_state_dir: /var/lib/hookrelay
dest: "!announce:example.org"
"#;
        let config: RelayConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.author, "halibot");
        assert_eq!(config.matrix_room_id.as_str(), "!announce:example.org");
        assert!(config.events.is_interesting("issues", Some("closed")));
        assert!(config.events.is_interesting("pull_request", Some("closed")));
        assert!(!config.events.is_interesting("pull_request", Some("opened")));
    }

    #[test]
    fn invalid_room_id() {
        let yaml = MINIMAL.replace("!announce:example.org", "announce");

        assert!(serde_yaml::from_str::<RelayConfig>(&yaml).is_err());
    }
}
