use std::{
    fs::File,
    io::{BufReader, BufWriter},
    time::Duration,
};

use anyhow::{anyhow, Context};
use matrix_sdk::{
    room::Room,
    ruma::events::{
        room::{member::MemberEventContent, message::MessageEventContent},
        AnyMessageEventContent, StrippedStateEvent,
    },
    Client, ClientConfig, Session, SyncSettings,
};
use tokio::{sync::mpsc::UnboundedReceiver, time::timeout};
use tracing::{debug, error, info, trace};

use crate::{config::RelayConfig, sink::Delivery};

mod handlers;
use handlers::autojoin_authorized_rooms;

/// Upper bound on a single message send, so one stuck request can't hold back the whole queue.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Matrix side of the relay: posts every [`Delivery`] it receives to its destination room.
pub struct Relay {
    client: Client,
    config: RelayConfig,
}

impl Relay {
    /// Creates a new [`Relay`] bot and builds a [`matrix_sdk::Client`] using the provided
    /// [`RelayConfig`].
    ///
    /// The [`Client`] is only initialized, not ready to be used yet.
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let client_config = ClientConfig::new().store_path(config.matrix_state_dir.join("store"));
        let client = Client::new_with_config(config.matrix_homeserver.clone(), client_config)?;

        Ok(Self { client, config })
    }

    /// Loads session information from file, or creates it if no previous session is found.
    ///
    /// The bot is ready to run once this function has been called.
    pub async fn init(&self) -> anyhow::Result<()> {
        self.load_or_init_session()
            .await
            .context("couldn't init session for matrix bot")?;

        let authorized_rooms = vec![self.config.matrix_room_id.clone()];

        self.client
            .register_event_handler({
                move |ev: StrippedStateEvent<MemberEventContent>, client: Client, room: Room| {
                    let authorized_rooms = authorized_rooms.clone();
                    async move { autojoin_authorized_rooms(ev, client, room, authorized_rooms).await }
                }
            })
            .await;

        Ok(())
    }

    /// Start listening to Matrix events, and post deliveries as they come.
    ///
    /// [`Relay::init`] **must** be called before this function, otherwise the [`Client`] isn't
    /// logged in.
    pub async fn run(&self, deliveries: UnboundedReceiver<Delivery>) {
        debug!("running...");

        let client = self.client.clone();
        tokio::task::spawn(async move { Self::receive_deliveries(deliveries, client).await });

        self.client.sync(SyncSettings::default()).await
    }

    async fn receive_deliveries(mut deliveries: UnboundedReceiver<Delivery>, client: Client) {
        loop {
            let delivery = match deliveries.recv().await {
                Some(delivery) => delivery,
                None => {
                    info!("all channel senders were dropped, exiting delivery loop");
                    break;
                }
            };
            debug!("received delivery: {:?}", delivery);

            // no retries, a failed delivery is lost
            if let Err(e) = Self::deliver(delivery, &client).await {
                error!("couldn't deliver notification: {:#}", e);
            }
        }
    }

    async fn deliver(delivery: Delivery, client: &Client) -> anyhow::Result<()> {
        let Delivery {
            notification,
            destination,
        } = delivery;

        let room = client.get_joined_room(&destination).ok_or_else(|| {
            anyhow!(
                "room with id {} isn't joined yet, can't send message",
                destination
            )
        })?;

        trace!(
            "sending message `{}` from {} to room `{}`",
            notification.body,
            notification.author,
            room.room_id()
        );
        let message = AnyMessageEventContent::RoomMessage(MessageEventContent::text_plain(
            notification.body,
        ));

        timeout(SEND_TIMEOUT, room.send(message, None))
            .await
            .with_context(|| format!("sending to {} timed out", destination))??;

        Ok(())
    }

    /// This loads the session information from an existing file, and tries to login with it. If no such
    /// file is found, then login using username and password, and save the new session information on
    /// disk.
    async fn load_or_init_session(&self) -> anyhow::Result<()> {
        let session_file = self.config.matrix_state_dir.join("session.yaml");

        if session_file.is_file() {
            let reader = BufReader::new(File::open(session_file)?);
            let session: Session = serde_yaml::from_reader(reader)?;

            self.client.restore_login(session.clone()).await?;
            info!("Reused session: {}, {}", session.user_id, session.device_id);
        } else {
            let response = self
                .client
                .login(
                    &self.config.matrix_username,
                    &self.config.matrix_password,
                    None,
                    Some("hookrelay bot"),
                )
                .await?;

            info!("logged in as {}", self.config.matrix_username);

            let session = Session {
                access_token: response.access_token,
                user_id: response.user_id,
                device_id: response.device_id,
            };

            let writer = BufWriter::new(File::create(session_file)?);
            serde_yaml::to_writer(writer, &session)?;
        }

        Ok(())
    }
}
