use std::time::Duration;

use matrix_sdk::{
    room::Room,
    ruma::{
        events::{room::member::MemberEventContent, StrippedStateEvent},
        RoomId,
    },
    Client,
};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Joins the rooms the relay posts to when invited, and declines every other invitation.
pub async fn autojoin_authorized_rooms(
    room_member: StrippedStateEvent<MemberEventContent>,
    client: Client,
    room: Room,
    authorized_rooms: Vec<RoomId>,
) {
    match client.user_id().await {
        Some(user_id) if room_member.state_key == user_id => {}
        // someone else's membership changed
        _ => return,
    }

    if let Room::Invited(room) = room {
        let room_id = room.room_id();
        info!("Received invitation for room `{}`", room_id);

        if !authorized_rooms.contains(room_id) {
            warn!(
                "Bot isn't authorized to join room `{}`, declining invitation",
                room_id
            );
            if let Err(err) = room.reject_invitation().await {
                error!("Couldn't decline invitation to {} ({:?})", room_id, err);
            }
            return;
        }

        debug!("Autojoining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.accept_invitation().await {
            // retry autojoin due to synapse sending invites, before the
            // invited user can join for more information see
            // https://github.com/matrix-org/synapse/issues/4345
            warn!(
                "Failed to join room {} ({:?}), retrying in {}s",
                room.room_id(),
                err,
                delay
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("Can't join room {} ({:?})", room.room_id(), err);
                return;
            }
        }
        info!("Successfully joined room {}", room.room_id());
    }
}
