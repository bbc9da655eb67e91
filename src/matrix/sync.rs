//! Matrix synchronization loop.
//!
//! [`MatrixSync::sync`] first catches up on what happened while the bot was
//! offline (pending invites), then hands every new text message to the
//! caller while persisting the sync token after each response.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::matrix::{event::MatrixEvent, session::SessionFiles};

/// Longest wait between two join attempts, in seconds.
const MAX_JOIN_DELAY_SECS: u64 = 3600;
/// Wait before retrying a failed initial sync, in seconds.
const INITIAL_SYNC_RETRY_SECS: u64 = 5;

pub struct MatrixSync {
    client: Client,
    session: SessionFiles,
}

impl MatrixSync {
    pub fn new(client: &Client, session: &SessionFiles) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Runs the sync loop, calling `on_message` with each new text message
    /// and its body.
    ///
    /// Only returns if the sync loop fails.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(MatrixEvent, String) + Send + Sync + 'static,
    {
        info!("start syncing");

        self.client.add_event_handler(auto_join_rooms);

        // Lazy-load room members
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());
        if let Some(sync_token) = self.session.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // Catch up before listening to messages so that old ones are not replayed
        let next_batch = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response.next_batch,
                Err(e) => {
                    error!(
                        "initial sync failed ({e}), retrying in {}s",
                        INITIAL_SYNC_RETRY_SECS
                    );
                    sleep(Duration::from_secs(INITIAL_SYNC_RETRY_SECS)).await;
                }
            }
        };
        if let Err(e) = self.session.persist_sync_token(next_batch.clone()).await {
            error!("failed to persist sync token: {:?}", e);
        }

        let on_message = Arc::new(on_message);
        self.client.add_event_handler({
            let on_message = Arc::clone(&on_message);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, client, on_message.as_ref()) }
            }
        });

        sync_settings = sync_settings.token(next_batch);
        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;

                if let Err(e) = self.session.persist_sync_token(response.next_batch).await {
                    error!("failed to persist sync token: {:?}", e);
                }

                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }
}

/// Joins rooms the bot is invited to.
///
/// Synapse may send the invite before the join is allowed, so failures are
/// retried with a doubling delay.
/// See <https://github.com/matrix-org/synapse/issues/4345>.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(e) = room.join().await {
            if delay > MAX_JOIN_DELAY_SECS {
                error!("can't join room {} ({e:?})", room.room_id());
                return;
            }

            warn!(
                "failed to join room {} ({e:?}), retrying in {delay}s",
                room.room_id()
            );
            sleep(Duration::from_secs(delay)).await;
            delay *= 2;
        }

        info!("joined room {}", room.room_id());
    });
}

fn on_room_message<F>(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    client: Client,
    on_message: &F,
) where
    F: Fn(MatrixEvent, String),
{
    if room.state() != RoomState::Joined {
        return;
    }

    if client.user_id() == Some(&*event.sender) {
        return;
    }

    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    debug!("text message {} from {}", event.event_id, event.sender);
    on_message(
        MatrixEvent::new(room, event.sender, event.event_id),
        text_content.body,
    );
}
