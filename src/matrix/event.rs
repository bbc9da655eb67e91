//! Matrix room messages as command [`Event`]s.

use log::debug;
use matrix_sdk::{
    Room,
    ruma::{
        OwnedEventId, OwnedUserId,
        events::room::message::{
            AddMentions, ForwardThread, ReplyMetadata, RoomMessageEventContent,
        },
    },
};

use crate::commands::{Event, Profile, Source, SourceKind};

/// Rooms with more members than this are group conversations.
const DIRECT_ROOM_MEMBERS: u64 = 2;

/// A text message received in a joined room.
#[derive(Clone)]
pub struct MatrixEvent {
    room: Room,
    sender: OwnedUserId,
    event_id: OwnedEventId,
}

impl MatrixEvent {
    pub fn new(room: Room, sender: OwnedUserId, event_id: OwnedEventId) -> Self {
        MatrixEvent {
            room,
            sender,
            event_id,
        }
    }
}

fn source_kind(joined_members: u64) -> SourceKind {
    if joined_members > DIRECT_ROOM_MEMBERS {
        SourceKind::Group
    } else {
        SourceKind::User
    }
}

impl Event for MatrixEvent {
    fn source(&self) -> Source {
        Source {
            user_id: self.sender.to_string(),
            kind: source_kind(self.room.joined_members_count()),
            group_id: Some(self.room.room_id().to_string()),
        }
    }

    async fn profile(&self) -> anyhow::Result<Profile> {
        let member = self.room.get_member(&self.sender).await?;
        let display_name = member
            .as_ref()
            .and_then(|member| member.display_name())
            .map(str::to_owned)
            .unwrap_or_else(|| self.sender.to_string());

        Ok(Profile {
            user_id: self.sender.to_string(),
            display_name,
        })
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        debug!("replying to {} in {}", self.event_id, self.room.room_id());

        let content = RoomMessageEventContent::text_markdown(text).make_reply_to(
            ReplyMetadata::new(&self.event_id, &self.sender, None),
            ForwardThread::No,
            AddMentions::No,
        );
        self.room.send(content).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind() {
        assert_eq!(source_kind(0), SourceKind::User);
        assert_eq!(source_kind(1), SourceKind::User);
        assert_eq!(source_kind(2), SourceKind::User);
        assert_eq!(source_kind(3), SourceKind::Group);
        assert_eq!(source_kind(40), SourceKind::Group);
    }
}
