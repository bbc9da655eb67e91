//! Boss battle check-in tracking.
//!
//! Participants check in, post status updates and get cleared between
//! battles. The roster lives in memory and is written through to the
//! session store as one JSON snapshot after every change.
//!
//! - [`ParticipantEntry`]: one participant's state
//! - [`BattleStatus`]: the roster, lazily hydrated from the store

mod battle_status;
mod participant;

pub use crate::battle::{battle_status::BattleStatus, participant::ParticipantEntry};
