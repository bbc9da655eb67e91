//! Battle participant state.

use serde::{Deserialize, Serialize};

/// Status text given to a participant on check-in.
pub const ENTERED_STATUS: &str = "entered";

/// State of one participant in a boss battle.
///
/// Serialized with camelCase keys; `bossNum` is omitted for the single-boss
/// roster.
///
/// # Examples
///
/// ```
/// # use clanbot::battle::ParticipantEntry;
/// let entry = ParticipantEntry {
///     name: "Kyaru".to_string(),
///     boss_num: Some(3),
///     status: "entered".to_string(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantEntry {
    /// Display name at the time of the last check-in or update
    pub name: String,
    /// Boss the participant is fighting, multi-boss roster only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_num: Option<u64>,
    /// Free-form status text
    pub status: String,
}

impl ParticipantEntry {
    /// A freshly checked-in participant.
    pub fn entered(name: &str, boss_num: Option<u64>) -> Self {
        ParticipantEntry {
            name: name.to_owned(),
            boss_num,
            status: ENTERED_STATUS.to_owned(),
        }
    }
}
