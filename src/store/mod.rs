//! Key/value session store.
//!
//! Small pieces of state that must survive restarts (battle roster snapshots,
//! the last daily reset of the attack ledger) are kept as strings under
//! fixed keys. The [`SessionStore`] trait abstracts the backend so handlers
//! can be tested with a mock.

use mockall::automock;

mod file_store;

pub use crate::store::file_store::FileSessionStore;

/// Snapshot of the single-boss battle roster.
pub const BATTLE_STATUS_KEY: &str = "battleStatus";
/// Snapshot of the multi-boss battle roster.
pub const BOSS_BATTLE_STATUS_KEY: &str = "yuzuBattleStatus";
/// RFC 3339 timestamp of the last attack ledger reset.
pub const ATTACK_LAST_RESET_KEY: &str = "attackLastReset";

/// String key/value storage.
#[automock]
pub trait SessionStore {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
