//! Battle roster with write-through persistence.
//!
//! The roster is hydrated from the session store on first use and then kept
//! in memory. Every mutation writes the whole roster back as a JSON list of
//! `[userId, entry]` pairs before the in-memory copy is replaced, so memory
//! and the persisted snapshot never diverge.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{Mutex, OnceCell};

use crate::{battle::participant::ParticipantEntry, store::SessionStore};

/// Participants in check-in order, keyed by user ID.
type Roster = Vec<(String, ParticipantEntry)>;

/// Battle roster backed by one key of a [`SessionStore`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use clanbot::{battle::BattleStatus, store::FileSessionStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = Arc::new(FileSessionStore::new("store.json".to_string()));
/// let battle = BattleStatus::new(store, "battleStatus");
///
/// assert!(battle.get_in("Kyaru", "@kyaru:example.org", None).await?);
/// assert!(!battle.get_in("Kyaru", "@kyaru:example.org", None).await?);
/// # Ok(())
/// # }
/// ```
pub struct BattleStatus<S: SessionStore> {
    /// Backing store
    store: Arc<S>,
    /// Key holding the roster snapshot
    key: &'static str,
    /// Roster, initialised from the store on first access
    roster: OnceCell<Mutex<Roster>>,
}

impl<S: SessionStore> BattleStatus<S> {
    pub fn new(store: Arc<S>, key: &'static str) -> Self {
        BattleStatus {
            store,
            key,
            roster: OnceCell::new(),
        }
    }

    /// Returns the roster, hydrating it from the store exactly once.
    ///
    /// A failed hydration leaves the roster uninitialised so the next call
    /// tries again.
    async fn roster(&self) -> anyhow::Result<&Mutex<Roster>> {
        self.roster
            .get_or_try_init(|| async {
                let roster = self.load().await?;
                Ok::<_, anyhow::Error>(Mutex::new(roster))
            })
            .await
    }

    async fn load(&self) -> anyhow::Result<Roster> {
        let Some(serialized) = self.store.get(self.key).await? else {
            info!("no persisted {}, starting with an empty roster", self.key);
            return Ok(Vec::new());
        };

        let roster: Roster = serde_json::from_str(&serialized)?;
        info!("hydrated {} with {} participants", self.key, roster.len());

        Ok(roster)
    }

    async fn persist(&self, roster: &Roster) -> anyhow::Result<()> {
        let serialized = serde_json::to_string(roster)?;
        self.store.set(self.key, &serialized).await?;
        debug!("persisted {} -> {}", self.key, serialized);
        Ok(())
    }

    /// Checks a participant in with the status `entered`.
    ///
    /// Returns `false` without touching anything when the participant is
    /// already checked in (on the same boss, if `boss_num` is given). A
    /// participant checked in on another boss is moved to `boss_num`.
    pub async fn get_in(
        &self,
        name: &str,
        user_id: &str,
        boss_num: Option<u64>,
    ) -> anyhow::Result<bool> {
        let mut roster = self.roster().await?.lock().await;

        let next = match roster.iter().position(|(id, _)| id == user_id) {
            Some(i) if boss_num.is_none() || roster[i].1.boss_num == boss_num => {
                debug!("{} already checked in to {}", user_id, self.key);
                return Ok(false);
            }
            Some(i) => {
                let mut next = roster.clone();
                next[i].1 = ParticipantEntry::entered(name, boss_num);
                next
            }
            None => {
                let mut next = roster.clone();
                next.push((user_id.to_owned(), ParticipantEntry::entered(name, boss_num)));
                next
            }
        };

        self.persist(&next).await?;
        *roster = next;

        Ok(true)
    }

    /// Sets a participant's status, checking them in if needed.
    pub async fn update(
        &self,
        name: &str,
        user_id: &str,
        boss_num: Option<u64>,
        comment: &str,
    ) -> anyhow::Result<bool> {
        let mut roster = self.roster().await?.lock().await;

        let entry = ParticipantEntry {
            name: name.to_owned(),
            boss_num,
            status: comment.to_owned(),
        };

        let mut next = roster.clone();
        match next.iter_mut().find(|(id, _)| id == user_id) {
            Some((_, existing)) => *existing = entry,
            None => next.push((user_id.to_owned(), entry)),
        }

        self.persist(&next).await?;
        *roster = next;

        Ok(true)
    }

    /// Returns participants in check-in order, only those on `boss_num` if given.
    pub async fn get_status(
        &self,
        boss_num: Option<u64>,
    ) -> anyhow::Result<Vec<(String, ParticipantEntry)>> {
        let roster = self.roster().await?.lock().await;

        Ok(roster
            .iter()
            .filter(|(_, entry)| boss_num.is_none() || entry.boss_num == boss_num)
            .cloned()
            .collect())
    }

    /// Removes every participant, or only those on `boss_num` if given.
    pub async fn reset(&self, boss_num: Option<u64>) -> anyhow::Result<()> {
        let mut roster = self.roster().await?.lock().await;

        let next: Roster = match boss_num {
            None => Vec::new(),
            Some(_) => roster
                .iter()
                .filter(|(_, entry)| entry.boss_num != boss_num)
                .cloned()
                .collect(),
        };

        self.persist(&next).await?;
        info!(
            "reset {} ({:?}), {} participants left",
            self.key,
            boss_num,
            next.len()
        );
        *roster = next;

        Ok(())
    }
}
