//! Chat command processing.
//!
//! This module turns chat messages into ledger updates and battle check-ins,
//! and renders the outcome back to the chat.
//!
//! # Architecture
//!
//! ```text
//! Chat message
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Dispatcher  │  ← parse, admin toggles, mode gating
//! └─────────────┘
//!      │
//!      ├── ParsedCommand ──── CommandRegistry ──► Action
//!      │
//!      └── Action ───────────────────┐
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │ Action Handlers     │
//!                         │  - register/damage  │
//!                         │  - attack           │
//!                         │  - battle/boss      │
//!                         │  - blood/roll/wake  │
//!                         └─────────────────────┘
//!                                    │
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │ Reply → Templates   │
//!                         └─────────────────────┘
//! ```
//!
//! # Command Structure
//!
//! Commands start with `!`, `,` or `！` followed by an alias and its
//! arguments, e.g. `!roll 2d6` or `!dmg 1250000`. Aliases are resolved per
//! group, see [`command_table`].
//!
//! # Error Handling
//!
//! - Text that is not a command is ignored.
//! - Invalid arguments produce an `ERR_*` [`Reply`](reply::Reply).
//! - Ledger, store and transport failures propagate as [`anyhow::Error`].
//!
//! # Module Organization
//!
//! - [`dispatcher`] - Entry point for every text message
//! - [`command`] - Message parsing and canonical actions
//! - [`command_table`] - Alias tables and the per-group registry
//! - [`reply`] - Handler outcomes and templates
//! - [`actions`] - One handler per action

use std::sync::Arc;

use mockall::automock;

mod actions;
pub mod command;
pub mod command_table;
mod dispatcher;
pub mod reply;

pub use crate::commands::dispatcher::{Dispatcher, DispatcherConfig};
use crate::{
    battle::BattleStatus,
    commands::command_table::CommandTable,
    ledger::Ledger,
    store::{BATTLE_STATUS_KEY, BOSS_BATTLE_STATUS_KEY, SessionStore},
};

/// Kind of conversation a message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One-to-one conversation with the bot
    User,
    /// Group conversation
    Group,
}

/// Where a message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Sender identifier
    pub user_id: String,
    /// Conversation kind
    pub kind: SourceKind,
    /// Conversation identifier
    pub group_id: Option<String>,
}

/// Public profile of a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
}

/// An inbound text message and the means to answer it.
///
/// Implemented by the transport; handlers only see this trait.
#[automock]
pub trait Event {
    /// Origin of the message.
    fn source(&self) -> Source;
    /// Looks up the sender's profile.
    async fn profile(&self) -> anyhow::Result<Profile>;
    /// Sends a text reply to the message.
    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}

/// Per-message data handed to a handler.
pub struct CommandContext<'a, E: Event> {
    /// The message being handled
    pub event: &'a E,
    /// Origin of the message
    pub source: &'a Source,
    /// Positional arguments following the alias
    pub params: &'a [String],
    /// Alias table of the message's context
    pub table: &'a CommandTable,
}

/// Collaborators shared by every handler.
pub struct Services<L: Ledger, S: SessionStore> {
    /// Spreadsheet holding roster, damage and attack data
    pub ledger: Arc<L>,
    /// Key/value store for timestamps and battle snapshots
    pub store: Arc<S>,
    /// Single-boss battle roster
    pub battle: BattleStatus<S>,
    /// Multi-boss battle roster
    pub boss_battle: BattleStatus<S>,
}

impl<L: Ledger, S: SessionStore> Services<L, S> {
    pub fn new(ledger: Arc<L>, store: Arc<S>) -> Self {
        let battle = BattleStatus::new(Arc::clone(&store), BATTLE_STATUS_KEY);
        let boss_battle = BattleStatus::new(Arc::clone(&store), BOSS_BATTLE_STATUS_KEY);

        Services {
            ledger,
            store,
            battle,
            boss_battle,
        }
    }
}
