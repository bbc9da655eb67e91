//! Entry point for every text message.
//!
//! The [`Dispatcher`] parses the message, applies the administrative mode
//! toggles, checks whether the sender may run commands here, runs the
//! resolved handler and renders its reply.
//!
//! # Gating
//!
//! Evaluated in this order:
//! 1. The admin may always run commands, anywhere.
//! 2. In admin mode nobody else may.
//! 3. Otherwise, in group mode, anyone may from one of the configured groups.
//! 4. Nobody else may.

use std::collections::HashSet;

use chrono::Utc;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    commands::{
        CommandContext, Event, Services, Source, SourceKind,
        actions::{
            handle_attack, handle_battle_in, handle_battle_reset, handle_battle_status,
            handle_battle_update, handle_blood_type, handle_boss_in, handle_boss_reset,
            handle_boss_status, handle_boss_update, handle_damage, handle_help, handle_register,
            handle_roll, handle_wake_up,
        },
        command::{Action, AdminCommand, ParsedCommand},
        command_table::CommandRegistry,
        reply::{Reply, Templates},
    },
    ledger::Ledger,
    store::SessionStore,
};

/// Who may run commands, and where.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// User allowed to run commands anywhere and to toggle modes
    pub admin_id: String,
    /// Groups where anyone may run commands in group mode
    pub group_ids: Vec<String>,
    /// Initial admin mode
    pub admin_mode: bool,
    /// Initial group mode
    pub group_mode: bool,
}

#[derive(Debug, Clone, Copy)]
struct Modes {
    admin_mode: bool,
    group_mode: bool,
}

/// Turns messages into handler calls and replies.
///
/// # Examples
///
/// ```no_run
/// // Replies "2d6: 7" or similar if the sender may run commands here
/// dispatcher.execute(&event, "!roll 2d6").await?;
/// ```
pub struct Dispatcher<L: Ledger, S: SessionStore> {
    admin_id: String,
    group_ids: HashSet<String>,
    modes: Mutex<Modes>,
    registry: CommandRegistry,
    templates: Templates,
    services: Services<L, S>,
}

impl<L: Ledger, S: SessionStore> Dispatcher<L, S> {
    pub fn new(
        config: DispatcherConfig,
        registry: CommandRegistry,
        templates: Templates,
        services: Services<L, S>,
    ) -> Self {
        Dispatcher {
            admin_id: config.admin_id,
            group_ids: config.group_ids.into_iter().collect(),
            modes: Mutex::new(Modes {
                admin_mode: config.admin_mode,
                group_mode: config.group_mode,
            }),
            registry,
            templates,
            services,
        }
    }

    pub async fn admin_mode(&self) -> bool {
        self.modes.lock().await.admin_mode
    }

    pub async fn group_mode(&self) -> bool {
        self.modes.lock().await.group_mode
    }

    /// Handles one text message.
    ///
    /// Sends at most one reply. Text that is not a command, unknown aliases
    /// and senders who may not run commands get no reply at all.
    ///
    /// # Errors
    ///
    /// Returns the handler's error when a collaborator fails, or the
    /// transport's error when the reply cannot be sent.
    pub async fn execute<E: Event>(&self, event: &E, text: &str) -> anyhow::Result<()> {
        let command = ParsedCommand::parse(text);
        let Some(cmd) = command.cmd.as_deref() else {
            return Ok(());
        };

        let source = event.source();

        if let Some(admin_command) = AdminCommand::parse(&command) {
            return self.toggle(event, &source, admin_command).await;
        }

        let group_id = source.group_id.as_deref();
        let Some(action) = self.registry.resolve(cmd, group_id) else {
            debug!("no action for {} in {:?}", cmd, group_id);
            return Ok(());
        };

        if !self.is_allowed(&source).await {
            debug!(
                "{} may not run {:?} in {:?}",
                source.user_id, action, group_id
            );
            return Ok(());
        }

        let context = CommandContext {
            event,
            source: &source,
            params: &command.params,
            table: self.registry.table_for(group_id),
        };

        let reply = self.run(action, &context).await?;
        debug!("{:?} by {} -> {:?}", action, source.user_id, reply);

        event.reply(&self.templates.render(&reply)).await
    }

    async fn toggle<E: Event>(
        &self,
        event: &E,
        source: &Source,
        command: AdminCommand,
    ) -> anyhow::Result<()> {
        if source.user_id != self.admin_id {
            debug!("ignoring {:?} from {}", command, source.user_id);
            return Ok(());
        }

        let confirmation = {
            let mut modes = self.modes.lock().await;
            match command {
                AdminCommand::AdminMode(true) => {
                    modes.admin_mode = true;
                    "Admin mode on, only the admin can give me orders now."
                }
                AdminCommand::AdminMode(false) => {
                    modes.admin_mode = false;
                    "Admin mode off, I'll handle everyone's chores again."
                }
                AdminCommand::GroupMode(true) => {
                    modes.group_mode = true;
                    "Group mode on, back to work."
                }
                AdminCommand::GroupMode(false) => {
                    modes.group_mode = false;
                    "Group mode off, bye."
                }
            }
        };
        info!("{:?} by {}", command, source.user_id);

        event.reply(confirmation).await
    }

    async fn is_allowed(&self, source: &Source) -> bool {
        if source.user_id == self.admin_id {
            return true;
        }

        let modes = *self.modes.lock().await;
        if modes.admin_mode {
            return false;
        }

        modes.group_mode
            && source.kind == SourceKind::Group
            && source
                .group_id
                .as_ref()
                .is_some_and(|id| self.group_ids.contains(id))
    }

    async fn run<E: Event>(
        &self,
        action: Action,
        context: &CommandContext<'_, E>,
    ) -> anyhow::Result<Reply> {
        let services = &self.services;

        match action {
            Action::Help => Ok(handle_help(context)),
            Action::Register => handle_register(context, services).await,
            Action::Damage => handle_damage(context, services, Utc::now()).await,
            Action::Attack => handle_attack(context, services, Utc::now()).await,
            Action::BattleIn => handle_battle_in(context, services).await,
            Action::BattleUpdate => handle_battle_update(context, services).await,
            Action::BattleStatus => handle_battle_status(services).await,
            Action::BattleReset => handle_battle_reset(services).await,
            Action::BossIn => handle_boss_in(context, services).await,
            Action::BossUpdate => handle_boss_update(context, services).await,
            Action::BossStatus => handle_boss_status(context, services).await,
            Action::BossReset => handle_boss_reset(context, services).await,
            Action::BloodType => handle_blood_type(context).await,
            Action::Roll => Ok(handle_roll(context)),
            Action::WakeUp => Ok(handle_wake_up()),
        }
    }
}
