//! Command parsing.
//!
//! Converts message text into a [`ParsedCommand`] and names the canonical
//! [`Action`]s the command tables resolve aliases to.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

/// A command starts with `!`, `,` or the full-width `！`.
static SIGIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^[!,！](.*)").expect("sigil pattern is valid"));

/// A message split into a command name and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command name, `None` when the message is not a command
    pub cmd: Option<String>,
    /// Whitespace separated arguments following the command name
    pub params: Vec<String>,
}

impl ParsedCommand {
    /// Parses message text.
    ///
    /// Messages without a leading sigil, or with nothing after it, produce
    /// `cmd = None`. Parsing never fails.
    pub fn parse(text: &str) -> Self {
        let rest = match SIGIL.captures(text) {
            // A sigil followed by whitespace is not a command
            Some(caps) if !caps[1].starts_with(char::is_whitespace) => caps[1].to_owned(),
            _ => {
                return ParsedCommand {
                    cmd: None,
                    params: Vec::new(),
                };
            }
        };

        let mut tokens = rest.split_whitespace().map(str::to_owned);
        let cmd = tokens.next();
        let params = tokens.collect();

        debug!("parsed command {:?} with params {:?}", cmd, params);

        ParsedCommand { cmd, params }
    }
}

/// Canonical handler keys.
///
/// Aliases typed by users resolve to one of these through a
/// [`CommandTable`](crate::commands::command_table::CommandTable).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
pub enum Action {
    /// List the aliases available in the caller's context
    Help,
    /// Register or change the caller's game ID in the roster
    Register,
    /// Record today's damage total
    Damage,
    /// Record an attack contribution
    Attack,
    /// Check in to the boss battle
    BattleIn,
    /// Update the caller's battle status
    BattleUpdate,
    /// Show every participant's battle status
    BattleStatus,
    /// Clear the battle roster
    BattleReset,
    /// Check in to a numbered boss
    BossIn,
    /// Update the caller's status on a numbered boss
    BossUpdate,
    /// Show participants, optionally for one boss
    BossStatus,
    /// Clear the roster, optionally for one boss
    BossReset,
    /// Ten-pull luck draw
    BloodType,
    /// Roll `NdM` dice
    Roll,
    /// Wake the bot up
    WakeUp,
}

/// Administrative mode toggles.
///
/// These bypass the command tables and the reply templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// `adminMode <true|false>`
    AdminMode(bool),
    /// `groupMode <true|false>`
    GroupMode(bool),
}

impl AdminCommand {
    /// Recognises the reserved administrative commands.
    ///
    /// Any argument other than `true` switches the mode off.
    pub fn parse(command: &ParsedCommand) -> Option<Self> {
        let enabled = command.params.first().is_some_and(|p| p == "true");

        match command.cmd.as_deref()? {
            "adminMode" => Some(AdminCommand::AdminMode(enabled)),
            "groupMode" => Some(AdminCommand::GroupMode(enabled)),
            _ => None,
        }
    }
}
