//! Help command handler.
//!
//! Lists the aliases available where the command was sent, so a group with
//! its own vocabulary sees its own commands.

use log::debug;

use crate::commands::{CommandContext, Event, reply::Reply};

/// Returns the aliases of the caller's command table, one action per line.
pub fn handle_help<E: Event>(context: &CommandContext<'_, E>) -> Reply {
    debug!("handling help command");

    Reply::Help {
        commands: context.table.describe(),
    }
}
