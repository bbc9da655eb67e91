//! Command action handlers.
//!
//! One handler per [`Action`](crate::commands::command::Action). Each handler
//! receives a [`CommandContext`](crate::commands::CommandContext) and, when it
//! needs them, the shared [`Services`](crate::commands::Services), and returns
//! a [`Reply`](crate::commands::reply::Reply).
//!
//! # Handler Pattern
//!
//! 1. Validate arguments, answering with an `Err*` reply on bad input
//! 2. Fetch what the handler needs, independent lookups concurrently
//! 3. Write, then describe the outcome as a reply
//!
//! Collaborator failures are returned as errors and never turned into
//! replies.
//!
//! # Available Handlers
//!
//! - [`handle_help`] - List aliases of the caller's context
//! - [`handle_register`] - Register or change the caller's game ID
//! - [`handle_damage`] - Record today's damage
//! - [`handle_attack`] - Count an attack contribution
//! - [`handle_battle_in`], [`handle_battle_update`], [`handle_battle_status`],
//!   [`handle_battle_reset`] - Single-boss roster
//! - [`handle_boss_in`], [`handle_boss_update`], [`handle_boss_status`],
//!   [`handle_boss_reset`] - Multi-boss roster
//! - [`handle_blood_type`], [`handle_roll`], [`handle_wake_up`] - Entertainment

mod attack;
mod battle;
mod damage;
mod fun;
mod help;
mod register;

pub use crate::commands::actions::{
    attack::handle_attack,
    battle::{
        handle_battle_in, handle_battle_reset, handle_battle_status, handle_battle_update,
        handle_boss_in, handle_boss_reset, handle_boss_status, handle_boss_update,
    },
    damage::handle_damage,
    fun::{handle_blood_type, handle_roll, handle_wake_up},
    help::handle_help,
    register::handle_register,
};
