//! Boss battle check-in handlers.
//!
//! Thin wrappers over [`BattleStatus`](crate::battle::BattleStatus). The
//! single-boss commands use the main roster; the multi-boss commands use the
//! second roster and take a boss number.

use log::debug;

use crate::{
    battle::ParticipantEntry,
    commands::{CommandContext, Event, Services, reply::Reply},
    ledger::Ledger,
    store::SessionStore,
    utils::parse_positive_integer,
};

fn format_status(entries: &[(String, ParticipantEntry)]) -> String {
    entries
        .iter()
        .map(|(_, entry)| match entry.boss_num {
            Some(boss_num) => format!("[{}] {}: {}", boss_num, entry.name, entry.status),
            None => format!("{}: {}", entry.name, entry.status),
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn status_reply(entries: &[(String, ParticipantEntry)]) -> Reply {
    if entries.is_empty() {
        return Reply::BattleStatusEmpty;
    }

    Reply::BattleStatus {
        status: format_status(entries),
    }
}

/// Parses the leading boss number argument.
fn boss_num(params: &[String]) -> Result<u64, Reply> {
    let value = params.first().map(String::as_str).unwrap_or("");

    parse_positive_integer(value).ok_or_else(|| Reply::ErrInvalidBossNum {
        value: value.to_owned(),
    })
}

/// Parses an optional boss number argument, absent meaning every boss.
fn optional_boss_num(params: &[String]) -> Result<Option<u64>, Reply> {
    match params.first() {
        None => Ok(None),
        Some(_) => boss_num(params).map(Some),
    }
}

/// Checks the sender in to the battle.
pub async fn handle_battle_in<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let profile = context.event.profile().await?;
    let name = profile.display_name;

    let entered = services
        .battle
        .get_in(&name, &context.source.user_id, None)
        .await?;
    debug!("{} checked in: {}", context.source.user_id, entered);

    if entered {
        Ok(Reply::BattleEntered { name })
    } else {
        Ok(Reply::ErrAlreadyEntered { name })
    }
}

/// Sets the sender's status to the arguments joined by spaces.
pub async fn handle_battle_update<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let status = context.params.join(" ");
    if status.is_empty() {
        return Ok(Reply::ErrMissingComment);
    }

    let profile = context.event.profile().await?;
    let name = profile.display_name;

    services
        .battle
        .update(&name, &context.source.user_id, None, &status)
        .await?;

    Ok(Reply::BattleUpdated { name, status })
}

pub async fn handle_battle_status<L: Ledger, S: SessionStore>(
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let entries = services.battle.get_status(None).await?;
    Ok(status_reply(&entries))
}

pub async fn handle_battle_reset<L: Ledger, S: SessionStore>(
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    services.battle.reset(None).await?;
    Ok(Reply::BattleReset)
}

/// Checks the sender in to the boss given as first argument.
///
/// A sender already fighting another boss is moved to this one.
pub async fn handle_boss_in<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let boss_num = match boss_num(context.params) {
        Ok(boss_num) => boss_num,
        Err(reply) => return Ok(reply),
    };

    let profile = context.event.profile().await?;
    let name = profile.display_name;

    let entered = services
        .boss_battle
        .get_in(&name, &context.source.user_id, Some(boss_num))
        .await?;
    debug!(
        "{} checked in to boss {}: {}",
        context.source.user_id, boss_num, entered
    );

    if entered {
        Ok(Reply::BossEntered { name, boss_num })
    } else {
        Ok(Reply::ErrAlreadyEntered { name })
    }
}

/// Sets the sender's status on the boss given as first argument.
pub async fn handle_boss_update<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let boss_num = match boss_num(context.params) {
        Ok(boss_num) => boss_num,
        Err(reply) => return Ok(reply),
    };

    let status = context.params[1..].join(" ");
    if status.is_empty() {
        return Ok(Reply::ErrMissingComment);
    }

    let profile = context.event.profile().await?;
    let name = profile.display_name;

    services
        .boss_battle
        .update(&name, &context.source.user_id, Some(boss_num), &status)
        .await?;

    Ok(Reply::BossUpdated {
        name,
        boss_num,
        status,
    })
}

/// Lists participants of the boss given as argument, or of every boss.
pub async fn handle_boss_status<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let boss_num = match optional_boss_num(context.params) {
        Ok(boss_num) => boss_num,
        Err(reply) => return Ok(reply),
    };

    let entries = services.boss_battle.get_status(boss_num).await?;
    Ok(status_reply(&entries))
}

/// Clears the boss given as argument, or every boss.
pub async fn handle_boss_reset<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    let boss_num = match optional_boss_num(context.params) {
        Ok(boss_num) => boss_num,
        Err(reply) => return Ok(reply),
    };

    services.boss_battle.reset(boss_num).await?;
    Ok(Reply::BossReset { boss_num })
}
