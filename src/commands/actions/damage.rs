//! Daily damage command handler.
//!
//! Writes the sender's damage total for the current game day into the
//! `damage` sheet, at the row of their game ID and the column labelled with
//! today's date.
//!
//! # Validation
//!
//! Checks run in this order and stop at the first failure, before anything
//! is written:
//! 1. The value is a canonical positive integer
//! 2. The sender has a game ID in the roster
//! 3. The game ID has a row in the damage sheet
//! 4. The damage sheet has a column for today

use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    commands::{CommandContext, Event, Services, reply::Reply},
    ledger::{
        DAMAGE_SHEET, Ledger, ROSTER_RANGE, find_entry_row, find_header_column, game_id_of,
    },
    store::SessionStore,
    utils::{column_letter, day_label, game_day, parse_positive_integer},
};

/// Records the sender's damage for the game day containing `now`.
pub async fn handle_damage<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
    now: DateTime<Utc>,
) -> anyhow::Result<Reply> {
    debug!("handling damage command: {:?}", context.params);

    let value = context.params.first().map(String::as_str).unwrap_or("");
    let Some(damage) = parse_positive_integer(value) else {
        return Ok(Reply::ErrInvalidDamage {
            value: value.to_owned(),
        });
    };

    let (roster, ledger) = futures::try_join!(
        services.ledger.get(ROSTER_RANGE),
        services.ledger.get(DAMAGE_SHEET)
    )?;

    let Some(game_id) = game_id_of(&roster, &context.source.user_id) else {
        return Ok(Reply::ErrNotRegistered);
    };

    let Some(row) = find_entry_row(&ledger, game_id) else {
        return Ok(Reply::ErrNotInLedger {
            game_id: game_id.to_owned(),
            ledger: DAMAGE_SHEET.to_owned(),
        });
    };

    let day = day_label(game_day(now));
    let Some(column) = find_header_column(&ledger, &day) else {
        return Ok(Reply::ErrDayNotFound { day });
    };

    let range = format!("{}!{}{}", DAMAGE_SHEET, column_letter(column), row + 1);
    services
        .ledger
        .update(&range, vec![vec![damage.to_string()]])
        .await?;
    debug!("recorded {} damage for {} at {}", damage, game_id, range);

    Ok(Reply::DamageRecorded {
        game_id: game_id.to_owned(),
        damage,
        day,
    })
}
