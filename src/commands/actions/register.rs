//! Roster registration command handler.
//!
//! Links the sender to their in-game ID in the `idList` sheet. A sender that
//! already has a roster row gets it rewritten in place; anyone else gets a
//! new row appended.

use log::debug;

use crate::{
    commands::{CommandContext, Event, Services, reply::Reply},
    ledger::{Ledger, ROSTER_GAME_ID_COLUMN, ROSTER_RANGE, ROSTER_SHEET, cell, find_row},
    store::SessionStore,
};

/// Registers or changes the sender's game ID.
///
/// # Returns
///
/// - [`Reply::ErrMissingGameId`] without a game ID argument
/// - [`Reply::RegisterChanged`] with the previous game ID when the sender had a row
/// - [`Reply::RegisterCreated`] otherwise
pub async fn handle_register<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
) -> anyhow::Result<Reply> {
    debug!("handling register command: {:?}", context.params);

    let Some(game_id) = context.params.first() else {
        return Ok(Reply::ErrMissingGameId);
    };

    let (profile, roster) = futures::try_join!(
        context.event.profile(),
        services.ledger.get(ROSTER_RANGE)
    )?;

    let user_id = &context.source.user_id;
    let row = vec![user_id.clone(), profile.display_name, game_id.clone()];

    match find_row(&roster, user_id) {
        Some(index) => {
            let previous = cell(&roster, index, ROSTER_GAME_ID_COLUMN).to_owned();
            let line = index + 1;
            let range = format!("{}!A{}:C{}", ROSTER_SHEET, line, line);

            services.ledger.update(&range, vec![row]).await?;
            debug!("{} changed game ID {} -> {}", user_id, previous, game_id);

            Ok(Reply::RegisterChanged {
                previous,
                game_id: game_id.clone(),
            })
        }
        None => {
            services.ledger.append(ROSTER_SHEET, vec![row]).await?;
            debug!("{} registered with game ID {}", user_id, game_id);

            Ok(Reply::RegisterCreated {
                game_id: game_id.clone(),
            })
        }
    }
}
