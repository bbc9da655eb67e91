//! Attack contribution command handler.
//!
//! The `attack` sheet holds one counter per member and attack type for the
//! current game day. The attack types are the header labels from column B
//! on. Counters are cleared on the first attack recorded after the day
//! boundary.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{
    commands::{CommandContext, Event, Services, reply::Reply},
    ledger::{
        ATTACK_SHEET, Ledger, ROSTER_RANGE, cell, find_entry_row, find_header_column, game_id_of,
    },
    store::{ATTACK_LAST_RESET_KEY, SessionStore},
    utils::{column_letter, game_day},
};

/// Whether the counters were last cleared before the game day containing `now`.
fn needs_reset(last_reset: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(last_reset) = last_reset else {
        return true;
    };

    match DateTime::parse_from_rfc3339(last_reset) {
        Ok(last_reset) => game_day(last_reset.with_timezone(&Utc)) != game_day(now),
        Err(e) => {
            warn!("invalid attack reset timestamp {}: {}", last_reset, e);
            true
        }
    }
}

/// Adds one attack of the given type to the sender's counter for today.
///
/// # Returns
///
/// - [`Reply::ErrNotRegistered`] when the sender has no game ID
/// - [`Reply::ErrInvalidAttackType`] when the type is not a header label
/// - [`Reply::ErrNotInLedger`] when the game ID has no row in the attack sheet
/// - [`Reply::AttackRecorded`] with the new count otherwise
pub async fn handle_attack<E: Event, L: Ledger, S: SessionStore>(
    context: &CommandContext<'_, E>,
    services: &Services<L, S>,
    now: DateTime<Utc>,
) -> anyhow::Result<Reply> {
    debug!("handling attack command: {:?}", context.params);

    let kind = context.params.first().map(String::as_str).unwrap_or("");

    let (roster, ledger, last_reset) = futures::try_join!(
        services.ledger.get(ROSTER_RANGE),
        services.ledger.get(ATTACK_SHEET),
        services.store.get(ATTACK_LAST_RESET_KEY)
    )?;

    let Some(game_id) = game_id_of(&roster, &context.source.user_id) else {
        return Ok(Reply::ErrNotRegistered);
    };

    let column = find_header_column(&ledger, kind).filter(|_| !kind.is_empty());
    let Some(column) = column else {
        let types = ledger
            .first()
            .map(|header| {
                header
                    .iter()
                    .skip(1)
                    .filter(|label| !label.is_empty())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        return Ok(Reply::ErrInvalidAttackType {
            kind: kind.to_owned(),
            types,
        });
    };

    let Some(row) = find_entry_row(&ledger, game_id) else {
        return Ok(Reply::ErrNotInLedger {
            game_id: game_id.to_owned(),
            ledger: ATTACK_SHEET.to_owned(),
        });
    };

    let previous = if needs_reset(last_reset.as_deref(), now) {
        let last_column = ledger.first().map_or(1, Vec::len).saturating_sub(1);
        let range = format!(
            "{}!B2:{}{}",
            ATTACK_SHEET,
            column_letter(last_column),
            ledger.len()
        );

        services.ledger.clear(&range).await?;
        services
            .store
            .set(ATTACK_LAST_RESET_KEY, &now.to_rfc3339())
            .await?;
        info!("daily attack reset, cleared {}", range);

        0
    } else {
        cell(&ledger, row, column).parse::<u64>().unwrap_or(0)
    };

    let count = previous + 1;
    let range = format!("{}!{}{}", ATTACK_SHEET, column_letter(column), row + 1);
    services
        .ledger
        .update(&range, vec![vec![count.to_string()]])
        .await?;
    debug!("{} {} attacks for {} at {}", count, kind, game_id, range);

    Ok(Reply::AttackRecorded {
        game_id: game_id.to_owned(),
        kind: kind.to_owned(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        commands::actions::test_helpers::{Fixture, rows, services_with_store},
        ledger::MockLedger,
        store::MockSessionStore,
    };

    const ROSTER: &[&[&str]] = &[&["u1", "Kyaru", "kyaru01"], &["u2", "Pecorine", "peco02"]];
    const ATTACK: &[&[&str]] = &[
        &["gameId", "full", "carry", "lasthit"],
        &["kyaru01", "1", "", "2"],
        &["kokkoro03"],
    ];

    /// 2024-03-11 12:00 UTC, game day 3/11.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap()
    }

    fn ledger() -> MockLedger {
        let mut ledger = MockLedger::new();
        ledger
            .expect_get()
            .with(eq(ROSTER_RANGE))
            .returning(|_| Ok(rows(ROSTER)));
        ledger
            .expect_get()
            .with(eq(ATTACK_SHEET))
            .returning(|_| Ok(rows(ATTACK)));
        ledger
    }

    fn store_with_last_reset(last_reset: Option<&'static str>) -> MockSessionStore {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .with(eq(ATTACK_LAST_RESET_KEY))
            .returning(move |_| Ok(last_reset.map(str::to_owned)));
        store
    }

    #[test]
    fn test_needs_reset_follows_game_day() {
        // 20:59 UTC on 3/10 is still 3/10 in UTC+3, 21:00 is 3/11
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 21, 0, 0).unwrap();

        assert!(needs_reset(None, now));
        assert!(needs_reset(Some("2024-03-10T20:59:00+00:00"), now));
        assert!(!needs_reset(Some("2024-03-10T21:00:00+00:00"), now));
        assert!(!needs_reset(Some("2024-03-11T20:00:00Z"), now));
        assert!(needs_reset(Some("yesterday"), now));
    }

    #[tokio::test]
    async fn test_increments_counter_on_same_day() {
        let fixture = Fixture::new("u1", "Kyaru", &["lasthit"]);
        let mut ledger = ledger();
        ledger
            .expect_update()
            .withf(|range, rows| range == "attack!D2" && *rows == vec![vec!["3"]])
            .times(1)
            .returning(|_, _| Ok(()));
        ledger.expect_clear().never();
        let store = store_with_last_reset(Some("2024-03-11T01:00:00+00:00"));

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger, store), now())
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::AttackRecorded {
                game_id: "kyaru01".to_string(),
                kind: "lasthit".to_string(),
                count: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_cell_counts_as_zero() {
        let fixture = Fixture::new("u1", "Kyaru", &["carry"]);
        let mut ledger = ledger();
        ledger
            .expect_update()
            .withf(|range, rows| range == "attack!C2" && *rows == vec![vec!["1"]])
            .times(1)
            .returning(|_, _| Ok(()));
        let store = store_with_last_reset(Some("2024-03-11T01:00:00+00:00"));

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger, store), now())
            .await
            .unwrap();

        assert!(matches!(reply, Reply::AttackRecorded { count: 1, .. }));
    }

    #[tokio::test]
    async fn test_first_attack_of_the_day_resets_counters() {
        let fixture = Fixture::new("u1", "Kyaru", &["full"]);
        let mut ledger = ledger();
        ledger
            .expect_clear()
            .with(eq("attack!B2:D3"))
            .times(1)
            .returning(|_| Ok(()));
        ledger
            .expect_update()
            .withf(|range, rows| range == "attack!B2" && *rows == vec![vec!["1"]])
            .times(1)
            .returning(|_, _| Ok(()));

        let mut store = store_with_last_reset(Some("2024-03-10T12:00:00+00:00"));
        store
            .expect_set()
            .withf(|key, value| {
                key == ATTACK_LAST_RESET_KEY && value == "2024-03-11T12:00:00+00:00"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger, store), now())
            .await
            .unwrap();

        assert!(matches!(reply, Reply::AttackRecorded { count: 1, .. }));
    }

    #[tokio::test]
    async fn test_unknown_type_lists_known_types() {
        let fixture = Fixture::new("u1", "Kyaru", &["magic"]);
        let store = store_with_last_reset(None);

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger(), store), now())
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::ErrInvalidAttackType {
                kind: "magic".to_string(),
                types: vec![
                    "full".to_string(),
                    "carry".to_string(),
                    "lasthit".to_string()
                ],
            }
        );
    }

    #[tokio::test]
    async fn test_unregistered_sender_checked_before_type() {
        let fixture = Fixture::new("u9", "Stranger", &["magic"]);
        let store = store_with_last_reset(None);

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger(), store), now())
            .await
            .unwrap();

        assert_eq!(reply, Reply::ErrNotRegistered);
    }

    #[tokio::test]
    async fn test_game_id_missing_from_attack_sheet() {
        let fixture = Fixture::new("u2", "Pecorine", &["full"]);
        let store = store_with_last_reset(None);

        let reply = handle_attack(&fixture.context(), &services_with_store(ledger(), store), now())
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::ErrNotInLedger {
                game_id: "peco02".to_string(),
                ledger: "attack".to_string(),
            }
        );
    }
}
