//! Spreadsheet ledger.
//!
//! The clan's data lives in one spreadsheet with three sheets:
//!
//! - `idList`: the roster, one row per member as `[userId, displayName, gameId]`
//! - `damage`: a header row of day labels (`M/D`) from column B, game IDs in column A
//! - `attack`: a header row of attack types from column B, game IDs in column A
//!
//! Handlers talk to it through the [`Ledger`] trait, implemented over the
//! Google Sheets v4 API by [`SheetsLedger`].

use mockall::automock;

mod response_structs;
mod sheets;

pub use crate::ledger::sheets::{SheetsCredentials, SheetsLedger};

/// Sheet holding the roster.
pub const ROSTER_SHEET: &str = "idList";
/// Range the roster is read from.
pub const ROSTER_RANGE: &str = "idList!A1:C99";
/// Sheet holding daily damage totals.
pub const DAMAGE_SHEET: &str = "damage";
/// Sheet holding daily attack counts.
pub const ATTACK_SHEET: &str = "attack";

/// Column of the game ID in a roster row.
pub const ROSTER_GAME_ID_COLUMN: usize = 2;

/// Access to two-dimensional cell ranges addressed in A1 notation.
#[automock]
pub trait Ledger {
    /// Reads the cells of `range`, row by row. Trailing empty cells are omitted.
    async fn get(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>>;
    /// Appends `rows` after the last row of `range`.
    async fn append(&self, range: &str, rows: Vec<Vec<String>>) -> anyhow::Result<()>;
    /// Overwrites `range` with `rows`.
    async fn update(&self, range: &str, rows: Vec<Vec<String>>) -> anyhow::Result<()>;
    /// Empties every cell of `range`.
    async fn clear(&self, range: &str) -> anyhow::Result<()>;
}

/// Returns the zero-based index of the first row whose column A is `key`.
pub fn find_row(rows: &[Vec<String>], key: &str) -> Option<usize> {
    rows.iter()
        .position(|row| row.first().is_some_and(|first| first == key))
}

/// Returns the zero-based index of the first row below the header whose column A is `key`.
pub fn find_entry_row(rows: &[Vec<String>], key: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.first().is_some_and(|first| first == key))
        .map(|(index, _)| index)
}

/// Returns the zero-based index of the header column labelled `label`, ignoring column A.
pub fn find_header_column(rows: &[Vec<String>], label: &str) -> Option<usize> {
    rows.first()?
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, cell)| cell.as_str() == label)
        .map(|(index, _)| index)
}

/// Returns the cell at `row`/`column`, or `""` when the sheet left it out.
pub fn cell(rows: &[Vec<String>], row: usize, column: usize) -> &str {
    rows.get(row)
        .and_then(|cells| cells.get(column))
        .map(String::as_str)
        .unwrap_or("")
}

/// Returns the game ID registered for `user_id` in the roster, if any.
pub fn game_id_of<'a>(roster: &'a [Vec<String>], user_id: &str) -> Option<&'a str> {
    let row = find_row(roster, user_id)?;
    let game_id = cell(roster, row, ROSTER_GAME_ID_COLUMN);
    (!game_id.is_empty()).then_some(game_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Vec<String>> {
        vec![
            vec!["userId".into(), "displayName".into(), "gameId".into()],
            vec!["u1".into(), "Kyaru".into(), "kyaru01".into()],
            vec!["u2".into(), "Pecorine".into()],
            vec!["u1".into(), "Kyaru".into(), "duplicate".into()],
        ]
    }

    #[test]
    fn test_find_row_first_occurrence_wins() {
        assert_eq!(find_row(&roster(), "u1"), Some(1));
        assert_eq!(find_row(&roster(), "u3"), None);
    }

    #[test]
    fn test_find_entry_row_skips_header() {
        let ledger = vec![
            vec!["gameId".to_string()],
            vec!["a".to_string()],
            vec!["gameId".to_string()],
        ];
        assert_eq!(find_entry_row(&ledger, "gameId"), Some(2));
        assert_eq!(find_entry_row(&ledger, "a"), Some(1));
        assert_eq!(find_entry_row(&[], "a"), None);
    }

    #[test]
    fn test_find_header_column_ignores_column_a() {
        let ledger = vec![vec!["3/11".to_string(), "3/10".to_string(), "3/11".to_string()]];
        assert_eq!(find_header_column(&ledger, "3/11"), Some(2));
        assert_eq!(find_header_column(&ledger, "3/12"), None);
        assert_eq!(find_header_column(&[], "3/11"), None);
    }

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let rows = roster();
        assert_eq!(cell(&rows, 1, 2), "kyaru01");
        assert_eq!(cell(&rows, 2, 2), "");
        assert_eq!(cell(&rows, 10, 0), "");
    }

    #[test]
    fn test_game_id_of() {
        let rows = roster();
        assert_eq!(game_id_of(&rows, "u1"), Some("kyaru01"));
        // Row without a game ID counts as unregistered
        assert_eq!(game_id_of(&rows, "u2"), None);
        assert_eq!(game_id_of(&rows, "u3"), None);
    }
}
