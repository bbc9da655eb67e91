//! Alias tables.
//!
//! A [`CommandTable`] maps the short aliases users type to canonical
//! [`Action`]s. A [`CommandRegistry`] holds the default table plus tables for
//! specific groups, so one bot can expose different vocabularies to
//! different rooms while sharing the handlers.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::commands::command::Action;

const DEFAULT_ALIASES: &[(&str, Action)] = &[
    ("help", Action::Help),
    ("h", Action::Help),
    ("id", Action::Register),
    ("register", Action::Register),
    ("dmg", Action::Damage),
    ("damage", Action::Damage),
    ("atk", Action::Attack),
    ("attack", Action::Attack),
    ("in", Action::BattleIn),
    ("update", Action::BattleUpdate),
    ("up", Action::BattleUpdate),
    ("status", Action::BattleStatus),
    ("st", Action::BattleStatus),
    ("reset", Action::BattleReset),
    ("blood", Action::BloodType),
    ("roll", Action::Roll),
    ("dice", Action::Roll),
    ("wake", Action::WakeUp),
    ("wakeup", Action::WakeUp),
];

/// Aliases the multi-boss variant redirects to the boss-numbered actions.
const BOSS_ALIASES: &[(&str, Action)] = &[
    ("in", Action::BossIn),
    ("update", Action::BossUpdate),
    ("up", Action::BossUpdate),
    ("status", Action::BossStatus),
    ("st", Action::BossStatus),
    ("reset", Action::BossReset),
];

/// Alias to action mapping for one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    aliases: BTreeMap<String, Action>,
}

impl CommandTable {
    /// Creates a table from `(alias, action)` pairs. Later pairs win.
    pub fn new<'a>(aliases: impl IntoIterator<Item = (&'a str, Action)>) -> Self {
        CommandTable {
            aliases: aliases
                .into_iter()
                .map(|(alias, action)| (alias.to_owned(), action))
                .collect(),
        }
    }

    /// The vocabulary shared by every group.
    pub fn standard() -> Self {
        CommandTable::new(DEFAULT_ALIASES.iter().copied())
    }

    /// The standard vocabulary with battle commands taking a boss number.
    pub fn multi_boss() -> Self {
        CommandTable::new(DEFAULT_ALIASES.iter().chain(BOSS_ALIASES).copied())
    }

    /// Adds or replaces aliases.
    pub fn extend(&mut self, aliases: &HashMap<String, Action>) {
        for (alias, action) in aliases {
            self.aliases.insert(alias.to_owned(), *action);
        }
    }

    pub fn resolve(&self, alias: &str) -> Option<Action> {
        self.aliases.get(alias).copied()
    }

    /// Lists aliases grouped by action, one action per line, e.g. `roll, dice`.
    pub fn describe(&self) -> String {
        let mut by_action: Vec<(Action, Vec<&str>)> = Vec::new();

        for (alias, action) in &self.aliases {
            let position = by_action.iter().position(|(a, _)| a == action);
            match position {
                Some(i) => by_action[i].1.push(alias.as_str()),
                None => by_action.push((*action, vec![alias.as_str()])),
            }
        }

        by_action
            .iter()
            .map(|(_, aliases)| aliases.join(", "))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

/// Selects a [`CommandTable`] from the message's originating group.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    default: CommandTable,
    contexts: HashMap<String, CommandTable>,
}

impl CommandRegistry {
    pub fn new(default: CommandTable) -> Self {
        CommandRegistry {
            default,
            contexts: HashMap::new(),
        }
    }

    /// Uses `table` for messages coming from `group_id`.
    pub fn with_context(mut self, group_id: &str, table: CommandTable) -> Self {
        self.contexts.insert(group_id.to_owned(), table);
        self
    }

    /// Returns the table for `group_id`, falling back to the default one.
    pub fn table_for(&self, group_id: Option<&str>) -> &CommandTable {
        group_id
            .and_then(|id| self.contexts.get(id))
            .unwrap_or(&self.default)
    }

    /// Resolves `alias` in the context of `group_id`.
    pub fn resolve(&self, alias: &str, group_id: Option<&str>) -> Option<Action> {
        let action = self.table_for(group_id).resolve(alias);
        debug!("resolved alias {} in {:?} to {:?}", alias, group_id, action);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_resolves_aliases() {
        let table = CommandTable::standard();
        assert_eq!(table.resolve("in"), Some(Action::BattleIn));
        assert_eq!(table.resolve("atk"), Some(Action::Attack));
        assert_eq!(table.resolve("roll"), Some(Action::Roll));
        assert_eq!(table.resolve("dice"), Some(Action::Roll));
        assert_eq!(table.resolve("nope"), None);
    }

    #[test]
    fn test_multi_boss_table_overrides_battle_aliases() {
        let table = CommandTable::multi_boss();
        assert_eq!(table.resolve("in"), Some(Action::BossIn));
        assert_eq!(table.resolve("up"), Some(Action::BossUpdate));
        assert_eq!(table.resolve("status"), Some(Action::BossStatus));
        assert_eq!(table.resolve("reset"), Some(Action::BossReset));
        // Everything else is shared
        assert_eq!(table.resolve("dmg"), Some(Action::Damage));
        assert_eq!(table.resolve("roll"), Some(Action::Roll));
    }

    #[test]
    fn test_extend_adds_and_replaces() {
        let mut table = CommandTable::standard();
        table.extend(&HashMap::from([
            ("r".to_string(), Action::Roll),
            ("in".to_string(), Action::WakeUp),
        ]));

        assert_eq!(table.resolve("r"), Some(Action::Roll));
        assert_eq!(table.resolve("in"), Some(Action::WakeUp));
    }

    #[test]
    fn test_describe_groups_aliases_by_action() {
        let table = CommandTable::new([
            ("roll", Action::Roll),
            ("dice", Action::Roll),
            ("in", Action::BattleIn),
        ]);

        let description = table.describe();
        let lines: Vec<&str> = description.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"dice, roll"));
        assert!(lines.contains(&"in"));
    }

    #[test]
    fn test_registry_selects_table_by_group() {
        let registry = CommandRegistry::new(CommandTable::standard())
            .with_context("!yuzu:example.org", CommandTable::multi_boss());

        assert_eq!(
            registry.resolve("in", Some("!yuzu:example.org")),
            Some(Action::BossIn)
        );
        assert_eq!(
            registry.resolve("in", Some("!clan:example.org")),
            Some(Action::BattleIn)
        );
        assert_eq!(registry.resolve("in", None), Some(Action::BattleIn));
    }
}
