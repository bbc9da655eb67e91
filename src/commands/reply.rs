//! Handler outcomes and their textual templates.
//!
//! Every handler outcome is a [`Reply`] variant carrying its own arguments.
//! Each variant maps to a [`ReplyCode`], and every code has a default
//! template, so a missing mapping is a compile error rather than a silently
//! dropped reply. Deployments may override templates per code.

use std::collections::HashMap;

use log::{debug, warn};

use crate::templater::render;

/// Stable identifiers of reply templates, as used in configuration.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ReplyCode {
    Help,
    RegisterCreated,
    RegisterChanged,
    DamageRecorded,
    AttackRecorded,
    BattleEntered,
    BattleUpdated,
    BattleStatus,
    BattleStatusEmpty,
    BattleReset,
    BossEntered,
    BossUpdated,
    BossReset,
    BloodType,
    RollDiceResult,
    WakeUp,
    ErrMissingGameId,
    ErrInvalidDamage,
    ErrNotRegistered,
    ErrNotInLedger,
    ErrDayNotFound,
    ErrInvalidAttackType,
    ErrAlreadyEntered,
    ErrMissingComment,
    ErrInvalidBossNum,
    ErrInvalidDice,
}

impl ReplyCode {
    pub const ALL: [ReplyCode; 26] = [
        ReplyCode::Help,
        ReplyCode::RegisterCreated,
        ReplyCode::RegisterChanged,
        ReplyCode::DamageRecorded,
        ReplyCode::AttackRecorded,
        ReplyCode::BattleEntered,
        ReplyCode::BattleUpdated,
        ReplyCode::BattleStatus,
        ReplyCode::BattleStatusEmpty,
        ReplyCode::BattleReset,
        ReplyCode::BossEntered,
        ReplyCode::BossUpdated,
        ReplyCode::BossReset,
        ReplyCode::BloodType,
        ReplyCode::RollDiceResult,
        ReplyCode::WakeUp,
        ReplyCode::ErrMissingGameId,
        ReplyCode::ErrInvalidDamage,
        ReplyCode::ErrNotRegistered,
        ReplyCode::ErrNotInLedger,
        ReplyCode::ErrDayNotFound,
        ReplyCode::ErrInvalidAttackType,
        ReplyCode::ErrAlreadyEntered,
        ReplyCode::ErrMissingComment,
        ReplyCode::ErrInvalidBossNum,
        ReplyCode::ErrInvalidDice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyCode::Help => "REPLY_HELP",
            ReplyCode::RegisterCreated => "REPLY_REGISTER_CREATED",
            ReplyCode::RegisterChanged => "REPLY_REGISTER_CHANGED",
            ReplyCode::DamageRecorded => "REPLY_DAMAGE_RECORDED",
            ReplyCode::AttackRecorded => "REPLY_ATTACK_RECORDED",
            ReplyCode::BattleEntered => "REPLY_BATTLE_ENTERED",
            ReplyCode::BattleUpdated => "REPLY_BATTLE_UPDATED",
            ReplyCode::BattleStatus => "REPLY_BATTLE_STATUS",
            ReplyCode::BattleStatusEmpty => "REPLY_BATTLE_STATUS_EMPTY",
            ReplyCode::BattleReset => "REPLY_BATTLE_RESET",
            ReplyCode::BossEntered => "REPLY_BOSS_ENTERED",
            ReplyCode::BossUpdated => "REPLY_BOSS_UPDATED",
            ReplyCode::BossReset => "REPLY_BOSS_RESET",
            ReplyCode::BloodType => "REPLY_BLOOD_TYPE",
            ReplyCode::RollDiceResult => "REPLY_ROLL_DICE_RESULT",
            ReplyCode::WakeUp => "REPLY_WAKE_UP",
            ReplyCode::ErrMissingGameId => "ERR_MISSING_GAME_ID",
            ReplyCode::ErrInvalidDamage => "ERR_INVALID_DAMAGE",
            ReplyCode::ErrNotRegistered => "ERR_NOT_REGISTERED",
            ReplyCode::ErrNotInLedger => "ERR_NOT_IN_LEDGER",
            ReplyCode::ErrDayNotFound => "ERR_DAY_NOT_FOUND",
            ReplyCode::ErrInvalidAttackType => "ERR_INVALID_ATTACK_TYPE",
            ReplyCode::ErrAlreadyEntered => "ERR_ALREADY_ENTERED",
            ReplyCode::ErrMissingComment => "ERR_MISSING_COMMENT",
            ReplyCode::ErrInvalidBossNum => "ERR_INVALID_BOSS_NUM",
            ReplyCode::ErrInvalidDice => "ERR_INVALID_DICE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ReplyCode::ALL.into_iter().find(|c| c.as_str() == code)
    }

    fn default_template(&self) -> &'static str {
        match self {
            ReplyCode::Help => "Commands:\n{{commands}}",
            ReplyCode::RegisterCreated => "Registered with game ID {{gameId}}.",
            ReplyCode::RegisterChanged => "Game ID changed from {{previous}} to {{gameId}}.",
            ReplyCode::DamageRecorded => "Recorded {{damage}} damage for {{gameId}} on {{day}}.",
            ReplyCode::AttackRecorded => "{{gameId}}: {{kind}} x{{count}} today.",
            ReplyCode::BattleEntered => "{{name}} entered the battle.",
            ReplyCode::BattleUpdated => "{{name}}: {{status}}",
            ReplyCode::BattleStatus => "Battle status:\n{{status}}",
            ReplyCode::BattleStatusEmpty => "Nobody is in the battle.",
            ReplyCode::BattleReset => "Battle status cleared.",
            ReplyCode::BossEntered => "{{name}} entered boss {{bossNum}}.",
            ReplyCode::BossUpdated => "{{name}} on boss {{bossNum}}: {{status}}",
            ReplyCode::BossReset => "Battle status cleared for {{scope}}.",
            ReplyCode::BloodType => "{{name}} pulled {{threeStars}} three-star and {{twoStars}} two-star: {{blood}}!",
            ReplyCode::RollDiceResult => "{{dice}}: {{result}}",
            ReplyCode::WakeUp => "I'm up, I'm up...",
            ReplyCode::ErrMissingGameId => "Usage: !id <game ID>",
            ReplyCode::ErrInvalidDamage => "{{value}} is not a valid damage value.",
            ReplyCode::ErrNotRegistered => "You are not registered yet, use !id <game ID> first.",
            ReplyCode::ErrNotInLedger => "{{gameId}} is not listed in the {{ledger}} sheet.",
            ReplyCode::ErrDayNotFound => "The damage sheet has no column for {{day}}.",
            ReplyCode::ErrInvalidAttackType => "Unknown attack type {{kind}}, expected one of: {{types}}",
            ReplyCode::ErrAlreadyEntered => "{{name}} is already in the battle.",
            ReplyCode::ErrMissingComment => "Usage: !update <status>",
            ReplyCode::ErrInvalidBossNum => "{{value}} is not a valid boss number.",
            ReplyCode::ErrInvalidDice => "{{value}} is not a valid roll, use NdM like 2d6.",
        }
    }
}

/// Outcome of a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Help { commands: String },
    RegisterCreated { game_id: String },
    RegisterChanged { previous: String, game_id: String },
    DamageRecorded { game_id: String, damage: u64, day: String },
    AttackRecorded { game_id: String, kind: String, count: u64 },
    BattleEntered { name: String },
    BattleUpdated { name: String, status: String },
    BattleStatus { status: String },
    BattleStatusEmpty,
    BattleReset,
    BossEntered { name: String, boss_num: u64 },
    BossUpdated { name: String, boss_num: u64, status: String },
    /// `boss_num` is `None` when every boss was cleared
    BossReset { boss_num: Option<u64> },
    BloodType { name: String, blood: String, three_stars: usize, two_stars: usize },
    RollDiceResult { dice: String, result: u64 },
    WakeUp,
    ErrMissingGameId,
    ErrInvalidDamage { value: String },
    ErrNotRegistered,
    ErrNotInLedger { game_id: String, ledger: String },
    ErrDayNotFound { day: String },
    ErrInvalidAttackType { kind: String, types: Vec<String> },
    ErrAlreadyEntered { name: String },
    ErrMissingComment,
    ErrInvalidBossNum { value: String },
    ErrInvalidDice { value: String },
}

impl Reply {
    pub fn code(&self) -> ReplyCode {
        match self {
            Reply::Help { .. } => ReplyCode::Help,
            Reply::RegisterCreated { .. } => ReplyCode::RegisterCreated,
            Reply::RegisterChanged { .. } => ReplyCode::RegisterChanged,
            Reply::DamageRecorded { .. } => ReplyCode::DamageRecorded,
            Reply::AttackRecorded { .. } => ReplyCode::AttackRecorded,
            Reply::BattleEntered { .. } => ReplyCode::BattleEntered,
            Reply::BattleUpdated { .. } => ReplyCode::BattleUpdated,
            Reply::BattleStatus { .. } => ReplyCode::BattleStatus,
            Reply::BattleStatusEmpty => ReplyCode::BattleStatusEmpty,
            Reply::BattleReset => ReplyCode::BattleReset,
            Reply::BossEntered { .. } => ReplyCode::BossEntered,
            Reply::BossUpdated { .. } => ReplyCode::BossUpdated,
            Reply::BossReset { .. } => ReplyCode::BossReset,
            Reply::BloodType { .. } => ReplyCode::BloodType,
            Reply::RollDiceResult { .. } => ReplyCode::RollDiceResult,
            Reply::WakeUp => ReplyCode::WakeUp,
            Reply::ErrMissingGameId => ReplyCode::ErrMissingGameId,
            Reply::ErrInvalidDamage { .. } => ReplyCode::ErrInvalidDamage,
            Reply::ErrNotRegistered => ReplyCode::ErrNotRegistered,
            Reply::ErrNotInLedger { .. } => ReplyCode::ErrNotInLedger,
            Reply::ErrDayNotFound { .. } => ReplyCode::ErrDayNotFound,
            Reply::ErrInvalidAttackType { .. } => ReplyCode::ErrInvalidAttackType,
            Reply::ErrAlreadyEntered { .. } => ReplyCode::ErrAlreadyEntered,
            Reply::ErrMissingComment => ReplyCode::ErrMissingComment,
            Reply::ErrInvalidBossNum { .. } => ReplyCode::ErrInvalidBossNum,
            Reply::ErrInvalidDice { .. } => ReplyCode::ErrInvalidDice,
        }
    }

    /// Template arguments, keyed by placeholder name.
    pub fn args(&self) -> HashMap<&'static str, String> {
        match self {
            Reply::Help { commands } => HashMap::from([("commands", commands.clone())]),
            Reply::RegisterCreated { game_id } => HashMap::from([("gameId", game_id.clone())]),
            Reply::RegisterChanged { previous, game_id } => HashMap::from([
                ("previous", previous.clone()),
                ("gameId", game_id.clone()),
            ]),
            Reply::DamageRecorded {
                game_id,
                damage,
                day,
            } => HashMap::from([
                ("gameId", game_id.clone()),
                ("damage", damage.to_string()),
                ("day", day.clone()),
            ]),
            Reply::AttackRecorded {
                game_id,
                kind,
                count,
            } => HashMap::from([
                ("gameId", game_id.clone()),
                ("kind", kind.clone()),
                ("count", count.to_string()),
            ]),
            Reply::BattleEntered { name } | Reply::ErrAlreadyEntered { name } => {
                HashMap::from([("name", name.clone())])
            }
            Reply::BattleUpdated { name, status } => {
                HashMap::from([("name", name.clone()), ("status", status.clone())])
            }
            Reply::BattleStatus { status } => HashMap::from([("status", status.clone())]),
            Reply::BossEntered { name, boss_num } => HashMap::from([
                ("name", name.clone()),
                ("bossNum", boss_num.to_string()),
            ]),
            Reply::BossUpdated {
                name,
                boss_num,
                status,
            } => HashMap::from([
                ("name", name.clone()),
                ("bossNum", boss_num.to_string()),
                ("status", status.clone()),
            ]),
            Reply::BossReset { boss_num } => {
                let scope = match boss_num {
                    Some(n) => format!("boss {}", n),
                    None => "every boss".to_owned(),
                };
                HashMap::from([
                    ("bossNum", boss_num.map(|n| n.to_string()).unwrap_or_default()),
                    ("scope", scope),
                ])
            }
            Reply::BloodType {
                name,
                blood,
                three_stars,
                two_stars,
            } => HashMap::from([
                ("name", name.clone()),
                ("blood", blood.clone()),
                ("threeStars", three_stars.to_string()),
                ("twoStars", two_stars.to_string()),
            ]),
            Reply::RollDiceResult { dice, result } => {
                HashMap::from([("dice", dice.clone()), ("result", result.to_string())])
            }
            Reply::ErrInvalidDamage { value }
            | Reply::ErrInvalidBossNum { value }
            | Reply::ErrInvalidDice { value } => HashMap::from([("value", value.clone())]),
            Reply::ErrNotInLedger { game_id, ledger } => {
                HashMap::from([("gameId", game_id.clone()), ("ledger", ledger.clone())])
            }
            Reply::ErrDayNotFound { day } => HashMap::from([("day", day.clone())]),
            Reply::ErrInvalidAttackType { kind, types } => {
                HashMap::from([("kind", kind.clone()), ("types", types.join(", "))])
            }
            Reply::BattleStatusEmpty
            | Reply::BattleReset
            | Reply::WakeUp
            | Reply::ErrMissingGameId
            | Reply::ErrNotRegistered
            | Reply::ErrMissingComment => HashMap::new(),
        }
    }
}

/// Reply template table, fixed after construction.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    overrides: HashMap<ReplyCode, String>,
}

impl Templates {
    /// Builds the table from `code → template` overrides.
    ///
    /// Unknown codes are logged and ignored.
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .filter_map(|(code, template)| match ReplyCode::from_code(code) {
                Some(reply_code) => Some((reply_code, template.to_owned())),
                None => {
                    warn!("ignoring template for unknown reply code {}", code);
                    None
                }
            })
            .collect();

        Templates { overrides }
    }

    pub fn template(&self, code: ReplyCode) -> &str {
        self.overrides
            .get(&code)
            .map(String::as_str)
            .unwrap_or_else(|| code.default_template())
    }

    /// Renders `reply` with its template.
    pub fn render(&self, reply: &Reply) -> String {
        let code = reply.code();
        debug!("rendering reply {}", code.as_str());
        render(self.template(code), &reply.args())
    }
}
