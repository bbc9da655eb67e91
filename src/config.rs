//! Configuration file structures for the clanbot.
//!
//! The configuration is read from a YAML file and merged with environment
//! variables prefixed with `CLANBOT_`. Nested keys are separated by `__`,
//! e.g. `CLANBOT_MATRIX__PASSWORD` overrides `matrix.password`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Matrix user allowed to toggle the modes, always allowed to run commands
//! admin_id: "@admin:example.org"
//! # Clan room
//! group_id: "!clan:example.org"
//! # Optional room using the multi-boss battle commands
//! yuzu_group_id: "!yuzu:example.org"
//! # Initial modes
//! admin_mode: false
//! group_mode: true
//!
//! matrix:
//!   user_id: "@clanbot:example.org"
//!   password: "secret-password"
//!   # Optional, encrypts the local store
//!   passphrase: "store-passphrase"
//!
//! sheets:
//!   spreadsheet_id: "1AbC..."
//!   client_id: "1234.apps.googleusercontent.com"
//!   client_secret: "secret"
//!   refresh_token: "1//0g..."
//!
//! # Optional reply template overrides, by reply code
//! templates:
//!   REPLY_WAKE_UP: "Good morning!"
//!
//! # Optional extra aliases
//! aliases:
//!   default:
//!     d: Damage
//!   yuzu:
//!     b: BossIn
//! ```

use std::collections::HashMap;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::commands::command::Action;

const ENV_PREFIX: &str = "CLANBOT_";
const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Root configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Matrix user ID of the administrator
    pub admin_id: String,
    /// Room ID of the clan room
    pub group_id: String,
    /// Room ID of the multi-boss room
    #[serde(default)]
    pub yuzu_group_id: Option<String>,
    /// Whether only the administrator may run commands at startup
    #[serde(default)]
    pub admin_mode: bool,
    /// Whether commands are accepted from the configured rooms at startup
    #[serde(default = "default_group_mode")]
    pub group_mode: bool,
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Google Sheets configuration
    pub sheets: Sheets,
    /// Reply template overrides keyed by reply code
    #[serde(default)]
    pub templates: HashMap<String, String>,
    /// Extra aliases
    #[serde(default)]
    pub aliases: Aliases,
}

/// Matrix account configuration.
#[derive(Debug, Deserialize)]
pub struct Matrix {
    /// Fully qualified Matrix user ID, e.g. `@clanbot:example.org`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Only used for the first login, the session is restored afterwards.
    pub password: String,

    /// Passphrase of the local SDK store.
    #[serde(default)]
    pub passphrase: Option<String>,
}

/// Google Sheets access.
///
/// The credentials are those of an OAuth2 client with a long-lived refresh
/// token allowed to edit the spreadsheet.
#[derive(Debug, Deserialize)]
pub struct Sheets {
    pub spreadsheet_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

/// Aliases added to the built-in command tables.
#[derive(Debug, Default, Deserialize)]
pub struct Aliases {
    #[serde(default)]
    pub default: HashMap<String, Action>,
    #[serde(default)]
    pub yuzu: HashMap<String, Action>,
}

fn default_group_mode() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_SHEETS_API_URL.to_owned()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

impl Config {
    /// Loads the YAML file at `path`, then applies the `CLANBOT_` environment overrides.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    const MINIMAL: &str = r#"
admin_id: "@admin:example.org"
group_id: "!clan:example.org"
matrix:
  user_id: "@clanbot:example.org"
  password: "hunter2"
sheets:
  spreadsheet_id: "sheet"
  client_id: "client"
  client_secret: "secret"
  refresh_token: "refresh"
"#;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn load(file: &NamedTempFile) -> Result<Config, figment::Error> {
        Config::load(&file.path().to_string_lossy())
    }

    #[test]
    #[serial]
    fn test_load_minimal_config_applies_defaults() {
        let file = config_file(MINIMAL);

        let config = load(&file).unwrap();

        assert_eq!(config.admin_id, "@admin:example.org");
        assert_eq!(config.group_id, "!clan:example.org");
        assert!(config.yuzu_group_id.is_none());
        assert!(!config.admin_mode);
        assert!(config.group_mode);
        assert!(config.matrix.passphrase.is_none());
        assert_eq!(config.sheets.api_url, "https://sheets.googleapis.com");
        assert_eq!(config.sheets.token_url, "https://oauth2.googleapis.com/token");
        assert!(config.templates.is_empty());
        assert!(config.aliases.default.is_empty());
        assert!(config.aliases.yuzu.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        let content = format!(
            "{MINIMAL}{}",
            r#"
yuzu_group_id: "!yuzu:example.org"
admin_mode: true
group_mode: false
templates:
  REPLY_WAKE_UP: "Good morning!"
aliases:
  default:
    d: Damage
  yuzu:
    b: BossIn
"#
        );
        let file = config_file(&content);

        let config = load(&file).unwrap();

        assert_eq!(config.yuzu_group_id.as_deref(), Some("!yuzu:example.org"));
        assert!(config.admin_mode);
        assert!(!config.group_mode);
        assert_eq!(config.templates["REPLY_WAKE_UP"], "Good morning!");
        assert_eq!(config.aliases.default["d"], Action::Damage);
        assert_eq!(config.aliases.yuzu["b"], Action::BossIn);
    }

    #[test]
    #[serial]
    fn test_unknown_action_is_rejected() {
        let content = format!("{MINIMAL}aliases:\n  default:\n    d: Dance\n");
        let file = config_file(&content);

        assert!(load(&file).is_err());
    }

    #[test]
    #[serial]
    fn test_missing_required_field() {
        let file = config_file("admin_id: \"@admin:example.org\"\n");

        assert!(load(&file).is_err());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = config_file(MINIMAL);

        // SAFETY: serialized with the other tests reading the environment
        unsafe {
            std::env::set_var("CLANBOT_MATRIX__PASSWORD", "from-env");
            std::env::set_var("CLANBOT_GROUP_MODE", "false");
        }
        let config = load(&file);
        unsafe {
            std::env::remove_var("CLANBOT_MATRIX__PASSWORD");
            std::env::remove_var("CLANBOT_GROUP_MODE");
        }

        let config = config.unwrap();
        assert_eq!(config.matrix.password, "from-env");
        assert!(!config.group_mode);
    }
}
