//! Persistence of the Matrix login session.
//!
//! The session directory holds two entries:
//! - `session` - JSON with the login tokens and the last sync token
//! - `sqlite` - the SDK state store
//!
//! A missing or unreadable `session` file means the bot has to log in again.

use std::path::Path;

use log::{debug, trace, warn};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::utils::get_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    user_session: matrix::MatrixSession,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Login session and sync position of the bot account.
#[derive(Clone)]
pub struct SessionFiles {
    stored: Option<StoredSession>,
    sqlite_path: String,
    session_path: String,
}

impl SessionFiles {
    /// Reads the session stored under `dir_path`, creating the directory if needed.
    pub async fn load(dir_path: &str) -> anyhow::Result<Self> {
        debug!("reading matrix session in {}", dir_path);
        fs::create_dir_all(dir_path).await?;

        let sqlite_path = get_path(dir_path, "sqlite");
        let session_path = get_path(dir_path, "session");

        let stored = match read_session(&session_path).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("ignoring unreadable session file {}: {}", session_path, e);
                None
            }
        };
        debug!("stored session found: {}", stored.is_some());

        Ok(SessionFiles {
            stored,
            sqlite_path,
            session_path,
        })
    }

    pub fn sqlite_path(&self) -> &str {
        &self.sqlite_path
    }

    /// The login session to restore, if any.
    pub fn user_session(&self) -> Option<&matrix::MatrixSession> {
        self.stored.as_ref().map(|s| &s.user_session)
    }

    pub fn sync_token(&self) -> Option<String> {
        self.stored.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Writes a fresh login session, dropping any previous sync token.
    pub async fn persist_user_session(
        &self,
        user_session: &matrix::MatrixSession,
    ) -> anyhow::Result<()> {
        trace!("persisting user session");

        let stored = StoredSession {
            user_session: user_session.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;

        Ok(())
    }

    /// Records the sync position in the session file.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persisting sync token {}", sync_token);

        let Some(mut stored) = read_session(&self.session_path).await? else {
            anyhow::bail!("no session file at {}", self.session_path);
        };
        stored.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;

        Ok(())
    }
}

async fn read_session(session_path: &str) -> anyhow::Result<Option<StoredSession>> {
    if !Path::new(session_path).exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(session_path).await?;
    Ok(Some(serde_json::from_str(&data)?))
}
