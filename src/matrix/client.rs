use anyhow::bail;
use log::{debug, info};
use matrix_sdk::{Client, ruma::OwnedUserId};

use crate::matrix::{
    UserCredentials, event::MatrixEvent, session::SessionFiles, sync::MatrixSync,
};

const DISPLAY_NAME: &str = "clanbot";

/// Logged-in Matrix account of the bot.
pub struct MatrixClient {
    matrix_sync: MatrixSync,
}

impl MatrixClient {
    /// Connects the bot account, storing its session under `session_path`.
    ///
    /// The stored session is restored when there is one, otherwise the bot
    /// logs in with its password and stores the new session.
    ///
    /// # Errors
    ///
    /// Fails when the user ID is malformed, the SDK store can't be opened,
    /// or login or restore is refused by the homeserver.
    pub async fn connect(
        user_credentials: &UserCredentials,
        session_path: &str,
    ) -> anyhow::Result<Self> {
        info!(
            "setting up matrix client for user {}",
            user_credentials.user_id
        );

        let session = SessionFiles::load(session_path).await?;
        let user_id: OwnedUserId = user_credentials.user_id.as_str().try_into()?;

        let client = Client::builder()
            .server_name(user_id.server_name())
            .sqlite_store(
                session.sqlite_path(),
                user_credentials.passphrase.as_deref(),
            )
            .build()
            .await?;
        debug!("matrix client created");

        match session.user_session() {
            Some(user_session) => {
                client.restore_session(user_session.clone()).await?;
                info!("matrix session restored");
            }
            None => {
                client
                    .matrix_auth()
                    .login_username(&user_id, &user_credentials.password)
                    .initial_device_display_name(DISPLAY_NAME)
                    .send()
                    .await?;

                let Some(user_session) = client.matrix_auth().session() else {
                    bail!("no session after login of {}", user_id);
                };
                session.persist_user_session(&user_session).await?;
                info!("logged in as {}", user_id);
            }
        }

        client.account().set_display_name(Some(DISPLAY_NAME)).await?;

        Ok(MatrixClient {
            matrix_sync: MatrixSync::new(&client, &session),
        })
    }

    /// Syncs forever, handing each incoming text message to `on_message`.
    pub async fn sync<F>(&self, on_message: F) -> anyhow::Result<()>
    where
        F: Fn(MatrixEvent, String) + Send + Sync + 'static,
    {
        self.matrix_sync.sync(on_message).await
    }
}
