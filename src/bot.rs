//! Bot wiring.
//!
//! [`Bot`] connects the Matrix account and builds the [`Dispatcher`] from the
//! configuration. Every incoming text message is then handled in its own
//! task.
//!
//! # Message Flow
//!
//! ```text
//! Matrix sync → MatrixEvent → Dispatcher::execute → handler → reply
//! ```
//!
//! # Data Directory
//!
//! - `session/` - Matrix login session and SDK store
//! - `store.json` - battle rosters and the attack reset timestamp

use std::sync::Arc;

use log::{error, info};

use crate::{
    Args,
    commands::{
        Dispatcher, DispatcherConfig, Services,
        command_table::{CommandRegistry, CommandTable},
        reply::Templates,
    },
    config::{Aliases, Config},
    ledger::{SheetsCredentials, SheetsLedger},
    matrix::{MatrixClient, MatrixEvent, UserCredentials},
    store::FileSessionStore,
    utils::get_path,
};

type BotDispatcher = Dispatcher<SheetsLedger, FileSessionStore>;

pub struct Bot {
    matrix_client: MatrixClient,
    dispatcher: Arc<BotDispatcher>,
}

/// Builds the alias tables: the standard one everywhere, the multi-boss one
/// in the yuzu group when there is one.
fn build_registry(yuzu_group_id: Option<&str>, aliases: &Aliases) -> CommandRegistry {
    let mut default = CommandTable::standard();
    default.extend(&aliases.default);
    let registry = CommandRegistry::new(default);

    match yuzu_group_id {
        Some(group_id) => {
            let mut yuzu = CommandTable::multi_boss();
            yuzu.extend(&aliases.yuzu);
            registry.with_context(group_id, yuzu)
        }
        None => registry,
    }
}

fn dispatcher_config(config: &Config) -> DispatcherConfig {
    let mut group_ids = vec![config.group_id.clone()];
    group_ids.extend(config.yuzu_group_id.clone());

    DispatcherConfig {
        admin_id: config.admin_id.clone(),
        group_ids,
        admin_mode: config.admin_mode,
        group_mode: config.group_mode,
    }
}

impl Bot {
    /// Connects to Matrix and prepares the command dispatcher.
    ///
    /// # Errors
    ///
    /// Fails if the Matrix account can't be logged in or restored.
    pub async fn new(config: Config, args: Args) -> anyhow::Result<Self> {
        let matrix_client = MatrixClient::connect(
            &UserCredentials {
                user_id: config.matrix.user_id.clone(),
                password: config.matrix.password.clone(),
                passphrase: config.matrix.passphrase.clone(),
            },
            &get_path(&args.data_path, "session"),
        )
        .await?;

        let ledger = SheetsLedger::new(
            &config.sheets.api_url,
            &config.sheets.token_url,
            &config.sheets.spreadsheet_id,
            SheetsCredentials {
                client_id: config.sheets.client_id.clone(),
                client_secret: config.sheets.client_secret.clone(),
                refresh_token: config.sheets.refresh_token.clone(),
            },
        );
        let store = FileSessionStore::new(get_path(&args.data_path, "store.json"));

        let dispatcher = Dispatcher::new(
            dispatcher_config(&config),
            build_registry(config.yuzu_group_id.as_deref(), &config.aliases),
            Templates::new(&config.templates),
            Services::new(Arc::new(ledger), Arc::new(store)),
        );

        Ok(Bot {
            matrix_client,
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Handles messages until the Matrix sync loop fails.
    pub async fn start(self) -> anyhow::Result<()> {
        let dispatcher = self.dispatcher;
        info!(
            "listening for commands (admin mode: {}, group mode: {})",
            dispatcher.admin_mode().await,
            dispatcher.group_mode().await
        );

        let on_message = move |event: MatrixEvent, body: String| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                handle_matrix_message(&dispatcher, event, body).await;
            });
        };

        self.matrix_client.sync(on_message).await
    }
}

async fn handle_matrix_message(dispatcher: &BotDispatcher, event: MatrixEvent, body: String) {
    if let Err(e) = dispatcher.execute(&event, &body).await {
        error!("failed to handle message {:?}: {:?}", body, e);
    }
}
