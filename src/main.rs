//! Clanbot - A Matrix bot keeping a clan's battle records.
//!
//! Clan members talk to the bot in their Matrix room. The bot records daily
//! damage and attack contributions in a Google Sheets spreadsheet, tracks
//! who checked in to the current boss battle and offers a few games.
//!
//! # Commands
//!
//! Commands start with `!`, `,` or `！`:
//!
//! - `!help` - List the commands available in the room
//! - `!id <gameId>` - Register or change your game ID
//! - `!dmg <damage>` - Record today's damage
//! - `!atk <type>` - Record an attack contribution
//! - `!in`, `!update <comment>`, `!status`, `!reset` - Boss battle check-in
//! - `!blood`, `!roll <NdM>`, `!wake` - Games
//!
//! In the multi-boss room the battle commands take a boss number first,
//! e.g. `!in 2`. The admin can toggle `!adminMode <true|false>` and
//! `!groupMode <true|false>`.
//!
//! # Architecture
//!
//! - [`battle`] - Battle rosters persisted in the session store
//! - [`bot`] - Wiring between Matrix and the command dispatcher
//! - [`commands`] - Parsing, gating, handlers and reply templates
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`ledger`] - Google Sheets access
//! - [`matrix`] - Matrix client, session and sync loop
//! - [`store`] - Key/value session store on disk
//! - [`templater`] - `{{placeholder}}` substitution
//! - [`utils`] - Paths, spreadsheet coordinates and the game day
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//! - `CLANBOT_*` - Configuration overrides, see [`config`]

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod battle;
mod bot;
mod commands;
mod config;
mod ledger;
mod matrix;
mod store;
mod templater;
mod utils;

/// Command-line arguments of the clanbot.
///
/// # Examples
///
/// ```bash
/// clanbot --config config.yaml --data ./clanbot-data
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// Holds the Matrix session (`session/`) and the battle rosters
    /// (`store.json`). The session allows impersonating the bot, keep the
    /// directory private.
    #[arg(short, long = "data")]
    data_path: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting clanbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config, args).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize bot: {:?}", e);
            return;
        }
    };

    if let Err(e) = bot.start().await {
        error!("Matrix sync stopped: {:?}", e);
    }
}
