//! Matrix transport.
//!
//! Connects the bot account, keeps its session on disk, joins the rooms it
//! is invited to and exposes incoming text messages as
//! [`Event`](crate::commands::Event)s.

mod client;
mod event;
mod session;
mod sync;

pub use crate::matrix::{client::MatrixClient, event::MatrixEvent};

#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
    /// Passphrase encrypting the local SDK store
    pub passphrase: Option<String>,
}
