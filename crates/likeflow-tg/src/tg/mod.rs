//! Telegram clients. The user account talks to the bot, while a regular bot
//! notifies the admin about the progress.

mod admin;
mod config;
mod login;
mod user_client;

use crate::util::DynError;
use std::path::PathBuf;

pub(crate) use admin::*;
pub(crate) use config::*;
pub(crate) use user_client::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ChatError {
    #[error("Failed to load the Telegram session from {}", .path.display())]
    LoadSession {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to save the Telegram session to {}", .path.display())]
    SaveSession {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to connect to Telegram")]
    Connect { source: Box<DynError> },

    #[error("Failed to log in to Telegram")]
    Login { source: Box<DynError> },

    #[error("Failed to read the login input")]
    ReadInput { source: std::io::Error },

    #[error("Failed to upload the image to Telegram")]
    Upload { source: std::io::Error },

    #[error("Telegram request `{operation}` failed")]
    Invocation {
        operation: &'static str,
        source: Box<DynError>,
    },
}
