use crate::bot::ChatTarget;
use serde::Deserialize;
use std::path::PathBuf;
use teloxide::types::ChatId;

#[derive(Deserialize, Clone)]
pub(crate) struct Config {
    /// Credentials of the application registered at my.telegram.org
    pub(crate) api_id: i32,
    pub(crate) api_hash: String,

    /// Where the authorization of the user account is persisted between runs
    #[serde(default = "default_session_file")]
    pub(crate) session_file: PathBuf,

    /// Phone number of the user account. Asked for interactively if it's
    /// required and not set.
    pub(crate) phone: Option<String>,

    #[serde(default = "default_bot_username")]
    pub(crate) bot_username: ChatTarget,

    /// Chat where the prepared posts are sent to
    #[serde(default)]
    pub(crate) destination: ChatTarget,
}

fn default_session_file() -> PathBuf {
    "telegram.session".into()
}

fn default_bot_username() -> ChatTarget {
    ChatTarget::Username("like".to_owned())
}

#[derive(Deserialize, Clone)]
pub(crate) struct AdminConfig {
    pub(crate) bot_token: String,

    /// Chat with the admin where the notifications are sent to
    pub(crate) chat: ChatId,
}
