use super::AdminConfig;
use crate::prelude::*;
use crate::run_loop::AdminNotify;
use crate::Result;
use async_trait::async_trait;
use teloxide::adaptors::{Throttle, Trace};
use teloxide::prelude::*;

/// Telegram doesn't accept longer text messages
const MAX_MESSAGE_CHARS: usize = 4096;

pub(crate) type Bot = Trace<Throttle<teloxide::Bot>>;

/// Notifies the admin via a regular Telegram bot
pub(crate) struct AdminNotifier {
    bot: Bot,
    chat: ChatId,
}

impl AdminNotifier {
    pub(crate) fn new(cfg: AdminConfig) -> Self {
        let bot = teloxide::Bot::new(cfg.bot_token)
            .throttle(Default::default())
            .trace(teloxide::adaptors::trace::Settings::all());

        Self {
            bot,
            chat: cfg.chat,
        }
    }
}

#[async_trait]
impl AdminNotify for AdminNotifier {
    #[instrument(skip_all)]
    async fn notify(&self, text: &str) -> Result {
        self.bot
            .send_message(self.chat, text.truncate_chars(MAX_MESSAGE_CHARS))
            .await?;

        Ok(())
    }
}
