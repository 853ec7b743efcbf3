use super::{BotChat, BotError, ChatTarget};
use crate::prelude::*;
use crate::{err, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// The single conversation with the bot.
///
/// The bot keeps no per-client sessions, so the conversation is a shared
/// mutable resource. It may be talked to only via [`ConversationGuard`],
/// and at most one guard exists at any time.
pub(crate) struct Conversation<C> {
    chat: Arc<C>,
    bot: ChatTarget,
    call_timeout: Duration,
    lock: Mutex<()>,
}

pub(crate) struct ConversationGuard<'c, C> {
    conversation: &'c Conversation<C>,
    _lock: MutexGuard<'c, ()>,
}

impl<C: BotChat> Conversation<C> {
    /// `call_timeout` limits every single request to the chat service
    pub(crate) fn new(chat: Arc<C>, bot: ChatTarget, call_timeout: Duration) -> Self {
        Self {
            chat,
            bot,
            call_timeout,
            lock: Mutex::new(()),
        }
    }

    /// Waits until nobody else talks to the bot and takes over the conversation
    pub(crate) async fn occupy(&self) -> ConversationGuard<'_, C> {
        let lock = match self.lock.try_lock() {
            Ok(lock) => lock,
            Err(_) => {
                debug!("Bot conversation is occupied, waiting for it to be released...");
                self.lock.lock().await
            }
        };

        ConversationGuard {
            conversation: self,
            _lock: lock,
        }
    }
}

impl<C: BotChat> ConversationGuard<'_, C> {
    pub(super) fn chat(&self) -> &C {
        &self.conversation.chat
    }

    pub(super) fn call_timeout(&self) -> Duration {
        self.conversation.call_timeout
    }

    pub(super) async fn resolve_bot(&self) -> Result<C::Peer> {
        let bot = &self.conversation.bot;

        self.chat()
            .resolve(bot)
            .timeout("resolve_bot", self.call_timeout())
            .await?
            .ok_or_else(|| err!(BotError::BotNotFound { username: bot.clone() }))
    }
}
