use super::{Artifact, BotChat, BotError, ChatTarget, DeliveryResult};
use crate::prelude::*;
use crate::{err, Result};
use chrono::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// Sends prepared posts to their destination.
///
/// It doesn't touch the conversation with the bot, so it needs no
/// exclusive access to it.
pub(crate) struct DeliveryInvoker<C> {
    chat: Arc<C>,
    call_timeout: Duration,
}

impl<C: BotChat> DeliveryInvoker<C> {
    pub(crate) fn new(chat: Arc<C>, call_timeout: Duration) -> Self {
        Self { chat, call_timeout }
    }

    #[instrument(skip_all, fields(%destination, token = %artifact.token))]
    pub(crate) async fn deliver(
        &self,
        artifact: Artifact<C::Candidate>,
        destination: &ChatTarget,
    ) -> Result<DeliveryResult> {
        let peer = self
            .chat
            .resolve(destination)
            .timeout("resolve_destination", self.call_timeout)
            .await
            .map_err(|source| {
                err!(BotError::UnknownDestination {
                    destination: destination.clone(),
                    source: Some(source),
                })
            })?;

        let Some(peer) = peer else {
            return Err(err!(BotError::UnknownDestination {
                destination: destination.clone(),
                source: None,
            }));
        };

        self.chat
            .send_inline_result(&artifact.candidate, &peer)
            .timeout("send_inline_result", self.call_timeout)
            .await
            .map_err(|source| {
                err!(BotError::Delivery {
                    destination: destination.clone(),
                    source,
                })
            })?;

        Ok(DeliveryResult {
            destination: destination.clone(),
            token: artifact.token,
            delivered_at: Utc::now(),
        })
    }
}
