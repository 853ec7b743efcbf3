//! Interaction with the `@like` bot.
//!
//! The bot annotates an image with reaction buttons and offers a "publish"
//! button that carries an inline query. Running that inline query returns the
//! prepared post, which can then be sent to any chat on behalf of the user.

mod conversation;
mod delivery;
mod exchange;
mod extract;
mod model;

use crate::instagram::ImageBytes;
use crate::{FailureCause, Result};
use async_trait::async_trait;
use std::fmt;

pub(crate) use conversation::*;
pub(crate) use delivery::*;
pub(crate) use exchange::{REACTIONS, RESET_COMMAND};
pub(crate) use extract::PUBLISH_BUTTON_POSITION;
pub(crate) use model::*;

/// The subset of the chat service protocol the bot interaction is built on.
///
/// Implementations are expected to act on behalf of a single user account,
/// which means there is just one conversation with any given bot, shared by
/// everyone who uses the implementation.
#[async_trait]
pub(crate) trait BotChat: Send + Sync + 'static {
    /// Resolved handle of a user, bot or chat
    type Peer: Clone + fmt::Debug + Send + Sync;

    /// Result of an inline query that can be sent to a chat
    type Candidate: Send + Sync;

    /// Returns [`None`] if there is no such chat
    async fn resolve(&self, target: &ChatTarget) -> Result<Option<Self::Peer>>;

    async fn send_text(&self, peer: &Self::Peer, text: &str) -> Result;

    async fn send_image(&self, peer: &Self::Peer, image: &ImageBytes) -> Result;

    /// Returns [`None`] if the conversation has no messages at all
    async fn last_message(&self, peer: &Self::Peer) -> Result<Option<BotMessage>>;

    /// Results are returned in the order the bot listed them
    async fn inline_query(
        &self,
        bot: &Self::Peer,
        query: &InlineQueryToken,
    ) -> Result<Vec<Self::Candidate>>;

    async fn send_inline_result(
        &self,
        candidate: &Self::Candidate,
        destination: &Self::Peer,
    ) -> Result;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum BotError {
    #[error("Bot {username} was not found")]
    BotNotFound { username: ChatTarget },

    #[error(
        "The last message of the bot has {rows} row(s) of buttons, \
        but none of them is the publishing button with an inline query"
    )]
    MissingInlineQueryButton { rows: usize },

    #[error("The bot didn't produce the prepared post (its last message has no buttons)")]
    NoArtifactProduced,

    #[error("Inline query `{query}` returned no results")]
    NoCandidateArtifact { query: InlineQueryToken },

    #[error("Destination chat {destination} could not be resolved")]
    UnknownDestination {
        destination: ChatTarget,
        source: Option<crate::Error>,
    },

    #[error("Failed to send the prepared post to {destination}")]
    Delivery {
        destination: ChatTarget,
        source: crate::Error,
    },
}

impl BotError {
    pub(crate) fn cause(&self) -> FailureCause {
        match self {
            Self::BotNotFound { .. } => FailureCause::Transport,
            Self::MissingInlineQueryButton { .. } | Self::NoArtifactProduced => {
                FailureCause::NoArtifactProduced
            }
            Self::NoCandidateArtifact { .. } => FailureCause::NoCandidateArtifact,
            Self::UnknownDestination { .. } => FailureCause::UnknownDestination,
            Self::Delivery { .. } => FailureCause::DeliveryError,
        }
    }
}
