use super::{Artifact, BotButton, BotChat, BotError, ConversationGuard, InlineQueryToken};
use crate::prelude::*;
use crate::{err, Result};

/// Position (row, column) of the "publish" button in the grid of buttons
/// under the prepared post.
///
/// This is brittle. The bot puts the reaction buttons in the first row and
/// the button with the inline query in the second one, but nothing in the
/// protocol guarantees it. If the bot changes its layout this has to be
/// updated.
pub(crate) const PUBLISH_BUTTON_POSITION: (usize, usize) = (1, 0);

impl<C: BotChat> ConversationGuard<'_, C> {
    /// Reads the response of the bot to the last [`Self::submit`].
    ///
    /// Returns [`None`] if the last message in the conversation has no
    /// buttons, which means the bot hasn't prepared the post (yet).
    #[instrument(skip_all)]
    pub(crate) async fn extract(&self) -> Result<Option<Artifact<C::Candidate>>> {
        let timeout = self.call_timeout();
        let bot = self.resolve_bot().await?;

        let message = self
            .chat()
            .last_message(&bot)
            .timeout("last_message", timeout)
            .await?;

        let Some(message) = message.filter(|message| !message.buttons.is_empty()) else {
            info!("The last message in the conversation with the bot has no buttons");
            return Ok(None);
        };

        let token = publish_button_token(&message.buttons)?;

        info!(%token, "Got the inline query from the bot");

        let candidates = self
            .chat()
            .inline_query(&bot, &token)
            .timeout("inline_query", timeout)
            .await?;

        let total = candidates.len();

        let Some(candidate) = candidates.into_iter().next() else {
            return Err(err!(BotError::NoCandidateArtifact { query: token }));
        };

        debug!(total, "Selected the first inline query result");

        Ok(Some(Artifact { token, candidate }))
    }
}

fn publish_button_token(buttons: &[Vec<BotButton>]) -> Result<InlineQueryToken> {
    let (row, column) = PUBLISH_BUTTON_POSITION;

    let button = buttons.get(row).and_then(|row| row.get(column));

    let Some((text, token)) =
        button.and_then(|button| Some((&button.text, button.inline_query.clone()?)))
    else {
        return Err(err!(BotError::MissingInlineQueryButton {
            rows: buttons.len()
        }));
    };

    debug!(%text, "Found the publishing button");

    Ok(token)
}

#[cfg(test)]
mod tests {
    use crate::bot::{BotMessage, ChatTarget, Conversation, InlineQueryToken};
    use crate::testing::{button, publish_message, MockCall, MockChat};
    use crate::FailureCause;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::time::Duration;

    fn conversation(chat: &Arc<MockChat>) -> Conversation<MockChat> {
        Conversation::new(
            chat.clone(),
            ChatTarget::Username("like".to_owned()),
            Duration::from_secs(10),
        )
    }

    #[test_log::test(tokio::test)]
    async fn no_buttons_is_not_an_error() {
        for last_message in [None, Some(BotMessage::default())] {
            let chat = Arc::new(MockChat::new().with_last_message(last_message));
            let conversation = conversation(&chat);

            let artifact = conversation.occupy().await.extract().await.unwrap();

            assert_matches!(artifact, None);
        }
    }

    #[test_log::test(tokio::test)]
    async fn first_candidate_is_selected() {
        let chat = Arc::new(
            MockChat::new()
                .with_last_message(Some(publish_message("publish abc")))
                .with_candidates(&["first", "second", "third"]),
        );

        let conversation = conversation(&chat);

        let artifact = conversation
            .occupy()
            .await
            .extract()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(artifact.candidate, "first");
        assert_eq!(artifact.token.as_str(), "publish abc");

        let calls = chat.calls();
        assert_matches!(
            calls.last(),
            Some(MockCall::InlineQuery { query }) if query == "publish abc"
        );
    }

    #[test_log::test(tokio::test)]
    async fn empty_candidate_list() {
        let chat = Arc::new(
            MockChat::new()
                .with_last_message(Some(publish_message("publish abc")))
                .with_candidates(&[]),
        );

        let err = conversation(&chat)
            .occupy()
            .await
            .extract()
            .await
            .unwrap_err();

        assert_eq!(err.cause(), FailureCause::NoCandidateArtifact);
    }

    #[test_log::test(tokio::test)]
    async fn buttons_without_inline_query() {
        let reactions_only = BotMessage {
            buttons: vec![vec![button("😡", None), button("😍", None)]],
        };

        let callback_in_second_row = BotMessage {
            buttons: vec![vec![button("😡", None)], vec![button("Publish", None)]],
        };

        let inline_query_in_wrong_row = BotMessage {
            buttons: vec![vec![button(
                "Publish",
                Some(InlineQueryToken::from("publish abc".to_owned())),
            )]],
        };

        for message in [reactions_only, callback_in_second_row, inline_query_in_wrong_row] {
            let chat = Arc::new(
                MockChat::new()
                    .with_last_message(Some(message))
                    .with_candidates(&["first"]),
            );

            let err = conversation(&chat)
                .occupy()
                .await
                .extract()
                .await
                .unwrap_err();

            assert_eq!(err.cause(), FailureCause::NoArtifactProduced);
        }
    }
}
