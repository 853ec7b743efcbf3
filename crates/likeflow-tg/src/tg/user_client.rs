use super::{login, ChatError, Config};
use crate::bot::{BotButton, BotChat, BotMessage, ChatTarget, InlineQueryToken};
use crate::instagram::ImageBytes;
use crate::prelude::*;
use crate::{err, err_ctx, Result};
use async_trait::async_trait;
use grammers_client::client::bots::InlineResult;
use grammers_client::types::{Chat, PackedChat};
use grammers_client::{Client, InitParams, InputMessage};
use grammers_session::Session;
use grammers_tl_types as tl;
use std::io::Cursor;

/// Only the first result is ever used, so there is no point in paging
/// through all of them.
const MAX_INLINE_RESULTS: usize = 5;

const UPLOADED_IMAGE_NAME: &str = "image.jpg";

/// Offset Bot API adds to the ids of channels and supergroups
const BOT_API_CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// Telegram client that acts on behalf of a user account
pub(crate) struct UserClient {
    client: Client,
}

impl UserClient {
    /// Connects to Telegram and makes sure the user account is authorized.
    /// The login is interactive if the session file has no authorization yet.
    pub(crate) async fn connect(cfg: &Config) -> Result<Self> {
        let session = Session::load_file_or_create(&cfg.session_file).map_err(err_ctx!(
            ChatError::LoadSession {
                path: cfg.session_file.clone()
            }
        ))?;

        info!("Connecting to Telegram...");

        let client = Client::connect(grammers_client::Config {
            session,
            api_id: cfg.api_id,
            api_hash: cfg.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(err_ctx!(ChatError::Connect))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(invocation("is_authorized"))?;

        if !authorized {
            login::sign_in(&client, cfg).await?;

            client
                .session()
                .save_to_file(&cfg.session_file)
                .map_err(err_ctx!(ChatError::SaveSession {
                    path: cfg.session_file.clone()
                }))?;
        }

        let me = client.get_me().await.map_err(invocation("get_me"))?;

        info!(
            username = me.username(),
            name = %me.full_name(),
            "Logged in as a Telegram user"
        );

        Ok(Self { client })
    }

    async fn find_dialog(&self, id: i64) -> Result<Option<PackedChat>> {
        let id = bare_chat_id(id);
        let mut dialogs = self.client.iter_dialogs();

        while let Some(dialog) = dialogs.next().await.map_err(invocation("get_dialogs"))? {
            let chat = dialog.chat();
            if chat.id() == id {
                return Ok(Some(chat.pack()));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl BotChat for UserClient {
    type Peer = PackedChat;
    type Candidate = InlineResult;

    async fn resolve(&self, target: &ChatTarget) -> Result<Option<PackedChat>> {
        match target {
            ChatTarget::Me => {
                let me = self.client.get_me().await.map_err(invocation("get_me"))?;
                Ok(Some(Chat::User(me).pack()))
            }
            ChatTarget::Username(username) => {
                let chat = self
                    .client
                    .resolve_username(username)
                    .await
                    .map_err(invocation("resolve_username"))?;

                Ok(chat.map(|chat| chat.pack()))
            }
            ChatTarget::Id(id) => self.find_dialog(*id).await,
        }
    }

    async fn send_text(&self, peer: &PackedChat, text: &str) -> Result {
        self.client
            .send_message(peer.clone(), InputMessage::text(text))
            .await
            .map_err(invocation("send_message"))?;

        Ok(())
    }

    async fn send_image(&self, peer: &PackedChat, image: &ImageBytes) -> Result {
        let mut stream = Cursor::new(image.to_vec());

        let uploaded = self
            .client
            .upload_stream(&mut stream, image.len(), UPLOADED_IMAGE_NAME.to_owned())
            .await
            .map_err(err_ctx!(ChatError::Upload))?;

        self.client
            .send_message(peer.clone(), InputMessage::text("").photo(uploaded))
            .await
            .map_err(invocation("send_photo"))?;

        Ok(())
    }

    async fn last_message(&self, peer: &PackedChat) -> Result<Option<BotMessage>> {
        let message = self
            .client
            .iter_messages(peer.clone())
            .limit(1)
            .next()
            .await
            .map_err(invocation("get_history"))?;

        let Some(message) = message else {
            return Ok(None);
        };

        let buttons = message
            .reply_markup()
            .map(buttons_from_markup)
            .unwrap_or_default();

        Ok(Some(BotMessage { buttons }))
    }

    async fn inline_query(
        &self,
        bot: &PackedChat,
        query: &InlineQueryToken,
    ) -> Result<Vec<InlineResult>> {
        let mut results = self.client.inline_query(bot.clone(), query.as_str());
        let mut candidates = Vec::new();

        while candidates.len() < MAX_INLINE_RESULTS {
            let Some(result) = results.next().await.map_err(invocation("get_inline_bot_results"))?
            else {
                break;
            };
            candidates.push(result);
        }

        Ok(candidates)
    }

    async fn send_inline_result(&self, candidate: &InlineResult, destination: &PackedChat) -> Result {
        candidate
            .send(destination.clone())
            .await
            .map_err(invocation("send_inline_bot_result"))?;

        Ok(())
    }
}

fn invocation<E>(operation: &'static str) -> impl FnOnce(E) -> crate::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |source| err!(ChatError::Invocation { operation, source })
}

/// Converts the chat id in the Bot API format to the bare id used by MTProto
fn bare_chat_id(id: i64) -> i64 {
    if id <= -BOT_API_CHANNEL_ID_OFFSET {
        -id - BOT_API_CHANNEL_ID_OFFSET
    } else {
        id.abs()
    }
}

fn buttons_from_markup(markup: tl::enums::ReplyMarkup) -> Vec<Vec<BotButton>> {
    let rows = match markup {
        tl::enums::ReplyMarkup::ReplyInlineMarkup(markup) => markup.rows,
        tl::enums::ReplyMarkup::ReplyKeyboardMarkup(markup) => markup.rows,
        _ => return vec![],
    };

    rows.into_iter()
        .map(|row| match row {
            tl::enums::KeyboardButtonRow::Row(row) => {
                row.buttons.into_iter().map(button_from_tl).collect()
            }
        })
        .collect()
}

fn button_from_tl(button: tl::enums::KeyboardButton) -> BotButton {
    use tl::enums::KeyboardButton;

    let (text, inline_query) = match button {
        KeyboardButton::SwitchInline(button) => {
            (button.text, Some(InlineQueryToken::from(button.query)))
        }
        KeyboardButton::Button(button) => (button.text, None),
        KeyboardButton::Url(button) => (button.text, None),
        KeyboardButton::Callback(button) => (button.text, None),
        _ => (String::new(), None),
    };

    BotButton { text, inline_query }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_api_chat_ids() {
        assert_eq!(bare_chat_id(12345), 12345);
        assert_eq!(bare_chat_id(-4567), 4567);
        assert_eq!(bare_chat_id(-1001234567890), 1234567890);
    }

    #[test]
    fn candidates_are_results_of_the_inline_query() {
        let candidate = std::any::type_name::<<UserClient as BotChat>::Candidate>();
        assert_eq!(candidate, std::any::type_name::<InlineResult>());
        assert!(candidate.contains("bots::InlineResult"), "{candidate}");
    }
}
