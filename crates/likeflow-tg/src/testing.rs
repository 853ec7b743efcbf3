//! Test doubles for the external collaborators

use crate::bot::{self, BotButton, BotChat, BotMessage, ChatTarget, InlineQueryToken};
use crate::instagram::{ImageBytes, ImageFetcher, PostUrl};
use crate::run_loop::AdminNotify;
use crate::tg::ChatError;
use crate::{err, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex as SyncMutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn post(id: &str) -> PostUrl {
    let url: url::Url = format!("https://www.instagram.com/p/{id}/").parse().unwrap();
    PostUrl::try_from(url).unwrap()
}

pub(crate) fn image() -> ImageBytes {
    ImageBytes::new(&post("image"), Bytes::from_static(b"\xFF\xD8\xFF\xE0jpeg")).unwrap()
}

pub(crate) fn login_wall() -> Result<ImageBytes> {
    let page = b"<!DOCTYPE html><html><a href=\"/accounts/login/\">Log in</a></html>";
    ImageBytes::new(&post("login"), Bytes::from_static(page))
}

pub(crate) fn button(text: &str, inline_query: Option<InlineQueryToken>) -> BotButton {
    BotButton {
        text: text.to_owned(),
        inline_query,
    }
}

/// The message the bot responds with when the post is ready
pub(crate) fn publish_message(query: &str) -> BotMessage {
    let reactions = ["😡", "😔", "😐", "☺️", "😍"]
        .into_iter()
        .map(|reaction| button(reaction, None))
        .collect();

    let publish = button("Publish", Some(InlineQueryToken::from(query.to_owned())));

    BotMessage {
        buttons: vec![reactions, vec![publish]],
    }
}

/// Returns the scripted responses in order, and the same image once they
/// run out.
pub(crate) struct ScriptedFetcher {
    responses: SyncMutex<VecDeque<Result<ImageBytes>>>,
    fetches: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new(responses: impl IntoIterator<Item = Result<ImageBytes>>) -> Self {
        Self {
            responses: SyncMutex::new(responses.into_iter().collect()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedFetcher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, _post: &PostUrl) -> Result<ImageBytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.lock().pop_front();
        response.unwrap_or_else(|| Ok(image()))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum MockCall {
    Resolve { target: ChatTarget },
    SendText { text: String },
    SendImage { size: usize },
    LastMessage,
    InlineQuery { query: String },
    SendInlineResult { candidate: String, destination: ChatTarget },
}

/// In-memory chat service that records every call.
///
/// It also tracks how many conversations with the bot are in progress at
/// once. A conversation starts with the reset command and ends when the
/// extraction of the prepared post is over: after the inline query, after
/// reading a last message that has no publishing button, or on any failed
/// call.
pub(crate) struct MockChat {
    last_messages: SyncMutex<VecDeque<Option<BotMessage>>>,
    default_last_message: Option<BotMessage>,
    candidates: Vec<String>,
    unknown: Vec<ChatTarget>,
    failing_on: Option<&'static str>,
    state: SyncMutex<MockState>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<MockCall>,
    occupants: usize,
    max_occupants: usize,
}

impl MockChat {
    pub(crate) fn new() -> Self {
        Self {
            last_messages: Default::default(),
            default_last_message: Some(publish_message("publish")),
            candidates: vec!["prepared post".to_owned()],
            unknown: vec![],
            failing_on: None,
            state: Default::default(),
        }
    }

    /// Sets the last message returned every time
    pub(crate) fn with_last_message(mut self, message: Option<BotMessage>) -> Self {
        self.default_last_message = message;
        self
    }

    /// Sets the last messages returned one after another, before falling
    /// back to the default one
    pub(crate) fn with_last_messages(
        self,
        messages: impl IntoIterator<Item = Option<BotMessage>>,
    ) -> Self {
        self.last_messages.lock().extend(messages);
        self
    }

    pub(crate) fn with_candidates(mut self, candidates: &[&str]) -> Self {
        self.candidates = candidates.iter().map(|&candidate| candidate.to_owned()).collect();
        self
    }

    /// Makes the given target unresolvable
    pub(crate) fn with_unknown(mut self, target: ChatTarget) -> Self {
        self.unknown.push(target);
        self
    }

    /// Makes the method with the given name fail
    pub(crate) fn failing_on(mut self, method: &'static str) -> Self {
        self.failing_on = Some(method);
        self
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub(crate) fn max_occupants(&self) -> usize {
        self.state.lock().max_occupants
    }

    async fn record(&self, method: &'static str, call: MockCall) -> Result {
        // Give the other tasks a chance to interleave with this one
        tokio::task::yield_now().await;

        let mut state = self.state.lock();

        if matches!(&call, MockCall::SendText { text } if text == bot::RESET_COMMAND) {
            state.occupants += 1;
            state.max_occupants = state.max_occupants.max(state.occupants);
        }

        state.calls.push(call);

        if self.failing_on == Some(method) {
            state.occupants = state.occupants.saturating_sub(1);

            return Err(err!(ChatError::Invocation {
                operation: method,
                source: "mock failure",
            }));
        }

        Ok(())
    }

    fn end_conversation(&self) {
        let mut state = self.state.lock();
        state.occupants = state.occupants.saturating_sub(1);
    }
}

fn has_publish_button(message: Option<&BotMessage>) -> bool {
    let (row, column) = bot::PUBLISH_BUTTON_POSITION;

    message
        .and_then(|message| message.buttons.get(row))
        .and_then(|row| row.get(column))
        .is_some_and(|button| button.inline_query.is_some())
}

#[async_trait]
impl BotChat for MockChat {
    type Peer = ChatTarget;
    type Candidate = String;

    async fn resolve(&self, target: &ChatTarget) -> Result<Option<ChatTarget>> {
        let call = MockCall::Resolve {
            target: target.clone(),
        };
        self.record("resolve", call).await?;

        Ok((!self.unknown.contains(target)).then(|| target.clone()))
    }

    async fn send_text(&self, _peer: &ChatTarget, text: &str) -> Result {
        let call = MockCall::SendText {
            text: text.to_owned(),
        };
        self.record("send_text", call).await
    }

    async fn send_image(&self, _peer: &ChatTarget, image: &ImageBytes) -> Result {
        let call = MockCall::SendImage { size: image.len() };
        self.record("send_image", call).await
    }

    async fn last_message(&self, _peer: &ChatTarget) -> Result<Option<BotMessage>> {
        self.record("last_message", MockCall::LastMessage).await?;

        let scripted = self.last_messages.lock().pop_front();
        let message = scripted.unwrap_or_else(|| self.default_last_message.clone());

        if !has_publish_button(message.as_ref()) {
            self.end_conversation();
        }

        Ok(message)
    }

    async fn inline_query(
        &self,
        _bot: &ChatTarget,
        query: &InlineQueryToken,
    ) -> Result<Vec<String>> {
        let call = MockCall::InlineQuery {
            query: query.as_str().to_owned(),
        };
        self.record("inline_query", call).await?;
        self.end_conversation();

        Ok(self.candidates.clone())
    }

    async fn send_inline_result(&self, candidate: &String, destination: &ChatTarget) -> Result {
        let call = MockCall::SendInlineResult {
            candidate: candidate.clone(),
            destination: destination.clone(),
        };
        self.record("send_inline_result", call).await
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: SyncMutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl AdminNotify for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result {
        self.messages.lock().push(text.to_owned());
        Ok(())
    }
}

mod tests {
    use super::*;

    fn like() -> ChatTarget {
        ChatTarget::Username("like".to_owned())
    }

    async fn start_conversation(chat: &MockChat) {
        chat.send_text(&like(), bot::RESET_COMMAND).await.unwrap();
    }

    async fn finish_extraction(chat: &MockChat) {
        let message = chat.last_message(&like()).await.unwrap().unwrap();
        let query = message.buttons[1][0].inline_query.clone().unwrap();
        chat.inline_query(&like(), &query).await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn conversations_one_after_another() {
        let chat = MockChat::new();

        start_conversation(&chat).await;
        finish_extraction(&chat).await;
        start_conversation(&chat).await;
        finish_extraction(&chat).await;

        assert_eq!(chat.max_occupants(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn overlap_during_inline_query_is_recorded() {
        let chat = MockChat::new();
        let query = InlineQueryToken::from("publish".to_owned());

        start_conversation(&chat).await;
        chat.last_message(&like()).await.unwrap();

        // Another conversation starts before the inline query of the first one
        start_conversation(&chat).await;
        chat.inline_query(&like(), &query).await.unwrap();

        assert_eq!(chat.max_occupants(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn last_message_without_buttons_ends_the_conversation() {
        let chat = MockChat::new().with_last_messages([Some(BotMessage::default())]);

        start_conversation(&chat).await;
        chat.last_message(&like()).await.unwrap();
        start_conversation(&chat).await;
        finish_extraction(&chat).await;

        assert_eq!(chat.max_occupants(), 1);
    }
}
