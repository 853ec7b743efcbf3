use chrono::prelude::*;
use lazy_regex::regex_is_match;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Something that identifies a chat before it is resolved with the chat service
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub(crate) enum ChatTarget {
    /// The account the chat client is logged in as ("Saved Messages")
    #[default]
    Me,

    /// Public username, stored without the leading `@`
    Username(String),

    /// Numeric id of a chat the account has a dialog with
    Id(i64),
}

#[derive(Debug, thiserror::Error)]
#[error("Expected `me`, a numeric chat id or a username, but got `{input}`")]
pub(crate) struct ParseChatTargetError {
    input: String,
}

impl FromStr for ChatTarget {
    type Err = ParseChatTargetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();

        if input.eq_ignore_ascii_case("me") {
            return Ok(Self::Me);
        }

        if let Ok(id) = input.parse() {
            return Ok(Self::Id(id));
        }

        let username = input.strip_prefix('@').unwrap_or(input);

        if regex_is_match!(r"^[a-zA-Z][a-zA-Z0-9_]{2,31}$", username) {
            return Ok(Self::Username(username.to_owned()));
        }

        Err(ParseChatTargetError {
            input: input.to_owned(),
        })
    }
}

impl TryFrom<String> for ChatTarget {
    type Error = ParseChatTargetError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Me => f.write_str("me"),
            Self::Username(username) => write!(f, "@{username}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A message as seen in the conversation with the bot
#[derive(Debug, Clone, Default)]
pub(crate) struct BotMessage {
    /// Rows of buttons attached to the message, empty if there are none
    pub(crate) buttons: Vec<Vec<BotButton>>,
}

#[derive(Debug, Clone)]
pub(crate) struct BotButton {
    pub(crate) text: String,

    /// Present only for buttons that switch to an inline query
    pub(crate) inline_query: Option<InlineQueryToken>,
}

/// Query text embedded in a bot's button, that makes the bot return the
/// prepared post when run as an inline query.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub(crate) struct InlineQueryToken(String);

impl InlineQueryToken {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// The prepared post selected from the inline query results.
/// It is only valid during the current run, it must not be persisted.
#[derive(Debug)]
pub(crate) struct Artifact<C> {
    pub(crate) token: InlineQueryToken,
    pub(crate) candidate: C,
}

#[derive(Debug, Clone)]
pub(crate) struct DeliveryResult {
    pub(crate) destination: ChatTarget,
    pub(crate) token: InlineQueryToken,
    pub(crate) delivered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn assert_parse(input: &str, expected: Expect) {
        let actual = match input.parse::<ChatTarget>() {
            Ok(target) => format!("{target:?} ({target})"),
            Err(err) => format!("Err: {err}"),
        };
        expected.assert_eq(&actual);
    }

    #[test]
    fn chat_target_parsing() {
        use assert_parse as test;

        test("me", expect!["Me (me)"]);
        test("ME", expect!["Me (me)"]);
        test("like", expect![[r#"Username("like") (@like)"#]]);
        test("@like", expect![[r#"Username("like") (@like)"#]]);
        test("-1001234567890", expect!["Id(-1001234567890) (-1001234567890)"]);
        test(
            "@1abc",
            expect!["Err: Expected `me`, a numeric chat id or a username, but got `@1abc`"],
        );
        test(
            "",
            expect!["Err: Expected `me`, a numeric chat id or a username, but got ``"],
        );
    }
}
