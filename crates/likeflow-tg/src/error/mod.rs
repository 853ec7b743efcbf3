mod ext;
mod macros;

use crate::prelude::*;
use crate::util::DynError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_error::SpanTrace;

pub(crate) use macros::*;

pub(crate) mod prelude {
    pub(crate) use super::ext::ResultExt as _;
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Describes any possible error that may happen in the application lifetime.
#[derive(Clone)]
pub struct Error {
    imp: Arc<ErrorImp>,
}

struct ErrorImp {
    /// Small identifier used for debugging purposes.
    /// It is mentioned in the admin notification when the error happens.
    /// This way we can copy it and lookup the logs using this id.
    id: String,
    kind: ErrorKind,

    // Participates only in debug impl
    spantrace: SpanTrace,
}

#[derive(Error, Debug)]
pub(crate) enum ErrorKind {
    #[error(transparent)]
    HttpClient {
        #[from]
        source: crate::http::HttpClientError,
    },

    #[error(transparent)]
    Instagram {
        #[from]
        source: crate::instagram::InstagramError,
    },

    #[error(transparent)]
    Bot {
        #[from]
        source: crate::bot::BotError,
    },

    #[error(transparent)]
    Chat {
        #[from]
        source: crate::tg::ChatError,
    },

    #[error(transparent)]
    Tg {
        #[from]
        source: teloxide::RequestError,
    },

    #[error("Operation `{operation}` didn't finish in {timeout:.2?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Unrecoverable kind of error, that is not supposed to happen, but when
    /// it happens we can't do anything reasonable about it, so no structural
    /// error handling is possible, this error is just propagated to the top.
    #[error("FATAL: {message}")]
    Fatal {
        message: String,
        source: Option<Box<DynError>>,
    },
}

/// Coarse classification of errors that terminate the processing of a post.
/// This is what gets reported and asserted on, while [`ErrorKind`] keeps the
/// details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum FailureCause {
    /// The image host couldn't be reached or responded with a non-200 status
    FetchError,

    /// The image host responded with a body that is not an image
    InvalidResponse,

    /// The image host returned a login page instead of the image
    LoginWallDetected,

    /// The bot didn't respond with a button that carries an inline query
    NoArtifactProduced,

    /// The inline query of the bot returned no results
    NoCandidateArtifact,

    /// The destination chat couldn't be resolved
    UnknownDestination,

    /// Sending the inline query result to the destination failed
    DeliveryError,

    /// Communication with the chat service failed outside of delivery
    Transport,

    /// Anything that doesn't belong to the categories above
    Internal,
}

impl Error {
    pub(crate) fn id(&self) -> &str {
        &self.imp.id
    }

    pub fn cause(&self) -> FailureCause {
        match &self.imp.kind {
            ErrorKind::HttpClient { .. } => FailureCause::FetchError,
            ErrorKind::Instagram { source } => source.cause(),
            ErrorKind::Bot { source } => source.cause(),
            ErrorKind::Chat { .. } | ErrorKind::Timeout { .. } => FailureCause::Transport,
            ErrorKind::Tg { .. } | ErrorKind::Fatal { .. } => FailureCause::Internal,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error (id: {}): {}", self.imp.id, self.imp.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.imp.kind.source()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)?;
        fmt::Display::fmt(&self.imp.spantrace, f)
    }
}

impl<T: Into<ErrorKind>> From<T> for Error {
    #[track_caller]
    fn from(kind: T) -> Self {
        let imp = ErrorImp {
            kind: kind.into(),
            id: nanoid::nanoid!(6),
            spantrace: SpanTrace::capture(),
        };

        let err = Self { imp: Arc::new(imp) };

        trace!(err = tracing_err(&err), "Created an error");

        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::BotError;
    use crate::instagram::InstagramError;

    #[test]
    fn causes_follow_the_domain_error() {
        let login_wall = err!(InstagramError::LoginWall {
            post_url: "https://www.instagram.com/p/abc/"
        });
        assert_eq!(login_wall.cause(), FailureCause::LoginWallDetected);

        let no_artifact = err!(BotError::NoArtifactProduced);
        assert_eq!(no_artifact.cause(), FailureCause::NoArtifactProduced);

        let timeout = err!(ErrorKind::Timeout {
            operation: "send_text",
            timeout: Duration::from_secs(1),
        });
        assert_eq!(timeout.cause(), FailureCause::Transport);

        let fatal: Result<()> = Err::<(), _>("boom").fatal_ctx(|| "something went wrong");
        assert_eq!(fatal.unwrap_err().cause(), FailureCause::Internal);
    }

    #[test]
    fn display_mentions_the_error_id() {
        let err = err!(BotError::NoArtifactProduced);
        let display = err.to_string();

        assert!(display.starts_with(&format!("Error (id: {}): ", err.id())));
        assert_eq!(err.id().len(), 6);
    }
}
