use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct Config {
    /// Pause between the messages sent to the bot, so that it has the time
    /// to process each of them
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "exchange_settle_delay_secs", default = "defaults::exchange_settle_delay")]
    pub(crate) exchange_settle_delay: Duration,

    /// Pause after the exchange before the response of the bot is read
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "artifact_render_delay_secs", default = "defaults::artifact_render_delay")]
    pub(crate) artifact_render_delay: Duration,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "login_wall_backoff_secs", default = "defaults::login_wall_backoff")]
    pub(crate) login_wall_backoff: Duration,

    /// Limit for every single request to the chat service
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "call_timeout_secs", default = "defaults::call_timeout")]
    pub(crate) call_timeout: Duration,

    /// Pause between the processing of consecutive posts
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "post_interval_secs", default = "defaults::post_interval")]
    pub(crate) post_interval: Duration,
}

mod defaults {
    use std::time::Duration;

    pub(super) fn exchange_settle_delay() -> Duration {
        Duration::from_secs(2)
    }

    pub(super) fn artifact_render_delay() -> Duration {
        Duration::from_secs(5)
    }

    pub(super) fn login_wall_backoff() -> Duration {
        Duration::from_secs(60)
    }

    pub(super) fn call_timeout() -> Duration {
        Duration::from_secs(60)
    }

    pub(super) fn post_interval() -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }
}
