//! Processing of a single post: fetch the image, exchange it with the bot,
//! collect the prepared post and deliver it.

mod config;

use crate::bot::{
    BotChat, BotError, ChatTarget, Conversation, DeliveryInvoker, DeliveryResult,
};
use crate::instagram::{ImageBytes, ImageFetcher, PostUrl};
use crate::prelude::*;
use crate::{err, Error, FailureCause, Result};
use std::sync::Arc;
use std::time::Duration;

pub(crate) use config::*;

/// Stages of the processing of a post in the order they are passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Stage {
    Fetching,
    Exchanging,
    WaitingForArtifact,
    Delivering,
    Done,
    Failed,
}

#[derive(Debug, thiserror::Error)]
#[error("Processing of the post failed at stage {stage}")]
pub(crate) struct PipelineFailure {
    /// The stage that was in progress when the error happened
    pub(crate) stage: Stage,

    #[source]
    pub(crate) error: Error,
}

impl PipelineFailure {
    pub(crate) fn cause(&self) -> FailureCause {
        self.error.cause()
    }
}

pub(crate) struct PostPipeline<F, C> {
    fetcher: F,
    conversation: Conversation<C>,
    delivery: DeliveryInvoker<C>,
    destination: ChatTarget,
    exchange_settle_delay: Duration,
    artifact_render_delay: Duration,
    login_wall_backoff: Duration,
}

impl<F: ImageFetcher, C: BotChat> PostPipeline<F, C> {
    pub(crate) fn new(
        fetcher: F,
        chat: Arc<C>,
        bot: ChatTarget,
        destination: ChatTarget,
        cfg: &Config,
    ) -> Self {
        Self {
            fetcher,
            conversation: Conversation::new(chat.clone(), bot, cfg.call_timeout),
            delivery: DeliveryInvoker::new(chat, cfg.call_timeout),
            destination,
            exchange_settle_delay: cfg.exchange_settle_delay,
            artifact_render_delay: cfg.artifact_render_delay,
            login_wall_backoff: cfg.login_wall_backoff,
        }
    }

    /// Takes the post through all stages. The result is either
    /// [`Stage::Done`] with the delivery result or [`Stage::Failed`] with the
    /// stage the error happened at.
    ///
    /// The conversation with the bot is held from the submission of the
    /// image until the prepared post is extracted, so concurrent runs never
    /// mix their messages up.
    pub(crate) async fn run(&self, post: &PostUrl) -> Result<DeliveryResult, PipelineFailure> {
        let result = self.try_run(post).await;

        match &result {
            Ok(delivery) => info!(
                stage = %Stage::Done,
                destination = %delivery.destination,
                token = %delivery.token,
                delivered_at = %delivery.delivered_at,
                "Post was delivered",
            ),
            Err(failure) => warn!(
                stage = %Stage::Failed,
                failed_at = %failure.stage,
                cause = %failure.cause(),
                error_id = failure.error.id(),
                err = tracing_err(&failure.error),
                "Post processing failed",
            ),
        }

        result
    }

    async fn try_run(&self, post: &PostUrl) -> Result<DeliveryResult, PipelineFailure> {
        enter(Stage::Fetching);

        let image = self.fetch(post).await.map_err(at(Stage::Fetching))?;

        let artifact = {
            let conversation = self.conversation.occupy().await;

            enter(Stage::Exchanging);

            conversation
                .submit(image, self.exchange_settle_delay)
                .with_duration_log("Exchanged messages with the bot")
                .await
                .map_err(at(Stage::Exchanging))?;

            enter(Stage::WaitingForArtifact);

            tokio::time::sleep(self.artifact_render_delay).await;

            conversation
                .extract()
                .await
                .and_then(|artifact| artifact.ok_or_else(|| err!(BotError::NoArtifactProduced)))
                .map_err(at(Stage::WaitingForArtifact))?
        };

        enter(Stage::Delivering);

        self.delivery
            .deliver(artifact, &self.destination)
            .await
            .map_err(at(Stage::Delivering))
    }

    /// Retries exactly once if the image host responds with a login wall
    async fn fetch(&self, post: &PostUrl) -> Result<ImageBytes> {
        match self.fetcher.fetch(post).await {
            Err(err) if err.cause() == FailureCause::LoginWallDetected => {
                warn!(
                    backoff = ?self.login_wall_backoff,
                    err = tracing_err(&err),
                    "Hit the login wall, retrying once after the backoff",
                );

                tokio::time::sleep(self.login_wall_backoff).await;

                self.fetcher.fetch(post).await
            }
            result => result,
        }
    }
}

fn enter(stage: Stage) {
    info!(%stage, "Entering the stage");
}

fn at(stage: Stage) -> impl FnOnce(Error) -> PipelineFailure {
    move |error| PipelineFailure { stage, error }
}
