//! Sequential processing of the configured posts

use crate::bot::BotChat;
use crate::instagram::{ImageFetcher, PostUrl};
use crate::pipeline::{PipelineFailure, PostPipeline};
use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Out-of-band channel to the human operator
#[async_trait]
pub(crate) trait AdminNotify: Send + Sync {
    async fn notify(&self, text: &str) -> Result;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) delivered: usize,
    pub(crate) failed: usize,
}

pub(crate) struct RunLoop<'a, F, C, N> {
    pub(crate) pipeline: &'a PostPipeline<F, C>,
    pub(crate) notifier: &'a N,

    /// Pause between consecutive posts. There is no pause after the last one.
    pub(crate) interval: Duration,
}

impl<F: ImageFetcher, C: BotChat, N: AdminNotify> RunLoop<'_, F, C, N> {
    /// Runs every post through the pipeline in the given order.
    ///
    /// A failed post doesn't stop the loop. The admin is notified about
    /// every failure and once more when the last post is reached.
    pub(crate) async fn run(&self, posts: &[PostUrl]) -> RunSummary {
        let mut summary = RunSummary::default();

        if posts.is_empty() {
            warn!("No posts are configured, nothing to do");
            return summary;
        }

        let total = posts.len();

        for (index, post) in posts.iter().enumerate() {
            let span = info_span!("post", %post, index, total);

            match self.pipeline.run(post).instrument(span).await {
                Ok(_) => summary.delivered += 1,
                Err(failure) => {
                    summary.failed += 1;
                    self.notify(&failure_message(post, &failure)).await;
                }
            }

            if index + 1 == total {
                break;
            }

            info!(interval = ?self.interval, "Waiting before the next post...");

            tokio::time::sleep(self.interval).await;
        }

        info!(?summary, "Last post reached");

        let message = format!(
            "Last post reached, finishing. Delivered: {}, failed: {}",
            summary.delivered, summary.failed,
        );

        self.notify(&message).await;

        summary
    }

    async fn notify(&self, text: &str) {
        if let Err(err) = self.notifier.notify(text).await {
            warn!(err = tracing_err(&err), "Failed to notify the admin");
        }
    }
}

fn failure_message(post: &PostUrl, failure: &PipelineFailure) -> String {
    format!(
        "Problem occurred with post {post} at stage {} ({}): {}",
        failure.stage,
        failure.cause(),
        failure.error.display_chain(),
    )
}
