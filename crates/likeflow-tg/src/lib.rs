mod bot;
mod config;
mod error;
mod http;
mod instagram;
mod observability;
mod pipeline;
mod run_loop;
mod tg;

#[cfg(test)]
mod testing;

pub mod util;

pub use crate::error::*;
pub use config::*;
pub use observability::*;

use crate::prelude::*;
use std::sync::Arc;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
}

/// Process every configured post through the `@like` bot, one after another
pub async fn run(config: Config) -> Result<()> {
    let Config {
        tg,
        admin,
        instagram,
        pipeline: pipeline_cfg,
    } = config;

    let http = http::create_client(instagram.request_timeout)?;
    let fetcher = instagram::Client::new(http);

    let chat = Arc::new(tg::UserClient::connect(&tg).await?);
    let notifier = tg::AdminNotifier::new(admin);

    let pipeline = pipeline::PostPipeline::new(
        fetcher,
        chat,
        tg.bot_username,
        tg.destination,
        &pipeline_cfg,
    );

    let summary = run_loop::RunLoop {
        pipeline: &pipeline,
        notifier: &notifier,
        interval: pipeline_cfg.post_interval,
    }
    .run(&instagram.posts)
    .await;

    info!(
        delivered = summary.delivered,
        failed = summary.failed,
        "Finished processing the posts"
    );

    Ok(())
}
