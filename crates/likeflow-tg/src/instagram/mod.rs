//! Fetching of the images of Instagram posts

mod client;
mod model;

use crate::{FailureCause, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

pub(crate) use client::*;
pub(crate) use model::*;

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct Config {
    /// Posts to process, in the order they are listed
    pub(crate) posts: Vec<PostUrl>,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "request_timeout_secs", default = "default_request_timeout")]
    pub(crate) request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Retrieves the raw image of a post.
///
/// Implementations must not retry internally. Whether a failure deserves
/// another attempt is decided by the caller.
#[async_trait]
pub(crate) trait ImageFetcher: Send + Sync {
    async fn fetch(&self, post: &PostUrl) -> Result<ImageBytes>;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum InstagramError {
    #[error("Instagram returned a login page instead of the image of the post {post_url}")]
    LoginWall { post_url: String },

    #[error("Instagram returned an invalid image for the post {post_url}: {reason}")]
    InvalidResponse {
        post_url: String,
        reason: &'static str,
    },
}

impl InstagramError {
    pub(crate) fn cause(&self) -> FailureCause {
        match self {
            Self::LoginWall { .. } => FailureCause::LoginWallDetected,
            Self::InvalidResponse { .. } => FailureCause::InvalidResponse,
        }
    }
}
