use super::{ImageBytes, ImageFetcher, PostUrl};
use crate::prelude::*;
use crate::{http, Result};
use async_trait::async_trait;

pub(crate) struct Client {
    http: http::Client,
}

impl Client {
    pub(crate) fn new(http: http::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for Client {
    #[instrument(skip(self))]
    async fn fetch(&self, post: &PostUrl) -> Result<ImageBytes> {
        let body = self.http.get(post.media_url()).read_bytes().await?;

        let image = ImageBytes::new(post, body)?;

        debug!(size = image.len(), "Fetched the image of the post");

        Ok(image)
    }
}
