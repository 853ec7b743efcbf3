use super::HttpClientError;
use crate::prelude::*;
use crate::{err, err_ctx, Result};
use async_trait::async_trait;
use bytes::Bytes;
use easy_ext::ext;
use reqwest::{Response, StatusCode};
use reqwest_middleware::RequestBuilder;

/// Error response bodies may be whole HTML pages, we don't need all of that
/// in the error message.
const MAX_ERROR_BODY_CHARS: usize = 1000;

#[ext(RequestBuilderBasicExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    /// Better version of [`RequestBuilder::send`] that returns an error
    /// if the response status code is anything but `200 OK`.
    async fn try_send(self) -> Result<Response> {
        let response = self
            .send()
            .await
            .map_err(err_ctx!(HttpClientError::Request))?;

        let status = response.status();

        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map(|body| body.truncate_chars(MAX_ERROR_BODY_CHARS))
            .unwrap_or_else(|err| {
                format!(
                    "Could not collect the error response body text: {}",
                    err.display_chain()
                )
            });

        Err(err!(HttpClientError::BadResponseStatusCode { status, body }))
    }

    async fn read_bytes(self) -> Result<Bytes> {
        self.try_send()
            .await?
            .bytes()
            .await
            .map_err(err_ctx!(HttpClientError::ReadPayload))
    }
}
