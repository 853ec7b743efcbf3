mod basic_ext;

use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use reqwest_middleware::RequestBuilder;
use std::time::Duration;

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt;
}

pub type Client = reqwest_middleware::ClientWithMiddleware;

/// Creates an HTTP client with logging middleware.
///
/// There is intentionally no retry middleware here. The callers decide
/// whether a failed request deserves another attempt.
pub(crate) fn create_client(timeout: Duration) -> Result<Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .fatal_ctx(|| "Failed to build the HTTP client")?;

    let client = reqwest_middleware::ClientBuilder::new(client)
        .with(ObservingMiddleware)
        .with_init(|request_builder: RequestBuilder| {
            request_builder.header(
                "User-Agent",
                concat!("likeflow-tg/", env!("CARGO_PKG_VERSION")),
            )
        })
        .build();

    Ok(client)
}

struct ObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for ObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut task_local_extensions::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let span = info_span!(
            "request",
            version = ?request.version(),
            method = %request.method(),
            url = %request.url(),
        );

        async {
            let (result, duration) = next.run(request, extensions).with_duration().await;

            let duration = tracing_duration(duration);

            let response = match &result {
                Ok(response) => response,
                Err(err) => {
                    error!(duration, err = tracing_err(err), "Network request failed");
                    return result;
                }
            };

            let status = response.status();

            let Err(err) = response.error_for_status_ref() else {
                info!(duration, %status, "Network request succeeded");
                return result;
            };

            warn!(
                err = tracing_err(&err),
                duration,
                %status,
                "Network request failed (error status)"
            );

            result
        }
        .instrument(span)
        .await
    }
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest::Error },

    #[error("HTTP request has failed (HTTP status code: {status}):\n{body}")]
    BadResponseStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },
}
