//! Per-request tracing.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::method::Method;
use crate::response::Response;

/// Runs `respond` inside a `request` span and logs the outcome.
///
/// Server errors log at `warn`, everything else at `info`.
pub async fn instrument<F>(method: Method, path: &str, respond: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", method = %method, path = %path);
    async move {
        let started = Instant::now();
        let response = respond.await;
        let status = response.status_code();
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        if status >= 500 {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[tokio::test]
    async fn passes_the_response_through() {
        let res = instrument(Method::Get, "/", async { Response::status(Status::NoContent) }).await;
        assert_eq!(res.status_code(), 204);
    }
}
