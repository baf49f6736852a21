//! HTML page routes.

use std::time::Duration;

use tracing::error;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::store::Store;
use crate::templates;

/// `GET /`: every to-do, latest due date first.
pub async fn index(store: Store, _req: Request) -> Response {
    match store.list_todos().await {
        Ok(todos) => Response::html(templates::todo_index(&todos)),
        Err(e) => server_error(e),
    }
}

/// `GET /about`
pub async fn about(_req: Request) -> Response {
    Response::html(templates::about())
}

/// `GET /count`: records the visit and shows the running total.
pub async fn counter(store: Store, _req: Request) -> Response {
    match store.record_visit().await {
        Ok(count) => Response::html(templates::counter(count)),
        Err(e) => server_error(e),
    }
}

/// `GET /slow/`: suspends for `delay` before answering. The worker thread
/// is free to serve other requests meanwhile.
pub async fn slow(delay: Duration, _req: Request) -> Response {
    tokio::time::sleep(delay).await;
    Response::html(templates::slow())
}

fn server_error(e: impl std::fmt::Display) -> Response {
    error!("page render failed: {e}");
    Response::builder()
        .status(Status::InternalServerError)
        .text("internal server error")
}
