//! Liveness and readiness checks.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can the database answer a query? |

use tracing::warn;

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::store::Store;

/// Always `200 ok`. If the process can answer HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 ready` when the store answers, `503` otherwise.
pub async fn readiness(store: Store, _req: Request) -> Response {
    match store.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!("readiness check failed: {e}");
            Response::builder()
                .status(Status::ServiceUnavailable)
                .text("not ready")
        }
    }
}
