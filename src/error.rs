//! Unified error type.

use crate::store::StoreError;

/// The error type returned by the service's fallible startup operations.
///
/// Application-level errors (400, 404, 422, …) are expressed as HTTP
/// [`Response`](crate::Response) values through [`ApiError`](crate::ApiError),
/// not as `Error`s. This type surfaces infrastructure failures: binding to a
/// port or opening the database.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}
