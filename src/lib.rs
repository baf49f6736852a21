//! # todos
//!
//! A to-do list served as HTML pages and a JSON API, with the whole
//! application declared in one place ([`App`]).
//!
//! ## Layers
//!
//! The HTTP plumbing is deliberately small:
//!
//! - Radix-tree routing via [`matchit`], one tree per method, `405` for a
//!   known path under the wrong method
//! - hyper for HTTP/1.1 and HTTP/2, tokio for I/O
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests
//! - A [`middleware::trace`] span around every request
//!
//! The application sits on top: a SQLite [`Store`], typed payload
//! [`schema`]s, the [`api`] handlers and the HTML [`pages`].
//!
//! ## Routes
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | GET | `/` | HTML list of to-dos, latest due date first |
//! | GET | `/about` | static HTML |
//! | GET | `/count` | records a page load, shows the total |
//! | GET | `/slow/` | waits, then answers (async demo) |
//! | GET | `/api/v1/todos/` | `{"data": [...]}` |
//! | POST | `/api/v1/todos/` | `201 {"data": record}` |
//! | PATCH | `/api/v1/todos/` | `{"data": record}` or `{"error": ...}` |
//! | GET | `/api/v1/todos/{id}/` | `{"data": record}` |
//! | GET | `/api/v1/add` | `{"count": n}` |
//! | GET | `/healthz`, `/readyz` | health checks |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use todos::{App, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), todos::Error> {
//!     let config = Config::parse();
//!     App::from_config(config)?.run().await
//! }
//! ```

mod app;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod health;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod schema;
pub mod store;
pub mod templates;

pub use api::ApiError;
pub use app::App;
pub use config::{Config, SecretKey};
pub use error::Error;
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use models::{Todo, TodoListItem};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{Store, StoreError};
