//! The application: one value that declares the store, the pages and the API.

use std::future::Future;

use tracing::info;

use crate::api;
use crate::config::Config;
use crate::error::Error;
use crate::health;
use crate::pages;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Router;
use crate::server::Server;
use crate::store::Store;

pub struct App {
    config: Config,
    store: Store,
}

impl App {
    pub fn new(config: Config, store: Store) -> Self {
        Self { config, store }
    }

    /// Opens the configured database and builds the app on top of it.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let store = Store::open(&config.database)?;
        Ok(Self::new(config, store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Every route the app serves.
    pub fn router(&self) -> Router {
        let delay = self.config.slow_delay();

        Router::new()
            .get("/",       with_store(&self.store, pages::index))
            .get("/about",  pages::about)
            .get("/count",  with_store(&self.store, pages::counter))
            .get("/slow/",  move |req| pages::slow(delay, req))
            .get("/healthz", health::liveness)
            .get("/readyz", with_store(&self.store, health::readiness))
            .get(api::TODOS_PATH,   with_store(&self.store, api::list_todos))
            .post(api::TODOS_PATH,  with_store(&self.store, api::create_todo))
            .patch(api::TODOS_PATH, with_store(&self.store, api::update_todo))
            .get(api::TODO_PATH,    with_store(&self.store, api::get_todo))
            .get(api::COUNTER_PATH, with_store(&self.store, api::add_count))
    }

    /// Serves until SIGTERM or Ctrl-C.
    pub async fn run(self) -> Result<(), Error> {
        info!(addr = %self.config.addr, database = %self.config.database.display(), "starting todos");
        Server::bind(self.config.addr).serve(self.router()).await
    }
}

/// Adapts a `(Store, Request)` handler to the router's `Request`-only shape.
fn with_store<F, Fut, R>(store: &Store, handler: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Store, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let store = store.clone();
    move |req| handler(store.clone(), req)
}
