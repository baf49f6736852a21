use clap::Parser;
use tracing_subscriber::EnvFilter;

use todos::{App, Config};

#[tokio::main]
async fn main() -> Result<(), todos::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    App::from_config(config)?.run().await
}
