//! Backend entry point: configuration, tracing, then the server loop.

use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::server::config::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(init_error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %init_error, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    backend::server::run(settings).await
}
