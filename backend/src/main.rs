//! Grocer entry-point: loads settings and runs the HTTP server.

mod server;

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use grocer::inbound::http::auth_config::{BuildMode, auth_settings_from_env};
use grocer::inbound::http::health::HealthState;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let auth = auth_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        in_memory = config.database_url().is_none(),
        secret_fingerprint = %auth.secret_fingerprint(),
        "starting grocer"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config, auth).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
