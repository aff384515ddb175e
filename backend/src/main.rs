//! Quillboard server entry-point.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use quillboard::inbound::http::health::HealthState;
use quillboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use quillboard::outbound::assistant::HttpAssistantThread;
use quillboard::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use quillboard::server::{AppSettings, ServerConfig, create_server};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr(), settings.oauth_base_url()?);

    if let Some(database_url) = settings.database_url.as_deref() {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("failed to apply migrations")?;
        info!(applied, "database migrations up to date");
        let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_pool_size()))
            .await
            .map_err(|err| eyre!("failed to build database pool: {}", err.into_message()))?;
        config = config.with_db_pool(pool);
    }

    if let Some(endpoint) = settings.assistant_endpoint()? {
        info!(url = %endpoint.url, "posting conversation notes to the assistant API");
        let thread = HttpAssistantThread::new(endpoint.url, endpoint.api_key, endpoint.timeout)
            .wrap_err("failed to build assistant client")?;
        config = config.with_assistant(Arc::new(thread));
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
