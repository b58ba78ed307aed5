//! Builders for the HTTP state: store adapters, services, and credentials.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use grocer::domain::ports::{ListRepository, UserRepository};
use grocer::domain::{AccountManager, ListService};
use grocer::inbound::http::auth_config::AuthSettings;
use grocer::inbound::http::state::{CookieSettings, HttpState, HttpStatePorts};
use grocer::outbound::memory::{InMemoryListRepository, InMemoryUserRepository};
use grocer::outbound::persistence::{
    DbPool, DieselListRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use grocer::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Store adapters selected at startup.
pub(super) struct Stores {
    lists: Arc<dyn ListRepository>,
    users: Arc<dyn UserRepository>,
}

/// Connect to PostgreSQL when a URL is configured, otherwise keep everything
/// in memory.
///
/// # Errors
/// Returns [`std::io::Error`] when migrations fail or the pool cannot be
/// built.
pub(super) async fn build_stores(
    config: &ServerConfig,
    store_timeout: Duration,
) -> std::io::Result<Stores> {
    let Some(url) = config.database_url() else {
        info!("no database URL configured; using in-memory stores");
        return Ok(Stores {
            lists: Arc::new(InMemoryListRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        });
    };

    run_pending_migrations(url)
        .await
        .map_err(|err| std::io::Error::other(format!("database migration failed: {err}")))?;
    let pool = DbPool::new(PoolConfig::new(url).with_connection_timeout(store_timeout))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!("connected to PostgreSQL list store");

    Ok(Stores {
        lists: Arc::new(DieselListRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool)),
    })
}

/// Wire the list and account services over `stores`.
pub(super) fn build_http_state(
    stores: Stores,
    auth: &AuthSettings,
    store_timeout: Duration,
) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenService::new(
        &auth.jwt_secret,
        auth.token_ttl,
        Arc::clone(&clock),
    ));
    let lists = Arc::new(
        ListService::new(stores.lists, Arc::clone(&clock)).with_store_timeout(store_timeout),
    );
    let accounts = Arc::new(
        AccountManager::new(
            stores.users,
            Arc::new(Argon2PasswordHasher),
            tokens.clone(),
            clock,
        )
        .with_store_timeout(store_timeout),
    );

    let ports = HttpStatePorts {
        accounts,
        tokens,
        lists: lists.clone(),
        lists_query: lists,
    };
    let cookies = CookieSettings {
        secure: auth.cookie_secure,
        same_site: auth.same_site,
        max_age: auth.token_ttl,
    };
    web::Data::new(HttpState::new(ports, cookies))
}
