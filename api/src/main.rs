use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use ag_api::{cookies::CookieSettings, create_app, AppState};
use ag_core::domain::entities::user::User;
use ag_core::errors::DomainError;
use ag_core::repositories::{InMemoryStore, SessionRepository, UserRepository};
use ag_core::services::auth::{
    validate_password, validate_username, AuthService, AuthServiceConfig, PasswordHasher,
    Pbkdf2Hasher,
};
use ag_core::services::clock::{Clock, SystemClock};
use ag_core::services::token::{TokenCodec, TokenCodecConfig};
use ag_infra::database::{DatabasePool, MySqlSessionRepository, MySqlUserRepository};
use ag_shared::config::{AppConfig, StoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    env_logger::init_from_env(
        env_logger::Env::new().default_filter_or(config.environment.default_log_level()),
    );

    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("Invalid configuration: {}", reason))?;

    info!(
        "Starting AuthGate ({:?}, store: {:?})",
        config.environment, config.store
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let codec = Arc::new(TokenCodec::new(
        TokenCodecConfig::from(&config.auth.jwt),
        clock.clone(),
    ));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Pbkdf2Hasher::new(&config.auth.password));
    let service_config = AuthServiceConfig::from(&config.auth.session);
    let cookies = CookieSettings::new(&config.auth.session);

    match config.store {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; all accounts and sessions are lost on restart");
            let store = Arc::new(InMemoryStore::new());
            seed_admin(store.as_ref(), hasher.as_ref(), clock.as_ref()).await?;

            let auth_service = Arc::new(AuthService::new(
                store.clone(),
                store,
                codec,
                hasher,
                clock,
                service_config,
            ));
            serve(&config, AppState::new(auth_service, cookies)).await
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(config.database.clone())
                .await
                .context("Failed to connect to the database")?;
            if config.database.run_migrations {
                pool.run_migrations()
                    .await
                    .context("Failed to run database migrations")?;
            }

            let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
            let sessions = Arc::new(MySqlSessionRepository::new(pool.get_pool().clone()));
            seed_admin(users.as_ref(), hasher.as_ref(), clock.as_ref()).await?;

            let auth_service = Arc::new(AuthService::new(
                users,
                sessions,
                codec,
                hasher,
                clock,
                service_config,
            ));
            let result = serve(&config, AppState::new(auth_service, cookies)).await;

            info!("{}", pool.get_statistics());
            pool.close().await;
            result
        }
    }
}

async fn serve<U, S>(config: &AppConfig, state: AppState<U, S>) -> anyhow::Result<()>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let state = web::Data::new(state);
    let json_limit = config.server.max_payload_size;
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone(), json_limit))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server terminated with an error")
}

/// Create the first administrator from `ADMIN_USERNAME` / `ADMIN_PASSWORD`
///
/// An existing account with that name is left untouched.
async fn seed_admin<U>(
    users: &U,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
) -> anyhow::Result<()>
where
    U: UserRepository,
{
    let (username, password) = match (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        (Ok(username), Ok(password)) => (username, password),
        _ => return Ok(()),
    };

    if !validate_username(&username) || !validate_password(&username, &password) {
        anyhow::bail!("ADMIN_USERNAME or ADMIN_PASSWORD does not satisfy the credential policy");
    }

    let mut admin = User::new(&username, String::new(), clock.now(), true);
    admin.password_hash = hasher.hash(&admin.username, &admin.member_since_iso(), &password);

    match users.create(admin).await {
        Ok(_) => info!("Seeded administrator {}", username),
        Err(DomainError::Conflict { .. }) => info!("Administrator {} already exists", username),
        Err(e) => return Err(anyhow::anyhow!("Failed to seed administrator: {}", e)),
    }
    Ok(())
}
