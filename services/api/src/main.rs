use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod settings;
mod state;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use session_core::{
    AdminService, SessionService, SessionStore, UserStore,
    memory::{MemorySessionStore, MemoryUserStore},
};
use tokio::net::TcpListener;

use crate::{
    middleware::{JwtConfig, JwtVerifier},
    repositories::{SessionRepository, UserRepository},
    settings::{Settings, StorageBackend},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting session service");

    let settings = Settings::from_env()?;

    let (session_store, user_store): (Arc<dyn SessionStore>, Arc<dyn UserStore>) =
        match settings.storage {
            StorageBackend::Postgres => {
                let db_config = DatabaseConfig::from_env()?;
                let pool = init_pool(&db_config).await?;

                if health_check(&pool).await? {
                    info!("Database connection successful");
                } else {
                    anyhow::bail!("Failed to connect to database");
                }
                run_migrations(&pool).await?;

                (
                    Arc::new(SessionRepository::new(pool.clone())),
                    Arc::new(UserRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data will not survive a restart");
                (
                    Arc::new(MemorySessionStore::new()),
                    Arc::new(MemoryUserStore::new()),
                )
            }
        };

    let jwt_config = JwtConfig::from_env().map_err(anyhow::Error::msg)?;

    let app_state = AppState {
        sessions: SessionService::new(session_store)
            .with_registration_attempts(settings.registration_attempts),
        admin: AdminService::new(user_store),
        jwt: JwtVerifier::new(&jwt_config)?,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Session service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down session service");
        })
        .await?;

    Ok(())
}
