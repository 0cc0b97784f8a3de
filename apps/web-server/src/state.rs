//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::domain::{NewUser, PageRequest};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    AuthError, GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    DatabaseConnections, PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::{AdminConfig, AppConfig, SiteConfig};
use crate::templates::Templates;

/// Failures that keep the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Template error: {0}")]
    Templates(#[from] handlebars::TemplateError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Arc<Templates>,
    pub site: SiteConfig,
    /// Storage backend name, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let state = match &config.database {
            #[cfg(feature = "postgres")]
            Some(db_config) => Self::postgres(config, db_config).await?,
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
                Self::in_memory(config.site.clone(), config.jwt.clone())?
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Self::in_memory(config.site.clone(), config.jwt.clone())?
            }
        };

        tracing::info!(storage = state.storage, "Application state initialized");
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        config: &AppConfig,
        db_config: &yatube_infra::database::DatabaseConfig,
    ) -> Result<Self, StartupError> {
        let connections = DatabaseConnections::init(db_config)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;

        if config.run_migrations {
            use sea_orm_migration::MigratorTrait;

            tracing::info!("Applying pending migrations");
            migration::Migrator::up(&connections.main, None)
                .await
                .map_err(|e| StartupError::Database(e.to_string()))?;
        }

        let pool = Arc::new(connections.main);

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(Arc::clone(&pool))),
            groups: Arc::new(PostgresGroupRepository::new(Arc::clone(&pool))),
            posts: Arc::new(PostgresPostRepository::new(pool)),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            templates: Arc::new(Templates::new()?),
            site: config.site.clone(),
            storage: "postgres",
        })
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(site: SiteConfig, jwt: JwtConfig) -> Result<Self, StartupError> {
        let store = InMemoryStore::new();

        Ok(Self {
            users: Arc::new(store.users()),
            groups: Arc::new(store.groups()),
            posts: Arc::new(store.posts()),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            templates: Arc::new(Templates::new()?),
            site,
            storage: "memory",
        })
    }

    /// Create the staff account unless an account with that name exists.
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> Result<(), StartupError> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            tracing::debug!(username = %admin.username, "Admin account already present");
            return Ok(());
        }

        let hash = self.passwords.hash(&admin.password)?;
        let user = self
            .users
            .create(NewUser::new(admin.username.clone(), hash).staff())
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "Admin account created");
        Ok(())
    }

    /// Page selection for a `?page=` value, sized by the site settings.
    pub fn page_request(&self, raw: Option<&str>) -> PageRequest {
        PageRequest::parse(raw, self.site.posts_per_page)
    }
}
