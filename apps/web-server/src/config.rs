//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use yatube_infra::JwtConfig;
use yatube_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    pub site: SiteConfig,
    pub admin: Option<AdminConfig>,
}

/// Settings the request handlers read.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub session_cookie: String,
    pub secure_cookie: bool,
    pub posts_per_page: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            session_cookie: "yatube_session".to_string(),
            secure_cookie: false,
            posts_per_page: 10,
        }
    }
}

/// Staff account created at startup when missing.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
            connect_timeout: Duration::from_secs(parsed("DB_CONNECT_TIMEOUT_SECS", 10)),
        });

        let site_defaults = SiteConfig::default();
        let site = SiteConfig {
            session_cookie: env::var("SESSION_COOKIE_NAME").unwrap_or(site_defaults.session_cookie),
            secure_cookie: flag("SESSION_COOKIE_SECURE"),
            posts_per_page: parsed("POSTS_PER_PAGE", site_defaults.posts_per_page).max(1),
        };

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminConfig { username, password }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS"),
            jwt: JwtConfig::from_env(),
            site,
            admin,
        }
    }
}
