use anyhow::Context;
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// One year.
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Tokens never expire when unset.
    pub ttl_minutes: Option<i64>,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection options from `DATABASE_URL` if present, otherwise from the split credentials.
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url.parse::<PgConnectOptions>().context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("DATABASE_URL").ok();
        let (user, password) = if url.is_some() {
            (String::new(), String::new())
        } else {
            (
                std::env::var("DB_USER").context("DB_USER must be set without DATABASE_URL")?,
                std::env::var("DB_PASS").context("DB_PASS must be set without DATABASE_URL")?,
            )
        };
        let database = DatabaseConfig {
            url,
            user,
            password,
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            port: parse_var("DB_PORT")?.unwrap_or(5432),
            name: std::env::var("DB_NAME").unwrap_or_else(|_| "userauth".into()),
            max_connections: parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(10),
        };

        let jwt = JwtConfig {
            secret: std::env::var("SECRET").context("SECRET must be set")?,
            ttl_minutes: parse_var("JWT_TTL_MINUTES")?,
        };
        if let Some(ttl) = jwt.ttl_minutes {
            anyhow::ensure!(
                (1..=MAX_JWT_TTL_MINUTES).contains(&ttl),
                "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {ttl}"
            );
        }

        let bcrypt_cost = parse_var("BCRYPT_COST")?.unwrap_or(DEFAULT_BCRYPT_COST);
        anyhow::ensure!(
            (4..=31).contains(&bcrypt_cost),
            "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
        );

        Ok(Self {
            database,
            jwt,
            bcrypt_cost,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT")?.unwrap_or(3000),
        })
    }
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        Err(_) => Ok(None),
    }
}
