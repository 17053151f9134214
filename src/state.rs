use crate::config::AppConfig;
use crate::users::repo::{PgUserStore, UserStore};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let users = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, users))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::memory::MemoryUserStore;
        Self::fake_with_store(Arc::new(MemoryUserStore::default()))
    }

    #[cfg(test)]
    pub fn fake_with_store(users: Arc<dyn UserStore>) -> Self {
        use crate::config::{DatabaseConfig, JwtConfig};

        let config = Arc::new(AppConfig {
            database: DatabaseConfig {
                url: None,
                user: "postgres".into(),
                password: "postgres".into(),
                host: "localhost".into(),
                port: 5432,
                name: "userauth".into(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: None,
            },
            bcrypt_cost: 4,
            host: "127.0.0.1".into(),
            port: 0,
        });

        Self::from_parts(config, users)
    }
}
