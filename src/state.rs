use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;
use crate::users::repo::{PgUserStore, UserStore};

/// Applies pending migrations. The email uniqueness guarantee lives in the
/// schema, so serving without it is not an option.
pub(crate) async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    tracing::info!("migrations applied");
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects the pool and brings the schema up to date.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;

        migrate(&db).await?;

        let store = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::memory::MemoryUserStore;

        let config = AppConfig::from_lookup(|key| match key {
            "DB_HOST" => Some("db.test".into()),
            "DB_NAME" => Some("kms_test".into()),
            "DB_PASSWORD" => Some("hunter2".into()),
            _ => None,
        })
        .expect("test config");

        Self::from_parts(Arc::new(MemoryUserStore::new()), Arc::new(config))
    }
}
