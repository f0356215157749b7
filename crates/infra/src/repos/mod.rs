mod job;
mod reminder;
mod shared;

pub use job::IJobRepo;
use job::{InMemoryJobRepo, PostgresJobRepo};
pub use reminder::IReminderRepo;
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub jobs: Arc<dyn IJobRepo>,
    pub reminders: Arc<dyn IReminderRepo>,
}

impl Repos {
    /// Connects to postgres and brings the schema up to date
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB MIGRATING ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB MIGRATING ... [done]");

        Ok(Self {
            jobs: Arc::new(PostgresJobRepo::new(pool.clone())),
            reminders: Arc::new(PostgresReminderRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            jobs: Arc::new(InMemoryJobRepo::new()),
            reminders: Arc::new(InMemoryReminderRepo::new()),
        }
    }
}
