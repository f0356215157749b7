mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryJobRepo;
use nudge_domain::{Job, ID};
pub use postgres::PostgresJobRepo;

/// The Job Store. Every operation is a single atomic statement against
/// the backing store, so a job is either fully persisted or absent.
#[async_trait::async_trait]
pub trait IJobRepo: Send + Sync {
    async fn insert(&self, job: &Job) -> anyhow::Result<()>;
    async fn find(&self, job_id: &ID) -> anyhow::Result<Option<Job>>;
    async fn find_all(&self) -> anyhow::Result<Vec<Job>>;
    /// Returns the updated job, or `None` when it no longer exists
    async fn update_run_date(
        &self,
        job_id: &ID,
        run_date: DateTime<Utc>,
    ) -> anyhow::Result<Option<Job>>;
    async fn delete(&self, job_id: &ID) -> anyhow::Result<Option<Job>>;
}
