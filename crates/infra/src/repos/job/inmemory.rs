use super::IJobRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use nudge_domain::{Job, ID};

pub struct InMemoryJobRepo {
    jobs: std::sync::Mutex<Vec<Job>>,
}

impl InMemoryJobRepo {
    pub fn new() -> Self {
        Self {
            jobs: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IJobRepo for InMemoryJobRepo {
    async fn insert(&self, job: &Job) -> anyhow::Result<()> {
        insert(job, &self.jobs);
        Ok(())
    }

    async fn find(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        Ok(find(job_id, &self.jobs))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Job>> {
        Ok(find_by(&self.jobs, |_| true))
    }

    async fn update_run_date(
        &self,
        job_id: &ID,
        run_date: DateTime<Utc>,
    ) -> anyhow::Result<Option<Job>> {
        Ok(update_one(job_id, &self.jobs, |job| job.run_date = run_date))
    }

    async fn delete(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        Ok(delete(job_id, &self.jobs))
    }
}
