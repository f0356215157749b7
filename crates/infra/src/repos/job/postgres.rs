use super::IJobRepo;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use nudge_domain::{Job, JobPayload, DATE_TRIGGER, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresJobRepo {
    pool: PgPool,
}

impl PostgresJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JobRaw {
    job_uid: Uuid,
    run_date: DateTime<Utc>,
    kind: String,
    arguments: serde_json::Value,
    misfire_grace_secs: Option<i64>,
}

impl TryFrom<JobRaw> for Job {
    type Error = anyhow::Error;

    fn try_from(raw: JobRaw) -> anyhow::Result<Self> {
        let job_uid = raw.job_uid;
        let payload = JobPayload::from_parts(&raw.kind, raw.arguments)
            .with_context(|| format!("Stored job {} is unreadable", job_uid))?;
        Ok(Job {
            id: job_uid.into(),
            payload,
            run_date: raw.run_date,
            misfire_grace: raw.misfire_grace_secs.map(Duration::seconds),
        })
    }
}

fn to_job(raw: Option<JobRaw>) -> anyhow::Result<Option<Job>> {
    raw.map(Job::try_from).transpose()
}

#[async_trait::async_trait]
impl IJobRepo for PostgresJobRepo {
    async fn insert(&self, job: &Job) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs
            (job_uid, trigger, run_date, kind, arguments, misfire_grace_secs)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(job.id.inner_ref())
        .bind(DATE_TRIGGER)
        .bind(job.run_date)
        .bind(job.payload.kind())
        .bind(job.payload.arguments())
        .bind(job.misfire_grace.map(|grace| grace.num_seconds()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert job: {:?}. DB returned error: {:?}",
                job, e
            );
            e
        })?;

        Ok(())
    }

    async fn find(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        let raw = sqlx::query_as::<_, JobRaw>(
            r#"
            SELECT * FROM jobs AS j
            WHERE j.job_uid = $1
            "#,
        )
        .bind(job_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        to_job(raw)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, JobRaw>(
            r#"
            SELECT * FROM jobs AS j
            ORDER BY j.run_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .filter_map(|raw| match Job::try_from(raw) {
            Ok(job) => Some(job),
            Err(e) => {
                error!("Skipping job: {:?}", e);
                None
            }
        })
        .collect();

        Ok(jobs)
    }

    async fn update_run_date(
        &self,
        job_id: &ID,
        run_date: DateTime<Utc>,
    ) -> anyhow::Result<Option<Job>> {
        let raw = sqlx::query_as::<_, JobRaw>(
            r#"
            UPDATE jobs
            SET run_date = $2
            WHERE job_uid = $1
            RETURNING *
            "#,
        )
        .bind(job_id.inner_ref())
        .bind(run_date)
        .fetch_optional(&self.pool)
        .await?;

        to_job(raw)
    }

    async fn delete(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        let raw = sqlx::query_as::<_, JobRaw>(
            r#"
            DELETE FROM jobs AS j
            WHERE j.job_uid = $1
            RETURNING *
            "#,
        )
        .bind(job_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        to_job(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nudge_domain::{ReminderType, SendReminderPayload};

    fn raw(kind: &str, arguments: serde_json::Value) -> JobRaw {
        JobRaw {
            job_uid: ID::new().inner(),
            run_date: Utc.timestamp_millis(1_613_862_000_000),
            kind: kind.into(),
            arguments,
            misfire_grace_secs: Some(30),
        }
    }

    #[test]
    fn reads_stored_rows() {
        let payload = JobPayload::SendReminder(SendReminderPayload::new(
            3,
            "MAJOR-3-1613862000".into(),
            ReminderType::Major.message(),
        ));
        let raw = raw(payload.kind(), payload.arguments());
        let job_uid = raw.job_uid;

        let job = Job::try_from(raw).unwrap();
        assert_eq!(job.id, ID::from(job_uid));
        assert_eq!(job.payload, payload);
        assert_eq!(job.misfire_grace, Some(Duration::seconds(30)));
    }

    #[test]
    fn names_the_job_of_unreadable_rows() {
        let raw = raw("send_invoice", serde_json::json!({}));
        let job_uid = raw.job_uid;

        let err = Job::try_from(raw).unwrap_err();
        assert!(err.to_string().contains(&job_uid.to_string()));
    }
}
