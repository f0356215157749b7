use super::IReminderRepo;
use anyhow::Context;
use nudge_domain::{
    date::{epoch_secs_to_millis, millis_to_epoch_secs},
    Reminder, ReminderType,
};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_id: String,
    job_uid: Uuid,
    receiver_id: i64,
    reminder_type: String,
    remind_at: f64,
    created_at: f64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(raw: ReminderRaw) -> anyhow::Result<Self> {
        let reminder_type = raw
            .reminder_type
            .parse::<ReminderType>()
            .with_context(|| format!("Stored reminder {} is unreadable", raw.reminder_id))?;
        Ok(Reminder {
            id: raw.reminder_id,
            job_id: raw.job_uid.into(),
            receiver_id: raw.receiver_id,
            reminder_type,
            remind_at: epoch_secs_to_millis(raw.remind_at),
            created_at: epoch_secs_to_millis(raw.created_at),
        })
    }
}

fn to_reminder(raw: Option<ReminderRaw>) -> anyhow::Result<Option<Reminder>> {
    raw.map(Reminder::try_from).transpose()
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_id, job_uid, receiver_id, reminder_type, remind_at, created_at)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&reminder.id)
        .bind(reminder.job_id.inner_ref())
        .bind(reminder.receiver_id)
        .bind(reminder.reminder_type.as_str())
        .bind(millis_to_epoch_secs(reminder.remind_at))
        .bind(millis_to_epoch_secs(reminder.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;

        Ok(())
    }

    async fn find(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.reminder_id = $1
            "#,
        )
        .bind(reminder_id)
        .fetch_optional(&self.pool)
        .await?;

        to_reminder(raw)
    }

    async fn find_by_receiver(&self, receiver_id: i64) -> anyhow::Result<Vec<Reminder>> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.receiver_id = $1
            ORDER BY r.remind_at
            "#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Reminder::try_from)
        .collect()
    }

    async fn update_remind_at(
        &self,
        reminder_id: &str,
        remind_at: i64,
    ) -> anyhow::Result<Option<Reminder>> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            UPDATE reminders
            SET remind_at = $2
            WHERE reminder_id = $1
            RETURNING *
            "#,
        )
        .bind(reminder_id)
        .bind(millis_to_epoch_secs(remind_at))
        .fetch_optional(&self.pool)
        .await?;

        to_reminder(raw)
    }

    async fn delete(&self, reminder_id: &str) -> anyhow::Result<Option<Reminder>> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            DELETE FROM reminders AS r
            WHERE r.reminder_id = $1
            RETURNING *
            "#,
        )
        .bind(reminder_id)
        .fetch_optional(&self.pool)
        .await?;

        to_reminder(raw)
    }
}
