use super::cancel_reminder;
use crate::shared::usecase::UseCase;
use chrono::Duration;
use nudge_domain::{
    date::millis_to_datetime, JobPayload, NextReminder, Reminder, ReminderType,
    SendReminderPayload,
};
use nudge_infra::NudgeContext;
use tracing::error;

/// Arms a reminder of the given type for the receiver. Whatever reminder
/// occupied the same cadence slot before is canceled.
#[derive(Debug)]
pub struct ArmReminderUseCase {
    pub receiver_id: i64,
    pub reminder_type: ReminderType,
    pub delay: Duration,
}

impl ArmReminderUseCase {
    pub fn new(receiver_id: i64, next: NextReminder) -> Self {
        Self {
            receiver_id,
            reminder_type: next.reminder_type,
            delay: next.delay,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    /// The delay puts the reminder past the latest representable point in time
    RemindAtOutOfRange,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ArmReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "ArmReminder";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let (remind_at, run_date) = now
            .checked_add(self.delay.num_milliseconds())
            .and_then(|remind_at| millis_to_datetime(remind_at).map(|d| (remind_at, d)))
            .ok_or(UseCaseError::RemindAtOutOfRange)?;

        let cadence = self.reminder_type.cadence();
        let occupying = ctx
            .repos
            .reminders
            .find_by_receiver(self.receiver_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .into_iter()
            .filter(|reminder| reminder.reminder_type.cadence() == cadence);
        for reminder in occupying {
            cancel_reminder(&reminder, ctx)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        let id = Reminder::derive_id(self.reminder_type, self.receiver_id, now);
        let payload = JobPayload::SendReminder(SendReminderPayload::new(
            self.receiver_id,
            id.clone(),
            self.reminder_type.message(),
        ));

        // The job goes first, a reminder record is never without its job
        let job = ctx
            .scheduler
            .add_job(payload, run_date)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let reminder = Reminder {
            id,
            job_id: job.id.clone(),
            receiver_id: self.receiver_id,
            reminder_type: self.reminder_type,
            remind_at,
            created_at: now,
        };
        if ctx.repos.reminders.insert(&reminder).await.is_err() {
            if let Err(e) = ctx.scheduler.remove_job(&job.id).await {
                error!(
                    "Job {} of reminder {} could not be removed after the reminder failed to be stored: {:?}",
                    job.id, reminder.id, e
                );
            }
            return Err(UseCaseError::StorageError);
        }

        Ok(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use nudge_infra::StaticTimeSys;
    use std::sync::Arc;

    const T0: i64 = 1_613_862_000_000;

    #[actix_web::test]
    async fn arms_reminder_with_a_job() {
        let ctx = NudgeContext::create_inmemory(Arc::new(StaticTimeSys::new(T0)));
        let usecase = ArmReminderUseCase {
            receiver_id: 42,
            reminder_type: ReminderType::Minor,
            delay: Duration::days(90),
        };
        let reminder = execute(usecase, &ctx).await.unwrap();

        assert_eq!(reminder.id, "MINOR-42-1613862000");
        assert_eq!(reminder.remind_at, T0 + Duration::days(90).num_milliseconds());
        let job = ctx
            .scheduler
            .get_job(&reminder.job_id)
            .await
            .unwrap()
            .expect("Reminder to have a job");
        assert_eq!(job.run_date.timestamp_millis(), reminder.remind_at);
        assert_eq!(job.payload.receiver_id(), 42);
        match job.payload {
            JobPayload::SendReminder(payload) => {
                assert_eq!(payload.reminder_id, reminder.id);
                assert_eq!(payload.message(), ReminderType::Minor.message());
            }
        }
    }

    #[actix_web::test]
    async fn replaces_reminder_in_the_same_cadence_slot() {
        let sys = Arc::new(StaticTimeSys::new(T0));
        let ctx = NudgeContext::create_inmemory(sys.clone());
        let arm = |reminder_type, days| ArmReminderUseCase {
            receiver_id: 42,
            reminder_type,
            delay: Duration::days(days),
        };

        let minor = execute(arm(ReminderType::Minor, 90), &ctx).await.unwrap();
        let major = execute(arm(ReminderType::Major, 180), &ctx).await.unwrap();
        sys.set(T0 + 1000);
        let confirm = execute(arm(ReminderType::ConfirmMinor, 14), &ctx)
            .await
            .unwrap();

        let reminders = ctx.repos.reminders.find_by_receiver(42).await.unwrap();
        assert_eq!(reminders, vec![confirm, major.clone()]);
        assert!(ctx.scheduler.get_job(&minor.job_id).await.unwrap().is_none());
        assert!(ctx.scheduler.get_job(&major.job_id).await.unwrap().is_some());
        assert_eq!(ctx.scheduler.get_jobs().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn rejects_delays_past_the_representable_range() {
        let ctx = NudgeContext::create_inmemory(Arc::new(StaticTimeSys::new(T0)));
        let minor = execute(
            ArmReminderUseCase {
                receiver_id: 42,
                reminder_type: ReminderType::Minor,
                delay: Duration::days(90),
            },
            &ctx,
        )
        .await
        .unwrap();

        let usecase = ArmReminderUseCase {
            receiver_id: 42,
            reminder_type: ReminderType::ConfirmMinor,
            delay: Duration::milliseconds(i64::MAX - T0),
        };
        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::RemindAtOutOfRange);

        // The reminder in the slot is left untouched
        let reminders = ctx.repos.reminders.find_by_receiver(42).await.unwrap();
        assert_eq!(reminders, vec![minor]);
        assert_eq!(ctx.scheduler.get_jobs().await.unwrap().len(), 1);
    }
}
