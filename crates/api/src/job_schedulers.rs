use crate::{reminder::send_reminder::SendReminderUseCase, shared::usecase::execute};
use nudge_domain::{Job, JobPayload};
use nudge_infra::NudgeContext;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Fired jobs waiting for the job of the same receiver that is being dispatched.
/// A receiver has an entry exactly while one of its jobs is in flight.
#[derive(Default)]
struct ReceiverQueues {
    pending: Mutex<HashMap<i64, VecDeque<Job>>>,
}

impl ReceiverQueues {
    fn pending(&self) -> MutexGuard<'_, HashMap<i64, VecDeque<Job>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands the job back when nothing runs for its receiver, otherwise queues it
    fn enqueue(&self, job: Job) -> Option<Job> {
        let mut pending = self.pending();
        match pending.get_mut(&job.payload.receiver_id()) {
            Some(queue) => {
                queue.push_back(job);
                None
            }
            None => {
                pending.insert(job.payload.receiver_id(), VecDeque::new());
                Some(job)
            }
        }
    }

    /// The next job of the receiver, `None` when its queue ran dry
    fn next(&self, receiver_id: i64) -> Option<Job> {
        let mut pending = self.pending();
        let next = pending.get_mut(&receiver_id).and_then(VecDeque::pop_front);
        if next.is_none() {
            pending.remove(&receiver_id);
        }
        next
    }
}

/// Starts the job scheduler and runs every job it fires.
/// Jobs of different receivers run concurrently, jobs of one receiver one after the other.
pub async fn start_job_dispatcher(ctx: NudgeContext) -> anyhow::Result<()> {
    let mut fired = ctx.scheduler.start().await?;
    let queues = Arc::new(ReceiverQueues::default());

    actix_web::rt::spawn(async move {
        while let Some(job) = fired.recv().await {
            let job = match queues.enqueue(job) {
                Some(job) => job,
                None => continue,
            };
            let ctx = ctx.clone();
            let queues = queues.clone();
            // A slow delivery must not hold up the jobs of other receivers
            actix_web::rt::spawn(async move {
                let receiver_id = job.payload.receiver_id();
                let mut job = job;
                loop {
                    dispatch(job, &ctx).await;
                    job = match queues.next(receiver_id) {
                        Some(job) => job,
                        None => break,
                    };
                }
            });
        }
        info!("Job dispatcher stopped");
    });

    Ok(())
}

async fn dispatch(job: Job, ctx: &NudgeContext) {
    match job.payload {
        JobPayload::SendReminder(payload) => {
            let usecase = SendReminderUseCase {
                job_id: job.id,
                payload,
            };
            let _ = execute(usecase, ctx).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::send_reminder::DeliveryReport;
    use chrono::Duration;
    use nudge_domain::{ReminderMessage, ReminderType, SendReminderPayload, UserChoice};
    use nudge_infra::{
        DeliveryOutcome, IDeliveryChannel, ISys, InMemoryDeliveryChannel,
        InMemoryTeamLifecycleHook, TokioClockSys,
    };

    const T0: i64 = 1_613_862_000_000;

    struct TestContext {
        ctx: NudgeContext,
        channel: Arc<InMemoryDeliveryChannel>,
        hook: Arc<InMemoryTeamLifecycleHook>,
    }

    fn setup() -> TestContext {
        tokio::time::pause();
        let channel = Arc::new(InMemoryDeliveryChannel::new());
        let hook = Arc::new(InMemoryTeamLifecycleHook::new());
        let sys: Arc<dyn ISys> = Arc::new(TokioClockSys::new(T0));
        let mut ctx = NudgeContext {
            channel: channel.clone(),
            team_hook: hook.clone(),
            ..NudgeContext::create_inmemory(sys)
        };
        ctx.config.reminder_intervals = Default::default();
        TestContext { ctx, channel, hook }
    }

    async fn sleep_days(days: i64) {
        let duration = Duration::days(days).to_std().unwrap();
        tokio::time::sleep(duration).await;
    }

    async fn enable(receiver_id: i64, ctx: &NudgeContext) {
        use crate::reminder::enable_reminders::EnableRemindersUseCase;
        execute(EnableRemindersUseCase { receiver_id }, ctx)
            .await
            .unwrap();
    }

    async fn respond(
        receiver_id: i64,
        reminder_type: ReminderType,
        choice: UserChoice,
        ctx: &NudgeContext,
    ) {
        use crate::reminder::respond_to_reminder::RespondToReminderUseCase;
        let usecase = RespondToReminderUseCase {
            receiver_id,
            reminder_type: Some(reminder_type),
            choice,
        };
        execute(usecase, ctx).await.unwrap();
    }

    /// Reminders and jobs of a receiver never get out of step
    async fn assert_in_step(receiver_id: i64, ctx: &NudgeContext) -> usize {
        let reminders = ctx.repos.reminders.find_by_receiver(receiver_id).await.unwrap();
        let jobs: Vec<_> = ctx
            .scheduler
            .get_jobs()
            .await
            .unwrap()
            .into_iter()
            .filter(|job| job.payload.receiver_id() == receiver_id)
            .collect();
        assert_eq!(reminders.len(), jobs.len());
        for reminder in &reminders {
            assert!(jobs.iter().any(|job| job.id == reminder.job_id));
        }
        reminders.len()
    }

    fn delivered_types(channel: &InMemoryDeliveryChannel) -> Vec<ReminderType> {
        channel
            .delivered()
            .into_iter()
            .map(|(_, message)| message.reminder_type)
            .collect()
    }

    #[actix_web::test]
    async fn reminders_follow_the_cadence() {
        let TestContext { ctx, channel, .. } = setup();
        start_job_dispatcher(ctx.clone()).await.unwrap();

        enable(11, &ctx).await;
        assert_eq!(assert_in_step(11, &ctx).await, 2);

        sleep_days(90).await;
        sleep_days(1).await;
        assert_eq!(delivered_types(&channel), vec![ReminderType::Minor]);
        assert_eq!(assert_in_step(11, &ctx).await, 1);

        respond(11, ReminderType::Minor, UserChoice::AgreedToUpdate, &ctx).await;
        assert_eq!(assert_in_step(11, &ctx).await, 2);

        sleep_days(15).await;
        assert_eq!(
            delivered_types(&channel),
            vec![ReminderType::Minor, ReminderType::ConfirmMinor]
        );

        respond(11, ReminderType::ConfirmMinor, UserChoice::ChangedMind, &ctx).await;
        sleep_days(75).await;
        assert_eq!(
            delivered_types(&channel),
            vec![
                ReminderType::Minor,
                ReminderType::ConfirmMinor,
                ReminderType::Major
            ]
        );
        assert_eq!(assert_in_step(11, &ctx).await, 1);

        sleep_days(20).await;
        assert_eq!(delivered_types(&channel).len(), 4);
        assert_eq!(assert_in_step(11, &ctx).await, 0);
    }

    #[actix_web::test]
    async fn permanent_failure_tears_down_the_team() {
        let TestContext { ctx, channel, hook } = setup();
        start_job_dispatcher(ctx.clone()).await.unwrap();

        enable(12, &ctx).await;
        enable(13, &ctx).await;
        channel.set_outcome(12, DeliveryOutcome::RecipientUnreachable("blocked".into()));

        sleep_days(91).await;
        assert_eq!(assert_in_step(12, &ctx).await, 0);
        assert_eq!(assert_in_step(13, &ctx).await, 1);
        assert_eq!(hook.deleted_teams().len(), 1);
        assert_eq!(hook.deleted_teams()[0].0, 12);

        // Nothing left that could fire for the torn down team
        sleep_days(200).await;
        assert_eq!(hook.deleted_teams().len(), 1);
        assert!(channel.delivered().iter().all(|(receiver, _)| *receiver == 13));
    }

    /// Takes a while to find out that nobody is listening anymore
    struct SlowUnreachableChannel {
        operator_notices: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl IDeliveryChannel for SlowUnreachableChannel {
        async fn send(&self, _: i64, _: &ReminderMessage) -> DeliveryOutcome {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            DeliveryOutcome::RecipientUnreachable("blocked".into())
        }

        async fn notify_operators(&self, text: &str) -> anyhow::Result<()> {
            self.operator_notices.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[actix_web::test]
    async fn reminders_due_together_tear_the_team_down_once() {
        let TestContext { ctx, hook, .. } = setup();
        let channel = Arc::new(SlowUnreachableChannel {
            operator_notices: Mutex::new(Vec::new()),
        });
        let ctx = NudgeContext {
            channel: channel.clone(),
            ..ctx
        };

        enable(12, &ctx).await;
        // Both cadences became due while the process was down
        sleep_days(200).await;
        start_job_dispatcher(ctx.clone()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        assert_eq!(hook.deleted_teams().len(), 1);
        assert_eq!(hook.deleted_teams()[0].0, 12);
        assert_eq!(channel.operator_notices.lock().unwrap().len(), 1);
        assert_eq!(assert_in_step(12, &ctx).await, 0);
    }

    fn job_for(receiver_id: i64) -> Job {
        Job::new(
            JobPayload::SendReminder(SendReminderPayload::new(
                receiver_id,
                format!("MINOR-{}-1613862000", receiver_id),
                ReminderType::Minor.message(),
            )),
            chrono::Utc::now(),
        )
    }

    #[test]
    fn queues_jobs_behind_the_job_of_the_same_receiver() {
        let queues = ReceiverQueues::default();
        let first = job_for(1);
        let second = job_for(1);
        let other = job_for(2);

        assert_eq!(queues.enqueue(first.clone()), Some(first));
        assert_eq!(queues.enqueue(second.clone()), None);
        assert_eq!(queues.enqueue(other.clone()), Some(other));

        assert_eq!(queues.next(1), Some(second));
        assert_eq!(queues.next(1), None);
        assert_eq!(queues.next(2), None);
        // Drained receivers start over
        let third = job_for(1);
        assert_eq!(queues.enqueue(third.clone()), Some(third));
    }

    #[actix_web::test]
    async fn dispatches_send_reminder_jobs() {
        let TestContext { ctx, channel, .. } = setup();
        let reminder = {
            use crate::reminder::rearm_reminder::RearmReminderUseCase;
            execute(
                RearmReminderUseCase {
                    receiver_id: 14,
                    reminder_type: ReminderType::ConfirmMajor,
                },
                &ctx,
            )
            .await
            .unwrap()
        };
        let job = ctx
            .scheduler
            .remove_job(&reminder.job_id)
            .await
            .unwrap()
            .unwrap();

        dispatch(job, &ctx).await;
        assert_eq!(delivered_types(&channel), vec![ReminderType::ConfirmMajor]);

        // The second time around the reminder is gone
        let report = execute(
            SendReminderUseCase {
                job_id: reminder.job_id.clone(),
                payload: SendReminderPayload::new(
                    14,
                    reminder.id.clone(),
                    ReminderType::ConfirmMajor.message(),
                ),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(report, DeliveryReport::Skipped);
    }
}
