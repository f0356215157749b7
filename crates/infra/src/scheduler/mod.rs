mod timer_queue;

use crate::repos::IJobRepo;
use crate::system::ISys;
use chrono::{DateTime, Utc};
use nudge_domain::{Job, JobPayload, ID};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use timer_queue::TimerQueue;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Upper bound on how long the timer loop sleeps before it looks at the clock again
const MAX_TIMER_SLEEP: Duration = Duration::from_secs(60 * 60);
/// How long to wait before trying a job again when the Job Store could not be reached
const STORE_RETRY_DELAY_MILLIS: i64 = 60 * 1000;

/// Receiving end of the jobs that have fired. Every job arrives here exactly
/// once and has already been removed from the Job Store.
pub type FiredJobs = mpsc::UnboundedReceiver<Job>;

/// Single timer service of the process.
///
/// The Job Store is the source of truth, every mutation is persisted before
/// the in-memory timer is armed. This way a crash between persisting and
/// firing is recovered on the next `start`.
pub struct JobScheduler {
    jobs: Arc<dyn IJobRepo>,
    sys: Arc<dyn ISys>,
    timers: Mutex<TimerQueue>,
    wakeup: Notify,
    running: AtomicBool,
    fired: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    timer_loop: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JobScheduler {
    pub fn new(jobs: Arc<dyn IJobRepo>, sys: Arc<dyn ISys>) -> Self {
        Self {
            jobs,
            sys,
            timers: Mutex::new(TimerQueue::new()),
            wakeup: Notify::new(),
            running: AtomicBool::new(false),
            fired: Mutex::new(None),
            timer_loop: Mutex::new(None),
        }
    }

    /// Loads every persisted job, arms a timer for each and starts the timer loop.
    /// Jobs that became due while the process was down fire right away.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<FiredJobs> {
        if self.is_running() {
            anyhow::bail!("The job scheduler is already running");
        }

        let jobs = self.jobs.find_all().await?;
        {
            let mut timers = lock(&self.timers);
            timers.clear();
            for job in &jobs {
                timers.arm(job.id.clone(), job.run_date.timestamp_millis());
            }
        }
        info!("Job scheduler loaded {} persisted jobs", jobs.len());

        let (sender, receiver) = mpsc::unbounded_channel();
        *lock(&self.fired) = Some(sender);
        self.running.store(true, Ordering::SeqCst);

        let scheduler = self.clone();
        *lock(&self.timer_loop) = Some(tokio::spawn(async move { scheduler.run().await }));

        Ok(receiver)
    }

    /// Stops firing jobs and forgets every armed timer. The Job Store is left as is.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(timer_loop) = lock(&self.timer_loop).take() {
            timer_loop.abort();
        }
        lock(&self.timers).clear();
        *lock(&self.fired) = None;
        info!("Job scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Persists a new job due at `run_date` and arms its timer
    pub async fn add_job(
        &self,
        payload: JobPayload,
        run_date: DateTime<Utc>,
    ) -> anyhow::Result<Job> {
        let job = Job::new(payload, run_date);
        self.jobs.insert(&job).await?;
        self.arm(&job);
        Ok(job)
    }

    pub async fn get_job(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        self.jobs.find(job_id).await
    }

    /// Every job in the Job Store, fired or not
    pub async fn get_jobs(&self) -> anyhow::Result<Vec<Job>> {
        self.jobs.find_all().await
    }

    /// Moves the job to `run_date`. Returns `None` when the job has already
    /// fired or was removed, which callers are expected to tolerate.
    pub async fn reschedule_job(
        &self,
        job_id: &ID,
        run_date: DateTime<Utc>,
    ) -> anyhow::Result<Option<Job>> {
        match self.jobs.update_run_date(job_id, run_date).await? {
            Some(job) => {
                self.arm(&job);
                Ok(Some(job))
            }
            None => {
                lock(&self.timers).disarm(job_id);
                Ok(None)
            }
        }
    }

    /// Disarms and deletes the job. Returns `None` when there was nothing to remove.
    pub async fn remove_job(&self, job_id: &ID) -> anyhow::Result<Option<Job>> {
        lock(&self.timers).disarm(job_id);
        self.jobs.delete(job_id).await
    }

    /// Number of jobs with an armed in-memory timer
    pub fn armed_count(&self) -> usize {
        lock(&self.timers).len()
    }

    fn arm(&self, job: &Job) {
        self.arm_at(job.id.clone(), job.run_date.timestamp_millis());
    }

    fn arm_at(&self, job_id: ID, run_at: i64) {
        lock(&self.timers).arm(job_id, run_at);
        self.wakeup.notify_one();
    }

    async fn run(self: Arc<Self>) {
        loop {
            let now = self.sys.get_timestamp_millis();
            let (due, next_run_at) = {
                let mut timers = lock(&self.timers);
                (timers.pop_due(now), timers.next_run_at())
            };

            for job_id in due {
                let scheduler = self.clone();
                tokio::spawn(async move { scheduler.fire(job_id).await });
            }

            let sleep_for = match next_run_at {
                Some(run_at) => {
                    Duration::from_millis((run_at - now).max(0) as u64).min(MAX_TIMER_SLEEP)
                }
                None => MAX_TIMER_SLEEP,
            };
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {},
                _ = self.wakeup.notified() => {},
            }
        }
    }

    async fn fire(&self, job_id: ID) {
        let job = match self.jobs.find(&job_id).await {
            Ok(Some(job)) => job,
            // Removed after the timer went off
            Ok(None) => return,
            Err(e) => return self.retry_later(job_id, e),
        };

        let now = self.sys.get_timestamp_millis();
        let run_at = job.run_date.timestamp_millis();
        if run_at > now {
            // Rescheduled into the future while the timer went off
            return self.arm_at(job.id, run_at);
        }
        if !self.is_running() {
            return;
        }

        let job = match self.jobs.delete(&job.id).await {
            Ok(Some(job)) => job,
            Ok(None) => return,
            Err(e) => return self.retry_later(job_id, e),
        };

        if job.is_misfired(now) {
            warn!(
                "Dropping job {} that was due at {} since it is past its misfire grace",
                job.id, job.run_date
            );
            return;
        }

        let fired = lock(&self.fired).clone();
        match fired {
            Some(fired) => {
                if let Err(e) = fired.send(job) {
                    error!("Nobody is handling fired jobs, lost job: {:?}", e.0);
                }
            }
            None => error!(
                "Job {} fired after the scheduler stopped and was lost",
                job.id
            ),
        }
    }

    fn retry_later(&self, job_id: ID, e: anyhow::Error) {
        error!(
            "Unable to fire job {} because the Job Store failed: {:?}. Trying again later.",
            job_id, e
        );
        if self.is_running() {
            let retry_at = self.sys.get_timestamp_millis() + STORE_RETRY_DELAY_MILLIS;
            self.arm_at(job_id, retry_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::Repos;
    use crate::system::TokioClockSys;
    use chrono::Duration as ChronoDuration;
    use nudge_domain::{date::millis_to_datetime, ReminderType, SendReminderPayload};

    const T0: i64 = 1_613_862_000_000;

    fn payload(receiver_id: i64) -> JobPayload {
        JobPayload::SendReminder(SendReminderPayload::new(
            receiver_id,
            format!("MINOR-{}-1613862000", receiver_id),
            ReminderType::Minor.message(),
        ))
    }

    fn setup() -> (Arc<JobScheduler>, Arc<dyn IJobRepo>, Arc<dyn ISys>) {
        let repos = Repos::create_inmemory();
        let sys: Arc<dyn ISys> = Arc::new(TokioClockSys::new(T0));
        let scheduler = Arc::new(JobScheduler::new(repos.jobs.clone(), sys.clone()));
        (scheduler, repos.jobs, sys)
    }

    fn in_millis(sys: &Arc<dyn ISys>, millis: i64) -> DateTime<Utc> {
        millis_to_datetime(sys.get_timestamp_millis() + millis).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_job_at_its_run_date_and_consumes_it() {
        let (scheduler, jobs, sys) = setup();
        let mut fired = scheduler.start().await.unwrap();

        let run_date = in_millis(&sys, ChronoDuration::days(90).num_milliseconds());
        let job = scheduler.add_job(payload(1), run_date).await.unwrap();
        assert_eq!(scheduler.armed_count(), 1);

        let fired_job = fired.recv().await.expect("Job to fire");
        assert_eq!(fired_job.id, job.id);
        assert!(sys.get_timestamp_millis() >= run_date.timestamp_millis());
        assert!(jobs.find(&job.id).await.unwrap().is_none());
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_persisted_jobs_after_restart() {
        let (scheduler, jobs, sys) = setup();
        let _ = scheduler.start().await.unwrap();

        let overdue = scheduler
            .add_job(payload(1), in_millis(&sys, 1000))
            .await
            .unwrap();
        let upcoming = scheduler
            .add_job(payload(2), in_millis(&sys, 10 * 60 * 1000))
            .await
            .unwrap();

        // Simulated crash before anything fired, the process stays down for a while
        scheduler.stop();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(jobs.find_all().await.unwrap().len(), 2);

        let restarted = Arc::new(JobScheduler::new(jobs.clone(), sys.clone()));
        let mut fired = restarted.start().await.unwrap();
        assert_eq!(restarted.armed_count(), 2);

        let first = fired.recv().await.unwrap();
        assert_eq!(first.id, overdue.id);
        // Fired immediately instead of being skipped
        assert!(sys.get_timestamp_millis() < upcoming.run_date.timestamp_millis());

        let second = fired.recv().await.unwrap();
        assert_eq!(second.id, upcoming.id);
        assert!(sys.get_timestamp_millis() >= upcoming.run_date.timestamp_millis());
        assert!(jobs.find_all().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_twice_keeps_one_live_job() {
        let (scheduler, jobs, sys) = setup();
        let mut fired = scheduler.start().await.unwrap();

        let job = scheduler
            .add_job(payload(1), in_millis(&sys, 1000))
            .await
            .unwrap();
        let target = in_millis(&sys, 60 * 60 * 1000);
        for _ in 0..2 {
            let rescheduled = scheduler.reschedule_job(&job.id, target).await.unwrap();
            assert_eq!(rescheduled.map(|j| j.run_date), Some(target));
        }
        assert_eq!(scheduler.armed_count(), 1);
        assert_eq!(jobs.find_all().await.unwrap().len(), 1);

        let fired_job = fired.recv().await.unwrap();
        assert_eq!(fired_job.id, job.id);
        assert!(sys.get_timestamp_millis() >= target.timestamp_millis());

        tokio::time::advance(Duration::from_secs(2 * 60 * 60)).await;
        assert!(fired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn removed_jobs_never_fire() {
        let (scheduler, jobs, sys) = setup();
        let mut fired = scheduler.start().await.unwrap();

        let removed = scheduler
            .add_job(payload(1), in_millis(&sys, 1000))
            .await
            .unwrap();
        let kept = scheduler
            .add_job(payload(2), in_millis(&sys, 2000))
            .await
            .unwrap();
        assert!(scheduler.remove_job(&removed.id).await.unwrap().is_some());
        assert!(scheduler.remove_job(&removed.id).await.unwrap().is_none());

        assert_eq!(fired.recv().await.unwrap().id, kept.id);
        assert!(jobs.find(&removed.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_a_fired_job_is_a_noop() {
        let (scheduler, _, sys) = setup();
        let mut fired = scheduler.start().await.unwrap();

        let job = scheduler
            .add_job(payload(1), in_millis(&sys, 1000))
            .await
            .unwrap();
        fired.recv().await.unwrap();

        let res = scheduler
            .reschedule_job(&job.id, in_millis(&sys, 1000))
            .await
            .unwrap();
        assert!(res.is_none());
        assert_eq!(scheduler.armed_count(), 0);
        assert!(scheduler.get_job(&job.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drops_jobs_past_their_misfire_grace() {
        let (scheduler, jobs, sys) = setup();

        let mut late = Job::new(payload(1), in_millis(&sys, 1000));
        late.misfire_grace = Some(ChronoDuration::seconds(30));
        jobs.insert(&late).await.unwrap();
        let on_time = Job::new(payload(2), in_millis(&sys, 1000));
        jobs.insert(&on_time).await.unwrap();

        tokio::time::advance(Duration::from_secs(60 * 60)).await;
        let mut fired = scheduler.start().await.unwrap();

        assert_eq!(fired.recv().await.unwrap().id, on_time.id);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(jobs.find_all().await.unwrap().is_empty());
        assert!(fired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cannot_start_twice() {
        let (scheduler, _, _) = setup();
        let _fired = scheduler.start().await.unwrap();
        assert!(scheduler.start().await.is_err());
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert!(scheduler.start().await.is_ok());
    }
}
